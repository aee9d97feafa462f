//! Reporting module
//!
//! Turns a [`BenchmarkResult`] into text. The runner never prints; the CLI picks
//! a [`Reporter`] from the configured [`OutputFormat`] and hands it a writer.

use crate::spec::BenchmarkResult;
use clap::ValueEnum;
use std::io::{self, Write};
use std::str::FromStr;
use std::time::Duration;

/// Formats benchmark results onto a writer
pub trait Reporter {
    /// Write one result
    fn report(&self, result: &BenchmarkResult, writer: &mut dyn Write) -> io::Result<()>;
}

/// Human-readable single-line report
#[derive(Debug, Clone, Copy, Default)]
pub struct TextReporter;

impl Reporter for TextReporter {
    fn report(&self, result: &BenchmarkResult, writer: &mut dyn Write) -> io::Result<()> {
        writeln!(
            writer,
            "{}: {} iterations, {} per iteration (total {})",
            result.name(),
            result.total_iterations(),
            format_duration(result.average_duration_per_iteration()),
            format_duration(result.total_elapsed()),
        )
    }
}

/// One JSON object per line
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReporter;

impl Reporter for JsonReporter {
    fn report(&self, result: &BenchmarkResult, writer: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer(&mut *writer, result)?;
        writeln!(writer)
    }
}

/// Report format selected on the command line or through the environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable line
    #[default]
    Text,
    /// JSON object
    Json,
}

impl OutputFormat {
    /// The reporter for this format
    pub fn reporter(self) -> Box<dyn Reporter> {
        match self {
            OutputFormat::Text => Box::new(TextReporter),
            OutputFormat::Json => Box::new(JsonReporter),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s.trim(), true)
    }
}

/// Render a duration with a unit that keeps about three significant digits
///
/// Whole nanoseconds print as integers; larger units get two decimals.
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    match nanos {
        0..=999 => format!("{nanos} ns"),
        1_000..=999_999 => format!("{:.2} µs", nanos as f64 / 1e3),
        1_000_000..=999_999_999 => format!("{:.2} ms", nanos as f64 / 1e6),
        _ => format!("{:.2} s", duration.as_secs_f64()),
    }
}
