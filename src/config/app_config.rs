//! Application configuration module
//!
//! This module provides the main application configuration structure that combines
//! CLI arguments with environment values using a clear priority system.

use super::env_config::{ConfigError, EnvConfig};
use super::env_reader::{EnvReader, SystemEnvReader};
use crate::report::OutputFormat;
use crate::workloads::Workload;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default number of timed iterations
pub const DEFAULT_ITERATIONS: i64 = 1_000;
/// Default workload size
pub const DEFAULT_SIZE: usize = 1_024;

/// CLI arguments structure
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    /// Workload to benchmark
    pub workload: Option<Workload>,
    /// Number of timed iterations
    pub iterations: Option<i64>,
    /// Report format
    pub format: Option<OutputFormat>,
    /// Deadline for the timed loop, in milliseconds
    pub deadline_ms: Option<u64>,
    /// Workload size
    pub size: Option<usize>,
    /// Write the report here instead of stdout
    pub output: Option<PathBuf>,
}

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    workload: Workload,
    iterations: i64,
    format: OutputFormat,
    deadline: Option<Duration>,
    size: usize,
    output: Option<PathBuf>,
}

/// Configuration builder for functional composition
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    workload: Option<Workload>,
    iterations: Option<i64>,
    format: Option<OutputFormat>,
    deadline: Option<Duration>,
    size: Option<usize>,
    output: Option<PathBuf>,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the workload
    #[must_use]
    pub fn with_workload(mut self, workload: Option<Workload>) -> Self {
        self.workload = workload;
        self
    }

    /// Set the iteration count
    #[must_use]
    pub fn with_iterations(mut self, iterations: Option<i64>) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the report format
    #[must_use]
    pub fn with_format(mut self, format: Option<OutputFormat>) -> Self {
        self.format = format;
        self
    }

    /// Set the deadline
    #[must_use]
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    /// Set the workload size
    #[must_use]
    pub fn with_size(mut self, size: Option<usize>) -> Self {
        self.size = size;
        self
    }

    /// Set the output file
    #[must_use]
    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }

    /// Build the final AppConfig, filling gaps with defaults
    pub fn build(self) -> AppConfig {
        AppConfig {
            workload: self.workload.unwrap_or(Workload::Noop),
            iterations: self.iterations.unwrap_or(DEFAULT_ITERATIONS),
            format: self.format.unwrap_or_default(),
            deadline: self.deadline,
            size: self.size.unwrap_or(DEFAULT_SIZE),
            output: self.output,
        }
    }
}

impl AppConfig {
    /// Create AppConfig from CLI arguments and the process environment
    ///
    /// Priority order:
    /// 1. CLI parameters (highest priority)
    /// 2. `MICROBENCH_*` environment variables
    /// 3. Hardcoded defaults
    pub fn from_cli(cli_args: CliArgs) -> Result<Self, ConfigError> {
        Self::from_cli_with_reader(cli_args, &SystemEnvReader)
    }

    /// Create AppConfig with a custom environment reader (for testing)
    ///
    /// Environment values are only consulted for settings the CLI leaves
    /// unset, so a malformed variable is ignored when the flag overrides it.
    pub fn from_cli_with_reader<R: EnvReader>(
        cli_args: CliArgs,
        reader: &R,
    ) -> Result<Self, ConfigError> {
        let deadline = Self::resolve_deadline(cli_args.deadline_ms, reader)?;

        let config = ConfigBuilder::new()
            .with_workload(Self::resolve(cli_args.workload, || {
                EnvConfig::get_workload_with_reader(reader)
            })?)
            .with_iterations(Self::resolve(cli_args.iterations, || {
                EnvConfig::get_iterations_with_reader(reader)
            })?)
            .with_format(Self::resolve(cli_args.format, || {
                EnvConfig::get_format_with_reader(reader)
            })?)
            .with_deadline(deadline)
            .with_size(Self::resolve(cli_args.size, || {
                EnvConfig::get_size_with_reader(reader)
            })?)
            .with_output(cli_args.output)
            .build();

        Ok(config)
    }

    /// CLI value if present, otherwise the environment lookup
    fn resolve<T, F>(cli_value: Option<T>, from_env: F) -> Result<Option<T>, ConfigError>
    where
        F: FnOnce() -> Result<Option<T>, ConfigError>,
    {
        cli_value.map_or_else(from_env, |value| Ok(Some(value)))
    }

    /// Validate the CLI deadline and fall back to the environment
    fn resolve_deadline<R: EnvReader>(
        deadline_ms: Option<u64>,
        reader: &R,
    ) -> Result<Option<Duration>, ConfigError> {
        match deadline_ms {
            Some(0) => Err(ConfigError::InvalidCliArgument {
                argument: "--deadline-ms".to_owned(),
                value: "0".to_owned(),
                expected: "a positive number of milliseconds".to_owned(),
            }),
            Some(ms) => Ok(Some(Duration::from_millis(ms))),
            None => EnvConfig::get_deadline_with_reader(reader),
        }
    }

    /// Workload to benchmark
    pub fn workload(&self) -> Workload {
        self.workload
    }

    /// Requested iteration count, possibly non-positive
    pub fn iterations(&self) -> i64 {
        self.iterations
    }

    /// Iteration count for the runner; non-positive values map to zero
    pub fn runner_iterations(&self) -> u64 {
        u64::try_from(self.iterations).unwrap_or(0)
    }

    /// Report format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Deadline for the timed loop
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Workload size
    pub fn size(&self) -> usize {
        self.size
    }

    /// Report destination, `None` for stdout
    pub fn output(&self) -> Option<&Path> {
        self.output.as_deref()
    }
}
