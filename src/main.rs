//! CLI entry point for microbench
//!
//! Runs one built-in workload for N iterations and prints the report.

use clap::Parser;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use microbench::config::CliArgs;
use microbench::error::ResultExt;
use microbench::{AppConfig, BenchmarkRunner, ConfigError, Error, OutputFormat, Result, Workload};

/// Exit code for configuration and IO errors
const EXIT_CONFIG: u8 = 1;
/// Exit code for failed benchmark runs
const EXIT_BENCHMARK: u8 = 2;

/// Minimal micro-benchmark harness: warm up, time a tight loop, report the average
#[derive(Parser)]
#[command(name = "microbench")]
#[command(version, about, long_about = None)]
struct Args {
    /// Workload to benchmark (overrides MICROBENCH_WORKLOAD)
    #[arg(value_enum, value_name = "WORKLOAD")]
    workload: Option<Workload>,

    /// Number of timed iterations (overrides MICROBENCH_ITERATIONS)
    #[arg(short = 'n', long, value_name = "N", allow_negative_numbers = true)]
    iterations: Option<i64>,

    /// Report format (overrides MICROBENCH_FORMAT)
    #[arg(short, long, value_enum, value_name = "FORMAT")]
    format: Option<OutputFormat>,

    /// Abort the timed loop after this many milliseconds (overrides MICROBENCH_DEADLINE_MS)
    #[arg(long, value_name = "MS")]
    deadline_ms: Option<u64>,

    /// Workload size in elements or bytes (overrides MICROBENCH_SIZE)
    #[arg(short, long, value_name = "SIZE")]
    size: Option<usize>,

    /// Write the report to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// List the built-in workloads and exit
    #[arg(long)]
    list: bool,
}

/// Convert CLI args to CliArgs struct for AppConfig
impl From<Args> for CliArgs {
    fn from(args: Args) -> Self {
        Self {
            workload: args.workload,
            iterations: args.iterations,
            format: args.format,
            deadline_ms: args.deadline_ms,
            size: args.size,
            output: args.output,
        }
    }
}

/// Run the configured workload and write its report
fn run_benchmark<W: Write>(config: &AppConfig, stdout: W) -> Result<()> {
    let runner = match config.deadline() {
        Some(deadline) => BenchmarkRunner::new().with_deadline(deadline),
        None => BenchmarkRunner::new(),
    };

    let workload = config.workload();
    let spec = workload.spec(config.runner_iterations(), config.size());
    let result = runner
        .run(spec)
        .with_context(|| format!("running '{}'", workload.name()))?;

    let reporter = config.format().reporter();
    match config.output() {
        Some(path) => {
            let mut file = File::create(path)
                .with_context(|| format!("creating report file {}", path.display()))?;
            reporter
                .report(&result, &mut file)
                .with_context(|| format!("writing report file {}", path.display()))
        }
        None => {
            let mut stdout = stdout;
            reporter
                .report(&result, &mut stdout)
                .with_context(|| "writing report".to_owned())
        }
    }
}

/// Print the workload table
fn list_workloads<W: Write>(mut out: W) -> io::Result<()> {
    for workload in Workload::ALL {
        writeln!(out, "{:<14} {}", workload.name(), workload.description())?;
    }
    Ok(())
}

/// Resolve the configuration and run it
fn run<W: Write>(args: Args, stdout: W) -> Result<()> {
    let config = args.pipe(CliArgs::from).pipe(AppConfig::from_cli)?;
    run_benchmark(&config, stdout)
}

/// Exit code for a failed invocation
fn exit_code(error: &Error) -> u8 {
    if error.is_benchmark_failure() {
        EXIT_BENCHMARK
    } else {
        EXIT_CONFIG
    }
}

/// Environment variable to point the user at, if the error came from one
fn env_hint(error: &Error) -> Option<&str> {
    match error {
        Error::Config(
            ConfigError::InvalidEnvValue { key, .. } | ConfigError::EnvNotUnicode { key },
        ) => Some(key.as_str()),
        _ => None,
    }
}

/// Logs go to stderr so reports on stdout stay machine-readable
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    init_tracing();

    let args = Args::parse();
    let outcome = if args.list {
        list_workloads(io::stdout().lock()).map_err(Error::from)
    } else {
        run(args, io::stdout().lock())
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            if let Some(key) = env_hint(&err) {
                eprintln!("hint: fix or unset {key}");
            }
            ExitCode::from(exit_code(&err))
        }
    }
}

/// Helper trait for functional pipeline composition
trait Pipe<T> {
    fn pipe<U, F>(self, f: F) -> U
    where
        F: FnOnce(Self) -> U,
        Self: Sized;
}

impl<T> Pipe<T> for T {
    fn pipe<U, F>(self, f: F) -> U
    where
        F: FnOnce(Self) -> U,
    {
        f(self)
    }
}
