//! microbench library
//!
//! A minimal micro-benchmark harness: settle the heap, warm the operation up
//! once, time a tight loop on a monotonic clock, and report the average time
//! per iteration.
//!
//! # Examples
//!
//! Basic usage:
//!
//! ```rust
//! use microbench::{BenchmarkRunner, BenchmarkSpec, OutputFormat};
//!
//! let mut buffer = Vec::with_capacity(64);
//! let spec = BenchmarkSpec::from_fn("push-pop", 1_000, || {
//!     buffer.push(1u8);
//!     buffer.pop();
//! });
//!
//! let result = BenchmarkRunner::new().run(spec)?;
//! assert_eq!(result.total_iterations(), 1_000);
//!
//! let mut output = Vec::new();
//! OutputFormat::Text.reporter().report(&result, &mut output)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod clock;
pub mod config;
pub mod error;
pub mod reclaim;
pub mod report;
pub mod runner;
pub mod spec;
pub mod workloads;

pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{AppConfig, ConfigError};
pub use error::{BenchmarkError, Error, ResourceExhaustion, Result};
pub use reclaim::{HeapReclaimer, NoopReclaimer};
pub use report::{JsonReporter, OutputFormat, Reporter, TextReporter};
pub use runner::BenchmarkRunner;
pub use spec::{BenchmarkResult, BenchmarkSpec};
pub use workloads::Workload;
