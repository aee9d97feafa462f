//! Error handling module
//!
//! This module provides the error types for microbench: [`BenchmarkError`] for a
//! single run, and the crate-level [`Error`] that the CLI glue works with.

use std::collections::TryReserveError;
use std::convert::Infallible;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, Error>;

/// Failure of a single benchmark run
///
/// `E` is the error type of the operation under test. Only resource exhaustion
/// is special-cased; any other operation error comes back untouched in
/// [`BenchmarkError::Operation`].
#[derive(Debug, Error)]
pub enum BenchmarkError<E> {
    /// Precondition violated. Raised before any timing side effects.
    #[error("invalid benchmark spec: {reason}")]
    InvalidSpec { reason: String },

    /// The operation ran out of memory or an equivalent resource.
    ///
    /// `iteration` is the 1-based index of the timed invocation that failed;
    /// `0` means the warmup invocation failed.
    #[error("benchmark '{name}' exhausted resources at iteration {iteration}: {source}")]
    ResourceExhausted {
        name: String,
        iteration: u64,
        #[source]
        source: E,
    },

    /// Any other operation failure, returned unmodified
    #[error(transparent)]
    Operation(E),

    /// The timed loop ran past the configured deadline
    #[error(
        "benchmark '{name}' exceeded deadline of {deadline:?} after {completed} iterations"
    )]
    DeadlineExceeded {
        name: String,
        completed: u64,
        deadline: Duration,
    },
}

impl<E> BenchmarkError<E> {
    /// Build an `InvalidSpec` error
    pub fn invalid_spec(reason: impl Into<String>) -> Self {
        BenchmarkError::InvalidSpec {
            reason: reason.into(),
        }
    }

    /// Number of timed iterations that finished before the run stopped
    pub fn completed_iterations(&self) -> u64 {
        match self {
            BenchmarkError::ResourceExhausted { iteration, .. } => iteration.saturating_sub(1),
            BenchmarkError::DeadlineExceeded { completed, .. } => *completed,
            BenchmarkError::InvalidSpec { .. } | BenchmarkError::Operation(_) => 0,
        }
    }

    /// Recover the operation's own error, if there is one
    pub fn into_operation_error(self) -> Option<E> {
        match self {
            BenchmarkError::ResourceExhausted { source, .. } => Some(source),
            BenchmarkError::Operation(err) => Some(err),
            BenchmarkError::InvalidSpec { .. } | BenchmarkError::DeadlineExceeded { .. } => None,
        }
    }
}

/// Classifies operation errors that mean "out of memory or equivalent"
///
/// The runner stops and reports [`BenchmarkError::ResourceExhausted`] for
/// these. Everything else is passed through as [`BenchmarkError::Operation`].
pub trait ResourceExhaustion {
    /// Whether this error is a resource exhaustion
    fn is_resource_exhausted(&self) -> bool;
}

impl ResourceExhaustion for Infallible {
    fn is_resource_exhausted(&self) -> bool {
        match *self {}
    }
}

impl ResourceExhaustion for TryReserveError {
    fn is_resource_exhausted(&self) -> bool {
        true
    }
}

impl ResourceExhaustion for std::io::Error {
    fn is_resource_exhausted(&self) -> bool {
        self.kind() == std::io::ErrorKind::OutOfMemory
    }
}

impl ResourceExhaustion for anyhow::Error {
    fn is_resource_exhausted(&self) -> bool {
        self.chain().any(is_exhausted_dyn)
    }
}

impl ResourceExhaustion for Box<dyn std::error::Error + Send + Sync> {
    fn is_resource_exhausted(&self) -> bool {
        let mut current: Option<&(dyn std::error::Error + 'static)> = Some(self.as_ref());
        while let Some(err) = current {
            if is_exhausted_dyn(err) {
                return true;
            }
            current = err.source();
        }
        false
    }
}

fn is_exhausted_dyn(err: &(dyn std::error::Error + 'static)) -> bool {
    err.downcast_ref::<TryReserveError>().is_some()
        || err
            .downcast_ref::<std::io::Error>()
            .is_some_and(<std::io::Error as ResourceExhaustion>::is_resource_exhausted)
}

/// Main error type for the application
#[derive(Debug, Error)]
pub enum Error {
    /// IO-related errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// A benchmark run failed
    #[error("Benchmark failed: {0}")]
    Benchmark(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Another error with added context
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl<E> From<BenchmarkError<E>> for Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(err: BenchmarkError<E>) -> Self {
        Error::Benchmark(Box::new(err))
    }
}

impl Error {
    /// Whether this error, possibly behind context, is a benchmark failure
    pub fn is_benchmark_failure(&self) -> bool {
        match self {
            Error::Benchmark(_) => true,
            Error::Context { source, .. } => source.is_benchmark_failure(),
            _ => false,
        }
    }
}

/// Context extension for Result types
pub trait ResultExt<T> {
    /// Add context to an error using a closure
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| Error::Context {
            context: f(),
            source: Box::new(e.into()),
        })
    }
}
