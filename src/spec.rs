//! Benchmark definition and outcome types

use crate::error::BenchmarkError;
use serde::Serialize;
use std::convert::Infallible;
use std::time::Duration;

/// What to benchmark: a label, an iteration count and the operation itself
///
/// A `BenchmarkSpec` is moved into [`BenchmarkRunner::run`](crate::BenchmarkRunner::run)
/// and consumed by it; fields are read-only after construction.
pub struct BenchmarkSpec<F> {
    name: String,
    iterations: u64,
    operation: F,
}

impl<F> BenchmarkSpec<F> {
    /// Create a spec for a fallible operation
    pub fn new<E>(name: impl Into<String>, iterations: u64, operation: F) -> Self
    where
        F: FnMut() -> Result<(), E>,
    {
        Self {
            name: name.into(),
            iterations,
            operation,
        }
    }
}

impl BenchmarkSpec<()> {
    /// Create a spec for an operation that cannot fail
    ///
    /// ```rust
    /// use microbench::BenchmarkSpec;
    ///
    /// let spec = BenchmarkSpec::from_fn("noop", 100, || {});
    /// assert_eq!(spec.iterations(), 100);
    /// ```
    pub fn from_fn<G>(
        name: impl Into<String>,
        iterations: u64,
        mut operation: G,
    ) -> BenchmarkSpec<impl FnMut() -> Result<(), Infallible>>
    where
        G: FnMut(),
    {
        BenchmarkSpec::new(name, iterations, move || {
            operation();
            Ok(())
        })
    }
}

impl<F> BenchmarkSpec<F> {
    /// Benchmark label
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of timed iterations requested
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Check the preconditions that must hold before any timing starts
    pub fn validate<E>(&self) -> Result<(), BenchmarkError<E>> {
        if self.iterations == 0 {
            return Err(BenchmarkError::invalid_spec(format!(
                "iterations must be greater than zero for '{}'",
                self.name
            )));
        }
        Ok(())
    }

    pub(crate) fn into_parts(self) -> (String, u64, F) {
        (self.name, self.iterations, self.operation)
    }
}

impl<F> std::fmt::Debug for BenchmarkSpec<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BenchmarkSpec")
            .field("name", &self.name)
            .field("iterations", &self.iterations)
            .finish_non_exhaustive()
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BenchmarkResult {
    name: String,
    total_iterations: u64,
    #[serde(rename = "average_ns", serialize_with = "serialize_nanos")]
    average_duration_per_iteration: Duration,
    #[serde(rename = "total_elapsed_ns", serialize_with = "serialize_nanos")]
    total_elapsed: Duration,
}

impl BenchmarkResult {
    /// Build a result from the total elapsed time of `total_iterations` timed calls
    ///
    /// The average is `elapsed / total_iterations` in whole nanoseconds,
    /// truncating any remainder. Callers must have validated
    /// `total_iterations > 0`; the runner does so before timing.
    pub(crate) fn from_elapsed(
        name: impl Into<String>,
        total_iterations: u64,
        elapsed: Duration,
    ) -> Self {
        let average_nanos = elapsed
            .as_nanos()
            .checked_div(u128::from(total_iterations))
            .unwrap_or(0);
        Self {
            name: name.into(),
            total_iterations,
            average_duration_per_iteration: nanos_to_duration(average_nanos),
            total_elapsed: elapsed,
        }
    }

    /// Benchmark label
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of timed iterations that were measured
    pub fn total_iterations(&self) -> u64 {
        self.total_iterations
    }

    /// Mean time per timed iteration, nanosecond precision
    pub fn average_duration_per_iteration(&self) -> Duration {
        self.average_duration_per_iteration
    }

    /// Wall time of the whole timed loop
    pub fn total_elapsed(&self) -> Duration {
        self.total_elapsed
    }
}

fn nanos_to_duration(nanos: u128) -> Duration {
    let secs = u64::try_from(nanos / 1_000_000_000).unwrap_or(u64::MAX);
    // remainder is always < 1e9
    let subsec = (nanos % 1_000_000_000) as u32;
    Duration::new(secs, subsec)
}

fn serialize_nanos<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(saturating_nanos(*duration))
}

/// Whole nanoseconds of `duration`, clamped to `u64::MAX`
pub(crate) fn saturating_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}
