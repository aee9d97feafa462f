//! Benchmark runner
//!
//! [`BenchmarkRunner::run`] is a single linear procedure:
//!
//! 1. validate the `BenchmarkSpec` (fail fast with `InvalidSpec`, nothing else happens)
//! 2. ask the [`HeapReclaimer`] to settle the heap
//! 3. call the operation once as warmup
//! 4. read the clock, call the operation `iterations` times, read the clock
//! 5. divide and return a [`BenchmarkResult`]
//!
//! The runner holds no state between runs and never writes output; formatting
//! belongs to a [`Reporter`](crate::Reporter).

use crate::clock::{Clock, SystemClock};
use crate::error::{BenchmarkError, ResourceExhaustion};
use crate::reclaim::{HeapReclaimer, NoopReclaimer};
use crate::spec::{saturating_nanos, BenchmarkResult, BenchmarkSpec};
use std::hint::black_box;
use std::time::Duration;

/// Runs benchmark specs against an injectable clock
#[derive(Debug, Clone)]
pub struct BenchmarkRunner<C = SystemClock, R = NoopReclaimer> {
    clock: C,
    reclaimer: R,
    deadline: Option<Duration>,
}

impl BenchmarkRunner {
    /// Runner on the system monotonic clock
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new())
    }
}

impl Default for BenchmarkRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> BenchmarkRunner<C> {
    /// Runner on a caller-supplied clock
    #[must_use]
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            reclaimer: NoopReclaimer,
            deadline: None,
        }
    }
}

impl<C, R> BenchmarkRunner<C, R> {
    /// Replace the heap reclamation hint
    #[must_use]
    pub fn with_reclaimer<R2: HeapReclaimer>(self, reclaimer: R2) -> BenchmarkRunner<C, R2> {
        BenchmarkRunner {
            clock: self.clock,
            reclaimer,
            deadline: self.deadline,
        }
    }

    /// Stop the timed loop once it has run longer than `deadline`
    ///
    /// The clock is then read after every iteration, which adds a small
    /// constant to each measured call.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Configured deadline, if any
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }
}

impl<C: Clock, R: HeapReclaimer> BenchmarkRunner<C, R> {
    /// Run `spec` and return the average time per iteration
    ///
    /// The operation is called exactly `iterations + 1` times on success: one
    /// untimed warmup call followed by the timed loop.
    ///
    /// # Errors
    ///
    /// - [`BenchmarkError::InvalidSpec`] if `iterations` is zero. The operation
    ///   is not called and the clock is not read.
    /// - [`BenchmarkError::ResourceExhausted`] if the operation returns an error
    ///   classified as resource exhaustion. The loop stops at that call.
    /// - [`BenchmarkError::Operation`] with the operation's own error otherwise.
    /// - [`BenchmarkError::DeadlineExceeded`] if a deadline is set and passed.
    ///
    /// ```rust
    /// use microbench::{BenchmarkRunner, BenchmarkSpec, FakeClock};
    /// use std::time::Duration;
    ///
    /// let clock = FakeClock::new();
    /// let tick = clock.clone();
    /// let spec = BenchmarkSpec::from_fn("noop", 100, move || tick.advance(Duration::from_nanos(10)));
    ///
    /// let result = BenchmarkRunner::with_clock(clock).run(spec)?;
    /// assert_eq!(result.total_iterations(), 100);
    /// assert_eq!(result.average_duration_per_iteration(), Duration::from_nanos(10));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn run<F, E>(&self, spec: BenchmarkSpec<F>) -> Result<BenchmarkResult, BenchmarkError<E>>
    where
        F: FnMut() -> Result<(), E>,
        E: ResourceExhaustion,
    {
        spec.validate::<E>()?;
        let (name, iterations, mut operation) = spec.into_parts();
        tracing::debug!(benchmark = %name, iterations, "starting benchmark");

        self.reclaimer.reclaim();

        if let Err(err) = operation() {
            return Err(Self::operation_failed(name, 0, err));
        }

        let elapsed = match self.deadline {
            None => self.timed_loop(&name, iterations, &mut operation)?,
            Some(deadline) => {
                self.timed_loop_with_deadline(&name, iterations, deadline, &mut operation)?
            }
        };

        let result = BenchmarkResult::from_elapsed(name, iterations, elapsed);
        tracing::debug!(
            benchmark = %result.name(),
            average_ns = saturating_nanos(result.average_duration_per_iteration()),
            "benchmark finished"
        );
        Ok(result)
    }

    fn timed_loop<F, E>(
        &self,
        name: &str,
        iterations: u64,
        operation: &mut F,
    ) -> Result<Duration, BenchmarkError<E>>
    where
        F: FnMut() -> Result<(), E>,
        E: ResourceExhaustion,
    {
        let start = self.clock.now();
        for iteration in 1..=iterations {
            if let Err(err) = black_box(operation()) {
                return Err(Self::operation_failed(name.to_owned(), iteration, err));
            }
        }
        Ok(self.clock.now().saturating_sub(start))
    }

    fn timed_loop_with_deadline<F, E>(
        &self,
        name: &str,
        iterations: u64,
        deadline: Duration,
        operation: &mut F,
    ) -> Result<Duration, BenchmarkError<E>>
    where
        F: FnMut() -> Result<(), E>,
        E: ResourceExhaustion,
    {
        let start = self.clock.now();
        let mut elapsed = Duration::ZERO;
        for iteration in 1..=iterations {
            if let Err(err) = black_box(operation()) {
                return Err(Self::operation_failed(name.to_owned(), iteration, err));
            }
            elapsed = self.clock.now().saturating_sub(start);
            if elapsed > deadline {
                tracing::warn!(benchmark = %name, completed = iteration, ?deadline, "deadline exceeded");
                return Err(BenchmarkError::DeadlineExceeded {
                    name: name.to_owned(),
                    completed: iteration,
                    deadline,
                });
            }
        }
        Ok(elapsed)
    }

    fn operation_failed<E: ResourceExhaustion>(
        name: String,
        iteration: u64,
        err: E,
    ) -> BenchmarkError<E> {
        if err.is_resource_exhausted() {
            tracing::warn!(benchmark = %name, iteration, "operation exhausted resources");
            BenchmarkError::ResourceExhausted {
                name,
                iteration,
                source: err,
            }
        } else {
            BenchmarkError::Operation(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;
    use std::cell::Cell;
    use std::collections::TryReserveError;

    fn reserve_error() -> TryReserveError {
        let mut v: Vec<u8> = Vec::new();
        match v.try_reserve(usize::MAX) {
            Err(err) => err,
            Ok(()) => unreachable!("reserving usize::MAX bytes cannot succeed"),
        }
    }

    struct CountingReclaimer<'a> {
        calls: &'a Cell<u32>,
        operation_calls: &'a Cell<u64>,
        operation_calls_at_reclaim: &'a Cell<Option<u64>>,
    }

    impl HeapReclaimer for CountingReclaimer<'_> {
        fn reclaim(&self) {
            self.calls.set(self.calls.get() + 1);
            self.operation_calls_at_reclaim
                .set(Some(self.operation_calls.get()));
        }
    }

    /// **What is tested:** The end-to-end noop example with a fixed-cost fake clock
    /// **Why it is tested:** Average per iteration must equal the per-call cost
    /// **Test conditions:** 100 iterations, clock advances 10ns per call
    /// **Expectations:** total_iterations 100, average 10ns, total 1000ns
    #[test]
    fn test_run_noop_example() -> Result<(), Box<dyn std::error::Error>> {
        let clock = FakeClock::new();
        let tick = clock.clone();
        let spec = BenchmarkSpec::from_fn("noop", 100, move || {
            tick.advance(Duration::from_nanos(10));
        });

        let result = BenchmarkRunner::with_clock(clock).run(spec)?;

        assert_eq!(result.name(), "noop");
        assert_eq!(result.total_iterations(), 100);
        assert_eq!(
            result.average_duration_per_iteration(),
            Duration::from_nanos(10)
        );
        assert_eq!(result.total_elapsed(), Duration::from_nanos(1_000));
        Ok(())
    }

    /// **What is tested:** Number of operation invocations on success
    /// **Why it is tested:** Exactly one warmup plus N timed calls must happen
    /// **Test conditions:** Counting operation, 25 iterations
    /// **Expectations:** 26 calls
    #[test]
    fn test_invocation_count() -> Result<(), Box<dyn std::error::Error>> {
        let calls = Cell::new(0u64);
        let spec = BenchmarkSpec::from_fn("count", 25, || calls.set(calls.get() + 1));

        BenchmarkRunner::with_clock(FakeClock::new()).run(spec)?;

        assert_eq!(calls.get(), 26);
        Ok(())
    }

    /// **What is tested:** Fail-fast on an invalid spec
    /// **Why it is tested:** No timing side effects may happen before validation passes
    /// **Test conditions:** Zero iterations with a counting operation, reclaimer and fake clock
    /// **Expectations:** InvalidSpec; operation, reclaimer and clock untouched
    #[test]
    fn test_invalid_spec_has_no_side_effects() {
        let clock = FakeClock::new();
        let operation_calls = Cell::new(0u64);
        let reclaims = Cell::new(0u32);
        let at_reclaim = Cell::new(None);
        let runner = BenchmarkRunner::with_clock(clock.clone()).with_reclaimer(CountingReclaimer {
            calls: &reclaims,
            operation_calls: &operation_calls,
            operation_calls_at_reclaim: &at_reclaim,
        });

        let spec = BenchmarkSpec::from_fn("noop", 0, || operation_calls.set(operation_calls.get() + 1));
        let result = runner.run(spec);

        assert!(matches!(result, Err(BenchmarkError::InvalidSpec { .. })));
        assert_eq!(operation_calls.get(), 0);
        assert_eq!(reclaims.get(), 0);
        assert_eq!(clock.reads(), 0);
    }

    /// **What is tested:** Ordering of the heap reclamation hint
    /// **Why it is tested:** Reclamation must happen once, before the warmup call
    /// **Test conditions:** Counting reclaimer that records the operation call count
    /// **Expectations:** One reclaim, observed when the operation had not yet been called
    #[test]
    fn test_reclaim_runs_once_before_warmup() -> Result<(), Box<dyn std::error::Error>> {
        let operation_calls = Cell::new(0u64);
        let reclaims = Cell::new(0u32);
        let at_reclaim = Cell::new(None);
        let runner = BenchmarkRunner::with_clock(FakeClock::new()).with_reclaimer(CountingReclaimer {
            calls: &reclaims,
            operation_calls: &operation_calls,
            operation_calls_at_reclaim: &at_reclaim,
        });

        let spec = BenchmarkSpec::from_fn("noop", 3, || operation_calls.set(operation_calls.get() + 1));
        runner.run(spec)?;

        assert_eq!(reclaims.get(), 1);
        assert_eq!(at_reclaim.get(), Some(0));
        assert_eq!(operation_calls.get(), 4);
        Ok(())
    }

    /// **What is tested:** Warmup cost is excluded from the measurement
    /// **Why it is tested:** One-time initialization must not skew the steady-state average
    /// **Test conditions:** First call costs 1ms, later calls 5ns
    /// **Expectations:** Average of 5ns
    #[test]
    fn test_warmup_is_not_timed() -> Result<(), Box<dyn std::error::Error>> {
        let clock = FakeClock::new();
        let tick = clock.clone();
        let first = Cell::new(true);
        let spec = BenchmarkSpec::from_fn("lazy", 10, move || {
            if first.replace(false) {
                tick.advance(Duration::from_millis(1));
            } else {
                tick.advance(Duration::from_nanos(5));
            }
        });

        let result = BenchmarkRunner::with_clock(clock).run(spec)?;

        assert_eq!(
            result.average_duration_per_iteration(),
            Duration::from_nanos(5)
        );
        Ok(())
    }

    /// **What is tested:** Resource exhaustion mid-loop
    /// **Why it is tested:** The loop must stop at the failing iteration and report its index
    /// **Test conditions:** Operation fails with TryReserveError on its 4th timed call of 10
    /// **Expectations:** ResourceExhausted at iteration 4; 1 + 4 calls total
    #[test]
    fn test_resource_exhaustion_stops_loop() {
        let calls = Cell::new(0u64);
        let spec = BenchmarkSpec::new("alloc", 10, || {
            calls.set(calls.get() + 1);
            // call 1 is the warmup
            if calls.get() == 5 {
                Err(reserve_error())
            } else {
                Ok(())
            }
        });

        let result = BenchmarkRunner::with_clock(FakeClock::new()).run(spec);

        match result {
            Err(BenchmarkError::ResourceExhausted {
                name, iteration, ..
            }) => {
                assert_eq!(name, "alloc");
                assert_eq!(iteration, 4);
            }
            other => panic!("expected ResourceExhausted, got {other:?}"),
        }
        assert_eq!(calls.get(), 5);
    }

    /// **What is tested:** Resource exhaustion during warmup
    /// **Why it is tested:** The warmup call is reported as iteration 0 and the clock never starts
    /// **Test conditions:** Operation always fails with TryReserveError
    /// **Expectations:** ResourceExhausted at iteration 0, one call, clock unread
    #[test]
    fn test_resource_exhaustion_during_warmup() {
        let clock = FakeClock::new();
        let calls = Cell::new(0u64);
        let spec = BenchmarkSpec::new("alloc", 10, || {
            calls.set(calls.get() + 1);
            Err(reserve_error())
        });

        let result = BenchmarkRunner::with_clock(clock.clone()).run(spec);

        assert!(matches!(
            result,
            Err(BenchmarkError::ResourceExhausted { iteration: 0, .. })
        ));
        assert_eq!(calls.get(), 1);
        assert_eq!(clock.reads(), 0);
    }

    /// **What is tested:** Propagation of ordinary operation errors
    /// **Why it is tested:** The runner measures and must not mask defects in the code under test
    /// **Test conditions:** Operation returns a NotFound io::Error on the 2nd timed call
    /// **Expectations:** Operation error with the original kind and message; loop stopped
    #[test]
    fn test_other_errors_propagate_unmodified() {
        let calls = Cell::new(0u64);
        let spec = BenchmarkSpec::new("io", 10, || {
            calls.set(calls.get() + 1);
            if calls.get() == 3 {
                Err(std::io::Error::new(std::io::ErrorKind::NotFound, "missing fixture"))
            } else {
                Ok(())
            }
        });

        let result = BenchmarkRunner::with_clock(FakeClock::new()).run(spec);

        match result {
            Err(BenchmarkError::Operation(err)) => {
                assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
                assert_eq!(err.to_string(), "missing fixture");
            }
            other => panic!("expected Operation error, got {other:?}"),
        }
        assert_eq!(calls.get(), 3);
    }

    /// **What is tested:** Deadline enforcement
    /// **Why it is tested:** A deadline must stop the loop and never yield a partial average
    /// **Test conditions:** 1ms per call, 100 iterations, 5ms deadline
    /// **Expectations:** DeadlineExceeded after 6 completed iterations
    #[test]
    fn test_deadline_exceeded() {
        let clock = FakeClock::new();
        let tick = clock.clone();
        let spec = BenchmarkSpec::from_fn("slow", 100, move || {
            tick.advance(Duration::from_millis(1));
        });

        let runner = BenchmarkRunner::with_clock(clock).with_deadline(Duration::from_millis(5));
        let result = runner.run(spec);

        match result {
            Err(BenchmarkError::DeadlineExceeded {
                completed,
                deadline,
                ..
            }) => {
                assert_eq!(completed, 6);
                assert_eq!(deadline, Duration::from_millis(5));
            }
            other => panic!("expected DeadlineExceeded, got {other:?}"),
        }
    }

    /// **What is tested:** A deadline that is never reached
    /// **Why it is tested:** The deadline path must report the same average as the plain loop
    /// **Test conditions:** 10ns per call, 50 iterations, 1s deadline
    /// **Expectations:** Average 10ns
    #[test]
    fn test_deadline_not_reached() -> Result<(), Box<dyn std::error::Error>> {
        let clock = FakeClock::new();
        let tick = clock.clone();
        let spec = BenchmarkSpec::from_fn("fast", 50, move || {
            tick.advance(Duration::from_nanos(10));
        });

        let runner = BenchmarkRunner::with_clock(clock).with_deadline(Duration::from_secs(1));
        assert_eq!(runner.deadline(), Some(Duration::from_secs(1)));
        let result = runner.run(spec)?;

        assert_eq!(
            result.average_duration_per_iteration(),
            Duration::from_nanos(10)
        );
        Ok(())
    }

    /// **What is tested:** Running on the real system clock
    /// **Why it is tested:** The default runner must work without any injected collaborator
    /// **Test conditions:** BenchmarkRunner::new with a small summing workload
    /// **Expectations:** Success with the requested iteration count
    #[test]
    fn test_run_with_system_clock() -> Result<(), Box<dyn std::error::Error>> {
        let mut sum = 0u64;
        let spec = BenchmarkSpec::from_fn("sum", 1_000, || {
            sum = black_box(sum.wrapping_add(1));
        });

        let result = BenchmarkRunner::new().run(spec)?;

        assert_eq!(result.total_iterations(), 1_000);
        assert!(result.total_elapsed() >= result.average_duration_per_iteration());
        Ok(())
    }
}
