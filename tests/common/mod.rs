//! Shared helpers for microbench integration tests
//!
//! Counting operations and fixed-cost clocks used to check the runner's
//! invocation and timing contract without depending on real time.

#![allow(dead_code)]

use microbench::{BenchmarkSpec, FakeClock};
use std::cell::Cell;
use std::collections::TryReserveError;
use std::convert::Infallible;
use std::rc::Rc;
use std::time::Duration;

/// Shared call counter for operations under test
#[derive(Debug, Clone, Default)]
pub struct CallCounter {
    calls: Rc<Cell<u64>>,
}

impl CallCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self) -> u64 {
        let next = self.calls.get() + 1;
        self.calls.set(next);
        next
    }

    pub fn calls(&self) -> u64 {
        self.calls.get()
    }
}

/// A real allocation failure, produced without allocating
pub fn reserve_error() -> TryReserveError {
    let mut v: Vec<u8> = Vec::new();
    match v.try_reserve(usize::MAX) {
        Err(err) => err,
        Ok(()) => unreachable!("reserving usize::MAX bytes cannot succeed"),
    }
}

/// Spec whose every call advances `clock` by `cost` and bumps `counter`
pub fn fixed_cost_spec(
    name: &str,
    iterations: u64,
    clock: &FakeClock,
    cost: Duration,
    counter: &CallCounter,
) -> BenchmarkSpec<impl FnMut() -> Result<(), Infallible>> {
    let name = name.to_owned();
    let clock = clock.clone();
    let counter = counter.clone();
    BenchmarkSpec::from_fn(name, iterations, move || {
        counter.record();
        clock.advance(cost);
    })
}

/// Spec that fails with an allocation error on timed iteration `fail_at`
///
/// Call 1 is the warmup, so timed iteration `k` is call `k + 1`.
pub fn exhausting_spec(
    iterations: u64,
    fail_at: u64,
    counter: &CallCounter,
) -> BenchmarkSpec<impl FnMut() -> Result<(), TryReserveError>> {
    let counter = counter.clone();
    BenchmarkSpec::new("exhausting", iterations, move || {
        if counter.record() == fail_at + 1 {
            Err(reserve_error())
        } else {
            Ok(())
        }
    })
}
