//! Built-in workloads for the command line
//!
//! Each workload builds a boxed operation for [`BenchmarkSpec`]. Allocating
//! workloads use `try_reserve*` so that running out of memory surfaces as a
//! `TryReserveError`, which the runner reports as resource exhaustion.

use crate::spec::BenchmarkSpec;
use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::TryReserveError;
use std::hint::black_box;

/// Seed for the sort workload's input, fixed so runs are comparable
const SORT_SEED: u64 = 0x9E37_79B9;

/// Boxed operation produced by a workload
pub type WorkloadOperation = Box<dyn FnMut() -> Result<(), TryReserveError>>;

/// Named operations the CLI can benchmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Workload {
    /// Does nothing; measures loop and call overhead
    Noop,
    /// Builds a string of `size` characters one push at a time
    StringConcat,
    /// Reserves and fills a `size`-byte buffer
    VecAlloc,
    /// Sorts `size` pseudo-random integers
    Sort,
}

impl Workload {
    /// Every workload, in listing order
    pub const ALL: [Workload; 4] = [
        Workload::Noop,
        Workload::StringConcat,
        Workload::VecAlloc,
        Workload::Sort,
    ];

    /// Name as accepted on the command line
    pub fn name(self) -> &'static str {
        match self {
            Workload::Noop => "noop",
            Workload::StringConcat => "string-concat",
            Workload::VecAlloc => "vec-alloc",
            Workload::Sort => "sort",
        }
    }

    /// Short description for `--list`
    pub fn description(self) -> &'static str {
        match self {
            Workload::Noop => "empty operation (loop overhead)",
            Workload::StringConcat => "push SIZE characters onto a String",
            Workload::VecAlloc => "reserve and fill a SIZE-byte Vec",
            Workload::Sort => "sort SIZE pseudo-random u32 values",
        }
    }

    /// Build the operation for `size` elements
    pub fn operation(self, size: usize) -> WorkloadOperation {
        match self {
            Workload::Noop => Box::new(|| -> Result<(), TryReserveError> {
                black_box(());
                Ok(())
            }),
            Workload::StringConcat => Box::new(move || -> Result<(), TryReserveError> {
                let mut text = String::new();
                text.try_reserve(size)?;
                for i in 0..size {
                    text.push(char::from(b'a' + (i % 26) as u8));
                }
                black_box(text);
                Ok(())
            }),
            Workload::VecAlloc => Box::new(move || -> Result<(), TryReserveError> {
                let mut buffer: Vec<u8> = Vec::new();
                buffer.try_reserve_exact(size)?;
                buffer.resize(size, 0xA5);
                black_box(buffer);
                Ok(())
            }),
            Workload::Sort => {
                let mut rng = StdRng::seed_from_u64(SORT_SEED);
                Box::new(move || -> Result<(), TryReserveError> {
                    let mut values = random_values(&mut rng, size)?;
                    values.sort_unstable();
                    black_box(values);
                    Ok(())
                })
            }
        }
    }

    /// Build a ready-to-run spec for this workload
    pub fn spec(self, iterations: u64, size: usize) -> BenchmarkSpec<WorkloadOperation> {
        BenchmarkSpec::new(self.name(), iterations, self.operation(size))
    }
}

fn random_values<R: Rng>(rng: &mut R, size: usize) -> Result<Vec<u32>, TryReserveError> {
    let mut values: Vec<u32> = Vec::new();
    values.try_reserve_exact(size)?;
    values.extend((0..size).map(|_| rng.gen::<u32>()));
    Ok(values)
}
