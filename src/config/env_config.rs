//! Environment configuration module
//!
//! Typed, validated access to the `MICROBENCH_*` environment variables.

use super::env_reader::{EnvError, EnvReader};
use crate::report::OutputFormat;
use crate::workloads::Workload;
use clap::ValueEnum;
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming the default workload
pub const WORKLOAD_VAR: &str = "MICROBENCH_WORKLOAD";
/// Environment variable with the default iteration count
pub const ITERATIONS_VAR: &str = "MICROBENCH_ITERATIONS";
/// Environment variable with the default report format
pub const FORMAT_VAR: &str = "MICROBENCH_FORMAT";
/// Environment variable with the default deadline in milliseconds
pub const DEADLINE_VAR: &str = "MICROBENCH_DEADLINE_MS";
/// Environment variable with the default workload size
pub const SIZE_VAR: &str = "MICROBENCH_SIZE";

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Invalid environment variable value
    #[error("Invalid environment value: {key}='{value}' (expected: {expected})")]
    InvalidEnvValue {
        key: String,
        value: String,
        expected: String,
    },
    /// Environment variable could not be decoded
    #[error("Environment variable {key} is not valid unicode")]
    EnvNotUnicode { key: String },
    /// Invalid CLI argument value
    #[error("Invalid CLI argument: {argument}='{value}' (expected: {expected})")]
    InvalidCliArgument {
        argument: String,
        value: String,
        expected: String,
    },
}

impl From<EnvError> for ConfigError {
    fn from(error: EnvError) -> Self {
        match error {
            EnvError::NotUnicode { key } => ConfigError::EnvNotUnicode { key },
        }
    }
}

/// Environment configuration operations
pub struct EnvConfig;

impl EnvConfig {
    /// Workload from `reader`
    pub fn get_workload_with_reader<R: EnvReader>(
        reader: &R,
    ) -> Result<Option<Workload>, ConfigError> {
        reader
            .get_var(WORKLOAD_VAR)?
            .map(|value| {
                Workload::from_str(&value, true)
                    .map_err(|_| invalid(WORKLOAD_VAR, &value, &workload_names()))
            })
            .transpose()
    }

    /// Iteration count from `reader`
    ///
    /// Zero and negative values are accepted here; the runner rejects them.
    pub fn get_iterations_with_reader<R: EnvReader>(
        reader: &R,
    ) -> Result<Option<i64>, ConfigError> {
        reader
            .get_var(ITERATIONS_VAR)?
            .map(|value| {
                value
                    .parse::<i64>()
                    .map_err(|_| invalid(ITERATIONS_VAR, &value, "an integer"))
            })
            .transpose()
    }

    /// Report format from `reader`
    pub fn get_format_with_reader<R: EnvReader>(
        reader: &R,
    ) -> Result<Option<OutputFormat>, ConfigError> {
        reader
            .get_var(FORMAT_VAR)?
            .map(|value| {
                value
                    .parse::<OutputFormat>()
                    .map_err(|_| invalid(FORMAT_VAR, &value, "text or json"))
            })
            .transpose()
    }

    /// Deadline from `reader`
    pub fn get_deadline_with_reader<R: EnvReader>(
        reader: &R,
    ) -> Result<Option<Duration>, ConfigError> {
        reader
            .get_var(DEADLINE_VAR)?
            .map(|value| {
                value
                    .parse::<u64>()
                    .ok()
                    .filter(|ms| *ms > 0)
                    .map(Duration::from_millis)
                    .ok_or_else(|| {
                        invalid(DEADLINE_VAR, &value, "a positive number of milliseconds")
                    })
            })
            .transpose()
    }

    /// Workload size from `reader`
    pub fn get_size_with_reader<R: EnvReader>(reader: &R) -> Result<Option<usize>, ConfigError> {
        reader
            .get_var(SIZE_VAR)?
            .map(|value| {
                value
                    .parse::<usize>()
                    .map_err(|_| invalid(SIZE_VAR, &value, "a non-negative integer"))
            })
            .transpose()
    }
}

fn invalid(key: &str, value: &str, expected: &str) -> ConfigError {
    ConfigError::InvalidEnvValue {
        key: key.to_owned(),
        value: value.to_owned(),
        expected: expected.to_owned(),
    }
}

fn workload_names() -> String {
    Workload::ALL
        .iter()
        .map(|workload| workload.name())
        .collect::<Vec<_>>()
        .join(", ")
}
