//! Configuration module for microbench
//!
//! This module combines CLI arguments with environment variables using strict
//! error handling and clear priority logic.
//!
//! # Architecture
//!
//! - [`env_reader`] - Low-level environment access behind the [`EnvReader`] trait
//! - [`env_config`] - Typed, validated `MICROBENCH_*` variables
//! - [`app_config`] - High-level application configuration with CLI integration
//!
//! # Priority Logic
//!
//! 1. CLI parameters (highest priority)
//! 2. Environment variables
//! 3. Hardcoded defaults (only when the variable is not set)
//!
//! Malformed environment values are reported as [`ConfigError`], never
//! replaced by defaults.
//!
//! # Usage
//!
//! ```rust
//! use microbench::config::{AppConfig, CliArgs};
//!
//! let config = AppConfig::from_cli(CliArgs {
//!     iterations: Some(500),
//!     ..CliArgs::default()
//! })?;
//! assert_eq!(config.iterations(), 500);
//! # Ok::<(), microbench::ConfigError>(())
//! ```

pub mod app_config;
pub mod env_config;
pub mod env_reader;

pub use app_config::{AppConfig, CliArgs, ConfigBuilder};
pub use env_config::{ConfigError, EnvConfig};
pub use env_reader::{EnvError, EnvReader, SystemEnvReader};
