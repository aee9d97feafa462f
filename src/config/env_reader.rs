//! Environment reader module
//!
//! Low-level access to process environment variables behind a trait, so that
//! configuration resolution can be tested without touching the real
//! environment.

use std::env::{self, VarError};
use thiserror::Error;

/// Errors that can occur while reading an environment variable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    /// The variable is set but is not valid Unicode
    #[error("environment variable {key} is not valid unicode")]
    NotUnicode { key: String },
}

/// Trait for reading configuration values from the environment
pub trait EnvReader {
    /// Value of `key`, or `None` when it is unset or blank
    fn get_var(&self, key: &str) -> Result<Option<String>, EnvError>;
}

/// Reader backed by [`std::env::var`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnvReader;

impl EnvReader for SystemEnvReader {
    fn get_var(&self, key: &str) -> Result<Option<String>, EnvError> {
        match env::var(key) {
            Ok(value) => Ok(normalize(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(_)) => Err(EnvError::NotUnicode {
                key: key.to_owned(),
            }),
        }
    }
}

fn normalize(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Mock environment reader for testing
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockEnvReader {
    vars: std::collections::HashMap<String, String>,
    not_unicode: std::collections::HashSet<String>,
}

#[cfg(test)]
impl MockEnvReader {
    /// Create an empty mock environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable
    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_owned(), value.to_owned());
        self
    }

    /// Mark a variable as set to a non-unicode value
    pub fn with_non_unicode(mut self, key: &str) -> Self {
        self.not_unicode.insert(key.to_owned());
        self
    }
}

#[cfg(test)]
impl EnvReader for MockEnvReader {
    fn get_var(&self, key: &str) -> Result<Option<String>, EnvError> {
        if self.not_unicode.contains(key) {
            return Err(EnvError::NotUnicode {
                key: key.to_owned(),
            });
        }
        Ok(self.vars.get(key).cloned().and_then(normalize))
    }
}
