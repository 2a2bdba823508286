//! Environment Configuration Helpers
//!
//! Typed access to environment variables. [`Env`] is a snapshot, so
//! configuration code can be tested without touching the process
//! environment.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::crypto;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{name} must be set in environment")]
    Missing { name: String },

    #[error("{name} has an invalid value: {reason}")]
    Invalid { name: String, reason: String },
}

impl ConfigError {
    fn invalid(name: &str, reason: impl ToString) -> Self {
        Self::Invalid {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Snapshot of environment variables
#[derive(Debug, Clone, Default)]
pub struct Env {
    vars: HashMap<String, String>,
}

impl Env {
    /// Capture the current process environment
    pub fn from_process() -> Self {
        Self::from_pairs(std::env::vars())
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Trimmed value; blank counts as unset
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn require(&self, name: &str) -> Result<&str, ConfigError> {
        self.get(name).ok_or_else(|| ConfigError::Missing {
            name: name.to_string(),
        })
    }

    pub fn string_or(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or(default).to_string()
    }

    /// Parse a value, falling back to `default` when unset
    pub fn parse_or<T>(&self, name: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get(name) {
            Some(raw) => raw.parse().map_err(|e| ConfigError::invalid(name, e)),
            None => Ok(default),
        }
    }

    /// Whole seconds as a [`Duration`]
    pub fn secs_or(&self, name: &str, default: Duration) -> Result<Duration, ConfigError> {
        let secs = self.parse_or(name, default.as_secs())?;
        if secs == 0 {
            return Err(ConfigError::invalid(name, "must be greater than zero"));
        }
        Ok(Duration::from_secs(secs))
    }

    /// Standard base64 encoded bytes
    pub fn base64(&self, name: &str) -> Result<Option<Vec<u8>>, ConfigError> {
        self.get(name)
            .map(|raw| crypto::from_base64(raw).map_err(|e| ConfigError::invalid(name, e)))
            .transpose()
    }

    /// Comma-separated list; blank items are skipped
    pub fn list_or(&self, name: &str, default: &str) -> Vec<String> {
        self.get(name)
            .unwrap_or(default)
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    }
}
