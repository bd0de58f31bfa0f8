//! Editor configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::str::FromStr;
use std::time::Duration;

use crate::consts::{AUTOSAVE_DEBOUNCE_MS, HISTORY_CAPACITY};

pub const HISTORY_CAPACITY_VAR: &str = "ARCHITECH_HISTORY_CAPACITY";
pub const AUTOSAVE_DEBOUNCE_VAR: &str = "ARCHITECH_AUTOSAVE_DEBOUNCE_MS";

/// A configuration variable that is set but unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}: cannot parse {value:?}")]
    Parse { var: &'static str, value: String },
    #[error("{var}: must be at least {min}, got {value}")]
    OutOfRange { var: &'static str, value: u64, min: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorConfig {
    /// Maximum number of undo/redo entries.
    pub history_capacity: usize,
    /// Quiet period after the last edit before an autosave write.
    pub autosave_debounce: Duration,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_capacity: HISTORY_CAPACITY,
            autosave_debounce: Duration::from_millis(AUTOSAVE_DEBOUNCE_MS),
        }
    }
}

impl EditorConfig {
    /// Build config from the process environment.
    ///
    /// Optional:
    /// - `ARCHITECH_HISTORY_CAPACITY`: default 50, at least 1
    /// - `ARCHITECH_AUTOSAVE_DEBOUNCE_MS`: default 1000
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| match std::env::var(key) {
            Ok(value) => Some(value),
            Err(_) => None,
        })
    }

    /// Build config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let history_capacity: usize = parse_var(&lookup, HISTORY_CAPACITY_VAR, HISTORY_CAPACITY)?;
        if history_capacity == 0 {
            return Err(ConfigError::OutOfRange { var: HISTORY_CAPACITY_VAR, value: 0, min: 1 });
        }
        let debounce_ms: u64 = parse_var(&lookup, AUTOSAVE_DEBOUNCE_VAR, AUTOSAVE_DEBOUNCE_MS)?;
        Ok(Self { history_capacity, autosave_debounce: Duration::from_millis(debounce_ms) })
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    let Some(raw) = lookup(var) else {
        return Ok(default);
    };
    raw.trim().parse::<T>().map_err(|_| ConfigError::Parse { var, value: raw })
}
