//! Process-wide limit configuration.
//!
//! Bounds are read once at startup from `POINT_LIMIT_MIN` and
//! `POINT_LIMIT_MAX`; unset variables fall back to the defaults below.

use crate::error::{LedgerError, Result};
use crate::policy::LimitPolicy;
use std::env;

pub const MIN_VAR: &str = "POINT_LIMIT_MIN";
pub const MAX_VAR: &str = "POINT_LIMIT_MAX";

pub const DEFAULT_MIN: i64 = 0;
pub const DEFAULT_MAX: i64 = 1_000_000;

/// Raw balance bounds before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitConfig {
    pub min: i64,
    pub max: i64,
}

impl Default for LimitConfig {
    fn default() -> Self {
        LimitConfig {
            min: DEFAULT_MIN,
            max: DEFAULT_MAX,
        }
    }
}

impl LimitConfig {
    /// Loads bounds from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads bounds through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(LimitConfig {
            min: parse_var(MIN_VAR, lookup(MIN_VAR), defaults.min)?,
            max: parse_var(MAX_VAR, lookup(MAX_VAR), defaults.max)?,
        })
    }

    /// Validates the bounds into a policy.
    pub fn policy(&self) -> Result<LimitPolicy> {
        LimitPolicy::new(self.min, self.max)
    }
}

fn parse_var(key: &'static str, value: Option<String>, default: i64) -> Result<i64> {
    match value {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| LedgerError::InvalidConfig { key, value }),
    }
}
