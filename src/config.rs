// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::error::{ReaperError, Result};
use std::env;
use std::time::Duration;

const DEFAULT_SWEEP_CONCURRENCY: usize = 1;
const DEFAULT_REMAINING_REQUEUE_SECS: u64 = 5;
const DEFAULT_ERROR_REQUEUE_SECS: u64 = 60;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Number of resource types swept at the same time
    pub sweep_concurrency: usize,
    /// Delay before sweeping again while objects are still draining
    pub remaining_requeue: Duration,
    pub error_requeue: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            sweep_concurrency: DEFAULT_SWEEP_CONCURRENCY,
            remaining_requeue: Duration::from_secs(DEFAULT_REMAINING_REQUEUE_SECS),
            error_requeue: Duration::from_secs(DEFAULT_ERROR_REQUEUE_SECS),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let sweep_concurrency =
            parse_var(&lookup, "SWEEP_CONCURRENCY")?.unwrap_or(DEFAULT_SWEEP_CONCURRENCY);
        if sweep_concurrency == 0 {
            return Err(ReaperError::ConfigError(
                "SWEEP_CONCURRENCY must be at least 1".to_string(),
            ));
        }

        let remaining_requeue = parse_var(&lookup, "REMAINING_REQUEUE_SECS")?
            .unwrap_or(DEFAULT_REMAINING_REQUEUE_SECS);
        let error_requeue =
            parse_var(&lookup, "ERROR_REQUEUE_SECS")?.unwrap_or(DEFAULT_ERROR_REQUEUE_SECS);

        Ok(Config {
            sweep_concurrency,
            remaining_requeue: Duration::from_secs(remaining_requeue),
            error_requeue: Duration::from_secs(error_requeue),
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| ReaperError::ConfigError(format!("{} is invalid: {}", key, e))),
    }
}
