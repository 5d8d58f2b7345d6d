// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Retry configuration, from defaults, a YAML file and `ALIASFS_*` variables.

use std::path::Path;
use std::time::Duration;

use diagnostics::log_debug;
use serde::{Deserialize, Deserializer};

use crate::error::{Error, Result};
use crate::retry::{CONTENDED_MAX_RETRIES, DEFAULT_DELAY, DEFAULT_MAX_RETRIES, RetryPolicy};

pub const ENV_RETRIES: &str = "ALIASFS_RETRIES";
pub const ENV_RETRY_DELAY: &str = "ALIASFS_RETRY_DELAY";
pub const ENV_UPDATE_RETRIES: &str = "ALIASFS_UPDATE_RETRIES";
pub const ENV_UPDATE_RETRY_DELAY: &str = "ALIASFS_UPDATE_RETRY_DELAY";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RetryConfig {
    pub max_retries: usize,
    /// Written as a human duration, e.g. `50ms` or `1s`.
    #[serde(deserialize_with = "deserialize_duration")]
    pub delay: Duration,
}

impl RetryConfig {
    pub fn policy(&self) -> Result<RetryPolicy> {
        RetryPolicy::new(self.max_retries, self.delay)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            delay: DEFAULT_DELAY,
        }
    }
}

/// Retry budgets for the gateway: `retry` for every primitive,
/// `update_retry` for acquiring the lock in a concurrent update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FsConfig {
    pub retry: RetryConfig,
    pub update_retry: RetryConfig,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            update_retry: RetryConfig {
                max_retries: CONTENDED_MAX_RETRIES,
                delay: DEFAULT_DELAY,
            },
        }
    }
}

impl FsConfig {
    /// Defaults overlaid with the `ALIASFS_*` process variables.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides(|name| std::env::var(name).ok())
    }

    /// Read a YAML file. Missing keys keep their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {e}", path.display())))?;
        let config = Self::from_yaml(&text)?;
        let file = path.to_string_lossy();
        log_debug!("Loaded retry configuration from {file}", file: file.as_ref());
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml_ng::from_str(text).map_err(|e| Error::config(e.to_string()))
    }

    /// Apply overrides through `lookup`, which maps a variable name to its value.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_RETRIES) {
            self.retry.max_retries = parse_count(ENV_RETRIES, &value)?;
        }
        if let Some(value) = lookup(ENV_RETRY_DELAY) {
            self.retry.delay = parse_delay(ENV_RETRY_DELAY, &value)?;
        }
        if let Some(value) = lookup(ENV_UPDATE_RETRIES) {
            self.update_retry.max_retries = parse_count(ENV_UPDATE_RETRIES, &value)?;
        }
        if let Some(value) = lookup(ENV_UPDATE_RETRY_DELAY) {
            self.update_retry.delay = parse_delay(ENV_UPDATE_RETRY_DELAY, &value)?;
        }
        Ok(self)
    }
}

fn parse_count(name: &str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .map_err(|e| Error::config(format!("{name}={value}: {e}")))
}

fn parse_delay(name: &str, value: &str) -> Result<Duration> {
    parse_duration::parse(value.trim()).map_err(|e| Error::config(format!("{name}={value}: {e}")))
}

fn deserialize_duration<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    parse_duration::parse(&text).map_err(serde::de::Error::custom)
}
