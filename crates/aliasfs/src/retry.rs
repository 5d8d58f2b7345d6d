// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Retry executor used by every gateway primitive.
//!
//! A failed operation is retried after a fixed delay until the retry budget
//! is spent, then the last error is handed back unchanged so callers can
//! still branch on what went wrong.

use std::future::Future;
use std::time::Duration;

use backon::{ConstantBuilder, Retryable};
use diagnostics::log_warn;

use crate::error::{Error, Result};

pub const DEFAULT_MAX_RETRIES: usize = 10;
pub const DEFAULT_DELAY: Duration = Duration::from_millis(50);

/// Retry budget for opening a file that other updaters are holding.
pub const CONTENDED_MAX_RETRIES: usize = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: usize,
    delay: Duration,
    jitter: bool,
}

impl RetryPolicy {
    /// A fixed-delay policy. `max_retries` counts attempts after the first.
    pub fn new(max_retries: usize, delay: Duration) -> Result<Self> {
        if delay.is_zero() {
            return Err(Error::invalid_argument(
                "retry delay must be greater than zero",
            ));
        }
        Ok(Self {
            max_retries,
            delay,
            jitter: false,
        })
    }

    /// Policy for lock contention: a large budget, and jitter so that
    /// updaters which collided once do not collide again in lockstep.
    #[must_use]
    pub fn contended() -> Self {
        Self {
            max_retries: CONTENDED_MAX_RETRIES,
            delay: DEFAULT_DELAY,
            jitter: true,
        }
    }

    #[must_use]
    pub fn with_jitter(mut self) -> Self {
        self.jitter = true;
        self
    }

    #[must_use]
    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    fn backoff(&self) -> ConstantBuilder {
        let builder = ConstantBuilder::default()
            .with_delay(self.delay)
            .with_max_times(self.max_retries);
        if self.jitter {
            builder.with_jitter()
        } else {
            builder
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            delay: DEFAULT_DELAY,
            jitter: false,
        }
    }
}

/// Runs fallible async operations under a [`RetryPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RetryExecutor {
    policy: RetryPolicy,
}

impl RetryExecutor {
    #[must_use]
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }

    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Run `op`, retrying transient failures. Errors that
    /// [`Error::is_transient`] rejects are returned on the first occurrence.
    pub async fn run<T, F, Fut>(&self, op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        op.retry(self.policy.backoff())
            .sleep(tokio::time::sleep)
            .when(Error::is_transient)
            .notify(|err: &Error, delay: Duration| {
                let error = err.to_string();
                let delay_ms = delay.as_millis() as u64;
                log_warn!("Retrying in {delay_ms}ms after error: {error}", delay_ms: delay_ms, error: error.as_str());
            })
            .await
    }
}
