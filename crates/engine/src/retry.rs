// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded retry with exponential backoff
//!
//! Store calls go through [`call_store`], which puts a timeout on every
//! attempt and retries only errors the store reports as transient.

use kiln_storage::StoreError;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Retry policy configuration for exponential backoff.
///
/// Defaults: 3 retries, 100ms initial delay doubling up to 2s.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    pub initial_delay: Duration,
    /// Cap for the exponential delay
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(100))
    }
}

impl RetryPolicy {
    #[must_use]
    pub const fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
            max_delay: Duration::from_secs(2),
            multiplier: 2.0,
        }
    }

    /// A policy that never retries
    #[must_use]
    pub const fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    #[must_use]
    pub const fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    #[must_use]
    pub const fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Delay before retry number `attempt` (zero-based), capped at `max_delay`
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return self.initial_delay.min(self.max_delay);
        }
        let delay_ms =
            self.initial_delay.as_millis() as f64 * self.multiplier.powi(attempt as i32);
        let delay = Duration::from_millis(delay_ms as u64);
        delay.min(self.max_delay)
    }
}

/// Retry `operation` while `is_retryable` holds, up to the policy's limit
///
/// Returns the last error once retries are exhausted.
pub async fn retry_with_predicate<F, Fut, T, E, P>(
    policy: &RetryPolicy,
    mut operation: F,
    is_retryable: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!(attempt, "succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => {
                if !is_retryable(&err) {
                    return Err(err);
                }
                if attempt >= policy.max_retries {
                    tracing::warn!(attempt, error = %err, "giving up after retries");
                    return Err(err);
                }
                let delay = policy.delay_for_attempt(attempt);
                tracing::debug!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "retrying"
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// Run one store call with a per-attempt timeout and transient retries
///
/// A timed-out attempt counts as [`StoreError::Timeout`], which is itself
/// transient.
pub async fn call_store<F, Fut, T>(
    policy: &RetryPolicy,
    timeout: Duration,
    mut operation: F,
) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    retry_with_predicate(
        policy,
        || {
            let attempt = operation();
            async move {
                tokio::time::timeout(timeout, attempt)
                    .await
                    .unwrap_or(Err(StoreError::Timeout(timeout)))
            }
        },
        StoreError::is_transient,
    )
    .await
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
