// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-compute-conditional-write retry loop

use crate::error::StoreError;
use std::future::Future;

/// Result of one optimistic attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CasOutcome<T> {
    /// The attempt reached a verdict (which may be "no capacity")
    Done(T),
    /// The conditional write lost a race; try again
    Contended,
}

/// Run `operation` until it reaches a verdict, at most `max_attempts` times
///
/// Only [`CasOutcome::Contended`] is retried. Errors from the operation end
/// the loop immediately. Exhausting every attempt yields
/// [`StoreError::Conflict`].
pub async fn with_optimistic_retry<T, F, Fut>(
    max_attempts: u32,
    mut operation: F,
) -> Result<T, StoreError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<CasOutcome<T>, StoreError>>,
{
    let attempts = max_attempts.max(1);
    for attempt in 1..=attempts {
        match operation(attempt).await? {
            CasOutcome::Done(value) => return Ok(value),
            CasOutcome::Contended => {
                tracing::debug!(attempt, max_attempts = attempts, "write contended, retrying");
                tokio::task::yield_now().await;
            }
        }
    }
    Err(StoreError::Conflict { attempts })
}

#[cfg(test)]
#[path = "optimistic_tests.rs"]
mod tests;
