// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use kiln_core::{BookingId, DateKey, TimeOfDay};
use std::time::Duration;
use thiserror::Error;

/// Errors returned by slot stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
    #[error("write conflict persisted after {attempts} attempts")]
    Conflict { attempts: u32 },
    #[error("no slot offered on {date} at {time}")]
    SlotNotFound { date: DateKey, time: TimeOfDay },
    #[error("claim {0} is not held")]
    ClaimNotHeld(String),
    #[error("booking does not match claim {0}")]
    ClaimMismatch(String),
    #[error("booking {0} already exists")]
    DuplicateBooking(BookingId),
    #[error("store has no slots")]
    Uninitialized,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Failures worth retrying with backoff
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StoreError::Unavailable(_) | StoreError::Timeout(_) | StoreError::Conflict { .. }
        )
    }
}
