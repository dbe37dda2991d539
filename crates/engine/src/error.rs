// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the reservation engine

use kiln_storage::StoreError;
use thiserror::Error;

/// Errors from availability queries
#[derive(Debug, Error)]
pub enum AvailabilityError {
    #[error("slot store unavailable: {0}")]
    Unavailable(#[source] StoreError),
    #[error("store error: {0}")]
    Store(#[source] StoreError),
}

impl From<StoreError> for AvailabilityError {
    fn from(e: StoreError) -> Self {
        if e.is_transient() {
            AvailabilityError::Unavailable(e)
        } else {
            AvailabilityError::Store(e)
        }
    }
}

/// Errors assembling a studio from configuration
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
