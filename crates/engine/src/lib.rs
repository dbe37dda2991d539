// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Reservation engine: availability, booking attempts and store upkeep

mod availability;
mod coordinator;
mod error;
mod maintenance;
mod outbox;
mod retry;
mod studio;

pub use availability::{AvailabilityService, AvailabilitySnapshot, FetchMode, DEFAULT_CALL_TIMEOUT};
pub use coordinator::{ConflictReason, Outcome, ReservationCoordinator};
pub use error::{AvailabilityError, EngineError};
pub use maintenance::{MaintenanceReport, MaintenanceTask, ReconcileFlag, DEFAULT_CLAIM_TTL};
pub use outbox::{Outbox, OutboxStats};
pub use retry::{call_store, retry_with_predicate, RetryPolicy};
pub use studio::{open_store, studio_contact, Studio, StudioDeps, StudioStore};
