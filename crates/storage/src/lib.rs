// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Durable slot and booking stores

mod backend;
mod document;
mod error;
mod ledger;
mod optimistic;
mod store;
mod traced;
mod wal;

pub use backend::{AnyStore, DOCUMENT_FILE, LEDGER_FILE, LOCK_FILE};
pub use document::{DocumentStore, SlotDoc};
pub use error::StoreError;
pub use ledger::{BookingRow, LedgerOp, LedgerStore, SlotRow, DEFAULT_CAS_ATTEMPTS};
pub use optimistic::{with_optimistic_retry, CasOutcome};
pub use store::{
    ActivityEntry, ActivityKind, ClaimResult, ClaimToken, Correction, ReconcileReport, SlotStore,
};
pub use traced::TracedStore;
pub use wal::Wal;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod flaky;
#[cfg(any(test, feature = "test-support"))]
pub use flaky::FlakyStore;
