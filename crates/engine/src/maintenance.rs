// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic store upkeep
//!
//! Each tick releases claims older than the claim TTL, reconciles seat
//! counters when a failed compensation asked for it, and seeds the
//! schedule forward so the horizon never runs dry.

use crate::availability::AvailabilityService;
use kiln_core::Clock;
use kiln_storage::{ReconcileReport, SlotStore};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default age after which an unrecorded claim is released
pub const DEFAULT_CLAIM_TTL: Duration = Duration::from_secs(120);

/// Shared request for a reconciliation pass
#[derive(Debug, Clone, Default)]
pub struct ReconcileFlag(Arc<AtomicBool>);

impl ReconcileFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear the flag, returning whether it was raised
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaintenanceReport {
    pub expired: usize,
    pub seeded: usize,
    pub reconciled: Option<ReconcileReport>,
}

pub struct MaintenanceTask<S, C> {
    store: S,
    clock: C,
    claim_ttl: Duration,
    flag: ReconcileFlag,
    availability: AvailabilityService<S, C>,
}

impl<S: SlotStore, C: Clock> MaintenanceTask<S, C> {
    pub fn new(
        store: S,
        clock: C,
        claim_ttl: Duration,
        flag: ReconcileFlag,
        availability: AvailabilityService<S, C>,
    ) -> Self {
        Self {
            store,
            clock,
            claim_ttl,
            flag,
            availability,
        }
    }

    /// Run one upkeep pass; failures are logged and retried next tick
    pub async fn tick(&self) -> MaintenanceReport {
        let mut report = MaintenanceReport::default();

        let ttl = chrono::Duration::from_std(self.claim_ttl).unwrap_or(chrono::Duration::MAX);
        if let Some(cutoff) = self.clock.utc_now().checked_sub_signed(ttl) {
            match self.store.expire_claims(cutoff).await {
                Ok(expired) => report.expired = expired.len(),
                Err(e) => tracing::warn!(error = %e, "claim expiry failed"),
            }
        }

        if self.flag.take() {
            match self.store.reconcile().await {
                Ok(r) => report.reconciled = Some(r),
                Err(e) => {
                    tracing::error!(error = %e, "reconcile failed, will retry");
                    self.flag.raise();
                }
            }
        }

        match self.availability.ensure_horizon().await {
            Ok(seeded) => report.seeded = seeded,
            Err(e) => tracing::warn!(error = %e, "horizon extension failed"),
        }

        report
    }
}

#[cfg(test)]
#[path = "maintenance_tests.rs"]
mod tests;
