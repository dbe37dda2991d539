// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced store wrapper for consistent observability

use crate::error::StoreError;
use crate::store::{ClaimResult, ClaimToken, ReconcileReport, SlotStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kiln_core::{Booking, BookingId, DateKey, SlotMap, TimeOfDay};
use std::time::Instant;
use tracing::Instrument;

/// Wrapper that adds tracing to any SlotStore
#[derive(Clone)]
pub struct TracedStore<S> {
    inner: S,
}

impl<S> TracedStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

#[async_trait]
impl<S: SlotStore> SlotStore for TracedStore<S> {
    async fn list_upcoming_slots(
        &self,
        today: DateKey,
        horizon_days: u32,
    ) -> Result<SlotMap, StoreError> {
        let span = tracing::info_span!("store.list_upcoming_slots", %today, horizon_days);
        async {
            let start = Instant::now();
            let result = self.inner.list_upcoming_slots(today, horizon_days).await;
            match &result {
                Ok(slots) => tracing::debug!(
                    slots = slots.len(),
                    elapsed_ms = elapsed_ms(start),
                    "listed"
                ),
                Err(StoreError::Uninitialized) => tracing::info!("store has no slots yet"),
                Err(e) => tracing::warn!(elapsed_ms = elapsed_ms(start), error = %e, "list failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn claim_seat(&self, date: DateKey, time: TimeOfDay) -> Result<ClaimResult, StoreError> {
        let span = tracing::info_span!("store.claim_seat", %date, %time);
        async {
            let start = Instant::now();
            let result = self.inner.claim_seat(date, time).await;
            match &result {
                Ok(ClaimResult::Granted(token)) => tracing::info!(
                    claim = %token.id,
                    elapsed_ms = elapsed_ms(start),
                    "seat granted"
                ),
                Ok(ClaimResult::Full) => {
                    tracing::info!(elapsed_ms = elapsed_ms(start), "no seat left")
                }
                Err(e) => {
                    tracing::warn!(elapsed_ms = elapsed_ms(start), error = %e, "claim failed")
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn record_booking(
        &self,
        token: &ClaimToken,
        booking: Booking,
    ) -> Result<Booking, StoreError> {
        let span = tracing::info_span!(
            "store.record_booking",
            claim = %token.id,
            booking = %booking.id
        );
        async {
            let start = Instant::now();
            let result = self.inner.record_booking(token, booking).await;
            match &result {
                Ok(_) => tracing::info!(elapsed_ms = elapsed_ms(start), "booking recorded"),
                Err(e) => {
                    tracing::error!(elapsed_ms = elapsed_ms(start), error = %e, "record failed")
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn release_seat(&self, token: &ClaimToken) -> Result<bool, StoreError> {
        let span = tracing::info_span!("store.release_seat", claim = %token.id);
        async {
            let result = self.inner.release_seat(token).await;
            match &result {
                Ok(true) => tracing::info!("seat released"),
                Ok(false) => tracing::debug!("claim was not held"),
                Err(e) => tracing::error!(error = %e, "release failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn seed_slots(&self, slots: SlotMap) -> Result<usize, StoreError> {
        let span = tracing::info_span!("store.seed_slots", offered = slots.len());
        async {
            let result = self.inner.seed_slots(slots).await;
            match &result {
                Ok(inserted) => tracing::info!(inserted, "slots seeded"),
                Err(e) => tracing::error!(error = %e, "seed failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn reconcile(&self) -> Result<ReconcileReport, StoreError> {
        let span = tracing::info_span!("store.reconcile");
        async {
            let start = Instant::now();
            let result = self.inner.reconcile().await;
            match &result {
                Ok(report) => {
                    for c in &report.corrections {
                        tracing::warn!(
                            date = %c.date,
                            time = %c.time,
                            before = c.before,
                            after = c.after,
                            "seat counter corrected"
                        );
                    }
                    tracing::info!(
                        checked = report.slots_checked,
                        corrections = report.corrections.len(),
                        elapsed_ms = elapsed_ms(start),
                        "reconciled"
                    );
                }
                Err(e) => tracing::error!(error = %e, "reconcile failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn expire_claims(&self, cutoff: DateTime<Utc>) -> Result<Vec<ClaimToken>, StoreError> {
        let span = tracing::info_span!("store.expire_claims", %cutoff);
        async {
            let result = self.inner.expire_claims(cutoff).await;
            match &result {
                Ok(expired) if expired.is_empty() => {}
                Ok(expired) => tracing::warn!(count = expired.len(), "stale claims released"),
                Err(e) => tracing::error!(error = %e, "expire failed"),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn find_booking(&self, id: &BookingId) -> Result<Option<Booking>, StoreError> {
        let span = tracing::debug_span!("store.find_booking", booking = %id);
        self.inner.find_booking(id).instrument(span).await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
