// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fault-injecting store wrapper for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use crate::error::StoreError;
use crate::store::{ClaimResult, ClaimToken, ReconcileReport, SlotStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kiln_core::{Booking, BookingId, DateKey, SlotMap, TimeOfDay};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Default)]
struct Faults {
    offline: bool,
    failing_claims: u32,
    failing_records: u32,
    failing_releases: u32,
    delay: Option<Duration>,
    calls: Vec<&'static str>,
}

fn take(counter: &mut u32) -> bool {
    if *counter > 0 {
        *counter -= 1;
        true
    } else {
        false
    }
}

/// Store wrapper that fails or stalls on demand
#[derive(Clone)]
pub struct FlakyStore<S> {
    inner: S,
    faults: Arc<Mutex<Faults>>,
}

impl<S: SlotStore> FlakyStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            faults: Arc::new(Mutex::new(Faults::default())),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Every call fails with [`StoreError::Unavailable`] until [`Self::go_online`]
    pub fn go_offline(&self) {
        self.faults().offline = true;
    }

    pub fn go_online(&self) {
        self.faults().offline = false;
    }

    pub fn fail_next_claims(&self, n: u32) {
        self.faults().failing_claims = n;
    }

    pub fn fail_next_records(&self, n: u32) {
        self.faults().failing_records = n;
    }

    pub fn fail_next_releases(&self, n: u32) {
        self.faults().failing_releases = n;
    }

    /// Stall every call by `delay` before it reaches the inner store
    pub fn delay_calls(&self, delay: Duration) {
        self.faults().delay = Some(delay);
    }

    /// Names of the operations called so far, in order
    pub fn calls(&self) -> Vec<&'static str> {
        self.faults().calls.clone()
    }

    fn faults(&self) -> std::sync::MutexGuard<'_, Faults> {
        self.faults.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn enter(
        &self,
        op: &'static str,
        pick: impl FnOnce(&mut Faults) -> bool,
    ) -> Result<(), StoreError> {
        let (delay, fail) = {
            let mut faults = self.faults();
            faults.calls.push(op);
            let fail = faults.offline || pick(&mut faults);
            (faults.delay, fail)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(StoreError::Unavailable(format!("injected {op} failure")));
        }
        Ok(())
    }
}

#[async_trait]
impl<S: SlotStore> SlotStore for FlakyStore<S> {
    async fn list_upcoming_slots(
        &self,
        today: DateKey,
        horizon_days: u32,
    ) -> Result<SlotMap, StoreError> {
        self.enter("list", |_| false).await?;
        self.inner.list_upcoming_slots(today, horizon_days).await
    }

    async fn claim_seat(&self, date: DateKey, time: TimeOfDay) -> Result<ClaimResult, StoreError> {
        self.enter("claim", |f| take(&mut f.failing_claims)).await?;
        self.inner.claim_seat(date, time).await
    }

    async fn record_booking(
        &self,
        token: &ClaimToken,
        booking: Booking,
    ) -> Result<Booking, StoreError> {
        self.enter("record", |f| take(&mut f.failing_records)).await?;
        self.inner.record_booking(token, booking).await
    }

    async fn release_seat(&self, token: &ClaimToken) -> Result<bool, StoreError> {
        self.enter("release", |f| take(&mut f.failing_releases))
            .await?;
        self.inner.release_seat(token).await
    }

    async fn seed_slots(&self, slots: SlotMap) -> Result<usize, StoreError> {
        self.enter("seed", |_| false).await?;
        self.inner.seed_slots(slots).await
    }

    async fn reconcile(&self) -> Result<ReconcileReport, StoreError> {
        self.enter("reconcile", |_| false).await?;
        self.inner.reconcile().await
    }

    async fn expire_claims(&self, cutoff: DateTime<Utc>) -> Result<Vec<ClaimToken>, StoreError> {
        self.enter("expire", |_| false).await?;
        self.inner.expire_claims(cutoff).await
    }

    async fn find_booking(&self, id: &BookingId) -> Result<Option<Booking>, StoreError> {
        self.enter("find", |_| false).await?;
        self.inner.find_booking(id).await
    }
}
