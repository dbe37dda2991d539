// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Availability reads with schedule fallback
//!
//! An uninitialized store is seeded from the configured schedule and read
//! again. When the store is unreachable and the caller allows it, the
//! schedule is generated locally instead and every slot is marked offline,
//! so a later claim against it is refused rather than silently accepted.

use crate::error::AvailabilityError;
use crate::retry::{call_store, RetryPolicy};
use kiln_core::{Clock, DateKey, ScheduleGenerator, SlotMap};
use kiln_storage::{SlotStore, StoreError};
use std::time::Duration;
use tracing::Instrument;

/// Default per-call store timeout
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Only store-backed slots; fail if the store cannot be read
    Live,
    /// Fall back to a locally generated, offline schedule
    AllowOffline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvailabilitySnapshot {
    pub today: DateKey,
    pub slots: SlotMap,
    /// Slots were generated locally and cannot be booked
    pub offline: bool,
}

impl AvailabilitySnapshot {
    /// Dates with at least one open seat
    pub fn open_dates(&self) -> impl Iterator<Item = DateKey> + '_ {
        self.slots
            .values()
            .filter(|slot| slot.has_open_seat())
            .map(|slot| slot.date)
    }
}

#[derive(Clone)]
pub struct AvailabilityService<S, C> {
    store: S,
    clock: C,
    generator: ScheduleGenerator,
    horizon_days: u32,
    policy: RetryPolicy,
    call_timeout: Duration,
}

impl<S: SlotStore, C: Clock> AvailabilityService<S, C> {
    pub fn new(store: S, clock: C, generator: ScheduleGenerator, horizon_days: u32) -> Self {
        Self {
            store,
            clock,
            generator,
            horizon_days,
            policy: RetryPolicy::default(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_retry(mut self, policy: RetryPolicy, call_timeout: Duration) -> Self {
        self.policy = policy;
        self.call_timeout = call_timeout;
        self
    }

    pub fn today(&self) -> DateKey {
        DateKey::new(self.clock.today())
    }

    pub fn horizon_days(&self) -> u32 {
        self.horizon_days
    }

    pub async fn load(&self, mode: FetchMode) -> Result<AvailabilitySnapshot, AvailabilityError> {
        let today = self.today();
        let span = tracing::info_span!("availability.load", %today, ?mode);
        async {
            match self.load_live(today).await {
                Ok(slots) => Ok(AvailabilitySnapshot {
                    today,
                    slots,
                    offline: false,
                }),
                Err(e) if e.is_transient() && mode == FetchMode::AllowOffline => {
                    tracing::warn!(error = %e, "store unreachable, serving offline schedule");
                    Ok(AvailabilitySnapshot {
                        today,
                        slots: self.generator.generate_offline(today, self.horizon_days),
                        offline: true,
                    })
                }
                Err(e) => Err(e.into()),
            }
        }
        .instrument(span)
        .await
    }

    async fn load_live(&self, today: DateKey) -> Result<SlotMap, StoreError> {
        match self.list(today).await {
            Err(StoreError::Uninitialized) => {
                tracing::warn!("store has no slots, seeding the default schedule");
                self.seed_from(today).await?;
                match self.list(today).await {
                    // Nothing in the schedule falls inside the horizon
                    Err(StoreError::Uninitialized) => Ok(SlotMap::new()),
                    other => other,
                }
            }
            other => other,
        }
    }

    async fn list(&self, today: DateKey) -> Result<SlotMap, StoreError> {
        call_store(&self.policy, self.call_timeout, || {
            self.store.list_upcoming_slots(today, self.horizon_days)
        })
        .await
    }

    async fn seed_from(&self, today: DateKey) -> Result<usize, StoreError> {
        let slots = self.generator.generate(today, self.horizon_days);
        if slots.is_empty() {
            return Ok(0);
        }
        call_store(&self.policy, self.call_timeout, || {
            self.store.seed_slots(slots.clone())
        })
        .await
    }

    /// Seed any dates in `today ..= today + horizon` the store lacks
    ///
    /// Existing dates, and their counters, are never touched.
    pub async fn ensure_horizon(&self) -> Result<usize, StoreError> {
        let inserted = self.seed_from(self.today()).await?;
        if inserted > 0 {
            tracing::info!(inserted, horizon_days = self.horizon_days, "horizon extended");
        }
        Ok(inserted)
    }
}

#[cfg(test)]
#[path = "availability_tests.rs"]
mod tests;
