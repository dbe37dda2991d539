// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The slot store contract
//!
//! A store owns every slot's seat counters. `claim_seat` is the only
//! operation that takes a seat, and it is atomic: racing callers for the
//! last seat see exactly one `Granted`. A granted claim must end in either
//! `record_booking` or `release_seat`; claims left dangling are released by
//! `expire_claims`.

use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kiln_core::{Booking, BookingId, DateKey, SlotMap, TimeOfDay};
use serde::{Deserialize, Serialize};

/// Proof that a seat was taken, consumed by recording or releasing it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimToken {
    pub id: String,
    pub date: DateKey,
    pub time: TimeOfDay,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimResult {
    Granted(ClaimToken),
    Full,
}

impl ClaimResult {
    pub fn is_granted(&self) -> bool {
        matches!(self, ClaimResult::Granted(_))
    }
}

/// One counter a reconciliation pass rewrote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    pub date: DateKey,
    pub time: TimeOfDay,
    pub before: u32,
    pub after: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    pub slots_checked: usize,
    pub corrections: Vec<Correction>,
}

impl ReconcileReport {
    pub fn is_clean(&self) -> bool {
        self.corrections.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    BookingCreated,
    ClaimReleased,
    ClaimsExpired,
    SlotsSeeded,
    Reconciled,
}

/// Audit record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub kind: ActivityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<BookingId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub at: DateTime<Utc>,
}

impl ActivityEntry {
    pub fn new(kind: ActivityKind, at: DateTime<Utc>) -> Self {
        Self {
            kind,
            booking_id: None,
            actor: None,
            detail: None,
            at,
        }
    }

    pub fn booking(mut self, booking: &Booking) -> Self {
        self.booking_id = Some(booking.id.clone());
        self.actor = booking.actor.clone();
        self
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Durable source of truth for slot capacity and bookings
#[async_trait]
pub trait SlotStore: Clone + Send + Sync + 'static {
    /// Slots dated `today ..= today + horizon_days`, ordered by date
    ///
    /// Fails with [`StoreError::Uninitialized`] when the store holds no
    /// slots at all.
    async fn list_upcoming_slots(
        &self,
        today: DateKey,
        horizon_days: u32,
    ) -> Result<SlotMap, StoreError>;

    /// Take one seat at (date, time) if any remain
    async fn claim_seat(&self, date: DateKey, time: TimeOfDay) -> Result<ClaimResult, StoreError>;

    /// Persist `booking` against a granted claim, consuming the claim
    async fn record_booking(
        &self,
        token: &ClaimToken,
        booking: Booking,
    ) -> Result<Booking, StoreError>;

    /// Give back a claimed seat; returns false if the claim was not held
    async fn release_seat(&self, token: &ClaimToken) -> Result<bool, StoreError>;

    /// Insert slots for dates the store does not know yet
    ///
    /// Existing dates are left untouched. Returns the number inserted.
    async fn seed_slots(&self, slots: SlotMap) -> Result<usize, StoreError>;

    /// Recompute every seat counter from recorded bookings plus live claims
    async fn reconcile(&self) -> Result<ReconcileReport, StoreError>;

    /// Release claims issued before `cutoff`
    async fn expire_claims(&self, cutoff: DateTime<Utc>) -> Result<Vec<ClaimToken>, StoreError>;

    async fn find_booking(&self, id: &BookingId) -> Result<Option<Booking>, StoreError>;
}
