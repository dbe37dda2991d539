// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only ledger store
//!
//! Models a flat tabular backend: one row per slot date and one appended
//! row per booking. The only conditional write is a compare-and-set on a
//! single slot row's `booked` cell, guarded by the row version. Claims are
//! taken with [`with_optimistic_retry`] around read, compute and CAS.
//!
//! Booking rows are appended after the seat counter was raised, so a crash
//! in between leaves a counter that is too high. Claims are not logged and
//! are lost on restart; [`SlotStore::reconcile`] recomputes every counter
//! from the booking rows and repairs both cases.

use crate::error::StoreError;
use crate::optimistic::{with_optimistic_retry, CasOutcome};
use crate::store::{ClaimResult, ClaimToken, Correction, ReconcileReport, SlotStore};
use crate::wal::Wal;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kiln_core::{
    Attendee, Booking, BookingId, BookingStatus, ClassKind, Clock, DateKey, ExperienceLevel,
    IdGen, Slot, SlotMap, TimeOfDay, UuidIdGen,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Default compare-and-set attempts per claim
pub const DEFAULT_CAS_ATTEMPTS: u32 = 5;

/// Slot row: `[dateKey, displayDate, dayOfWeek, times, maxCapacity, booked]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRow {
    pub date_key: DateKey,
    pub display_date: String,
    pub day_of_week: String,
    #[serde(with = "csv_times")]
    pub times: Vec<TimeOfDay>,
    pub max_capacity: u32,
    /// Booked seats, aligned with `times`
    #[serde(with = "csv_counts")]
    pub booked: Vec<u32>,
    pub class_kind: ClassKind,
    pub version: u64,
}

impl SlotRow {
    fn from_slot(slot: &Slot) -> Self {
        Self {
            date_key: slot.date,
            display_date: slot.date.display_long(),
            day_of_week: slot.date.day_name().to_string(),
            times: slot.times().collect(),
            max_capacity: slot.max_capacity,
            booked: slot.seats.values().copied().collect(),
            class_kind: slot.class_kind,
            version: 0,
        }
    }

    fn position(&self, time: TimeOfDay) -> Option<usize> {
        self.times.iter().position(|t| *t == time)
    }

    fn to_slot(&self) -> Slot {
        let mut slot = Slot::new(
            self.date_key,
            self.class_kind,
            self.max_capacity,
            self.times.clone(),
        );
        for (time, booked) in self.times.iter().zip(&self.booked) {
            slot.seats.insert(*time, *booked);
        }
        slot
    }
}

/// Booking row: `[timestamp, date, time, classKind, fullName, email, phone,
/// experience, notes, status, dateKey, bookingId]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRow {
    pub timestamp: DateTime<Utc>,
    pub date: String,
    pub time: TimeOfDay,
    pub class_kind: ClassKind,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub experience: ExperienceLevel,
    pub notes: String,
    pub status: BookingStatus,
    pub date_key: DateKey,
    pub booking_id: BookingId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}

impl From<&Booking> for BookingRow {
    fn from(b: &Booking) -> Self {
        Self {
            timestamp: b.created_at,
            date: b.date.display_long(),
            time: b.time,
            class_kind: b.class_kind,
            full_name: b.attendee.full_name.clone(),
            email: b.attendee.email.clone(),
            phone: b.attendee.phone.clone(),
            experience: b.attendee.experience,
            notes: b.notes.clone().unwrap_or_default(),
            status: b.status,
            date_key: b.date,
            booking_id: b.id.clone(),
            actor: b.actor.clone(),
        }
    }
}

impl BookingRow {
    fn to_booking(&self) -> Booking {
        Booking {
            id: self.booking_id.clone(),
            date: self.date_key,
            time: self.time,
            class_kind: self.class_kind,
            attendee: Attendee {
                full_name: self.full_name.clone(),
                email: self.email.clone(),
                phone: self.phone.clone(),
                experience: self.experience,
            },
            notes: (!self.notes.is_empty()).then(|| self.notes.clone()),
            status: self.status,
            created_at: self.timestamp,
            actor: self.actor.clone(),
        }
    }
}

/// Logged ledger mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerOp {
    AppendSlotRow(SlotRow),
    WriteBooked {
        date_key: DateKey,
        #[serde(with = "csv_counts")]
        booked: Vec<u32>,
        version: u64,
    },
    AppendBookingRow(BookingRow),
}

/// Materialized sheet contents
#[derive(Debug, Default)]
struct Sheet {
    rows: BTreeMap<DateKey, SlotRow>,
    bookings: Vec<BookingRow>,
    index: HashMap<BookingId, usize>,
}

impl Sheet {
    fn apply(&mut self, op: &LedgerOp) {
        match op {
            LedgerOp::AppendSlotRow(row) => {
                self.rows.entry(row.date_key).or_insert_with(|| row.clone());
            }
            LedgerOp::WriteBooked {
                date_key,
                booked,
                version,
            } => {
                if let Some(row) = self.rows.get_mut(date_key) {
                    row.booked = booked.clone();
                    row.version = *version;
                }
            }
            LedgerOp::AppendBookingRow(row) => {
                self.index.insert(row.booking_id.clone(), self.bookings.len());
                self.bookings.push(row.clone());
            }
        }
    }
}

/// Sheet, its log and live claims, guarded together
struct Ledger {
    sheet: Sheet,
    wal: Option<Wal<LedgerOp>>,
    claims: HashMap<String, ClaimToken>,
}

impl Ledger {
    /// Log then apply; nothing changes if the log write fails
    fn commit(&mut self, op: LedgerOp) -> Result<(), StoreError> {
        if let Some(wal) = self.wal.as_mut() {
            wal.append(&op)?;
        }
        self.sheet.apply(&op);
        Ok(())
    }

    fn write_booked(&mut self, date: DateKey, booked: Vec<u32>) -> Result<(), StoreError> {
        let version = self
            .sheet
            .rows
            .get(&date)
            .map(|r| r.version + 1)
            .unwrap_or(1);
        self.commit(LedgerOp::WriteBooked {
            date_key: date,
            booked,
            version,
        })
    }
}

/// Store backed by an append-only ledger
#[derive(Clone)]
pub struct LedgerStore<C: Clock> {
    ledger: Arc<Mutex<Ledger>>,
    clock: C,
    claim_ids: UuidIdGen,
    cas_attempts: u32,
    latency: Duration,
}

impl<C: Clock> LedgerStore<C> {
    pub fn in_memory(clock: C) -> Self {
        Self::with_ledger(
            Ledger {
                sheet: Sheet::default(),
                wal: None,
                claims: HashMap::new(),
            },
            clock,
        )
    }

    /// Open or create a ledger logged at `path`, replaying what is there
    pub fn open(path: &Path, clock: C) -> Result<Self, StoreError> {
        let (wal, ops) = Wal::open(path)?;
        let mut sheet = Sheet::default();
        for op in &ops {
            sheet.apply(op);
        }
        tracing::debug!(
            path = %path.display(),
            ops = ops.len(),
            rows = sheet.rows.len(),
            bookings = sheet.bookings.len(),
            "ledger replayed"
        );
        Ok(Self::with_ledger(
            Ledger {
                sheet,
                wal: Some(wal),
                claims: HashMap::new(),
            },
            clock,
        ))
    }

    fn with_ledger(ledger: Ledger, clock: C) -> Self {
        Self {
            ledger: Arc::new(Mutex::new(ledger)),
            clock,
            claim_ids: UuidIdGen,
            cas_attempts: DEFAULT_CAS_ATTEMPTS,
            latency: Duration::ZERO,
        }
    }

    pub fn with_cas_attempts(mut self, attempts: u32) -> Self {
        self.cas_attempts = attempts.max(1);
        self
    }

    /// Delay every row read, as a remote sheet round trip would
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Every booking row, in append order
    pub fn booking_rows(&self) -> Vec<BookingRow> {
        self.lock().sheet.bookings.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Ledger> {
        self.ledger.lock().unwrap_or_else(|e| e.into_inner())
    }

    async fn read_row(&self, date: DateKey) -> Option<SlotRow> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.lock().sheet.rows.get(&date).cloned()
    }

    /// Write `booked` if the row is still at `expected_version` and the
    /// claims satisfy `precondition`
    ///
    /// The check, the write and `on_success` run under one lock, so claim
    /// bookkeeping is never observed apart from the counter it belongs to.
    fn compare_and_set(
        &self,
        date: DateKey,
        expected_version: u64,
        booked: Vec<u32>,
        precondition: impl FnOnce(&HashMap<String, ClaimToken>) -> bool,
        on_success: impl FnOnce(&mut HashMap<String, ClaimToken>),
    ) -> Result<CasWrite, StoreError> {
        let mut ledger = self.lock();
        let current = ledger.sheet.rows.get(&date).map(|r| r.version);
        if current != Some(expected_version) {
            return Ok(CasWrite::Stale);
        }
        if !precondition(&ledger.claims) {
            return Ok(CasWrite::Refused);
        }
        ledger.commit(LedgerOp::WriteBooked {
            date_key: date,
            booked,
            version: expected_version + 1,
        })?;
        on_success(&mut ledger.claims);
        Ok(CasWrite::Written)
    }
}

/// Result of a conditional `booked` write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CasWrite {
    Written,
    /// Row version moved; read again
    Stale,
    /// Precondition failed; nothing was written
    Refused,
}

#[async_trait]
impl<C: Clock> SlotStore for LedgerStore<C> {
    async fn list_upcoming_slots(
        &self,
        today: DateKey,
        horizon_days: u32,
    ) -> Result<SlotMap, StoreError> {
        let end = today.add_days(horizon_days);
        let ledger = self.lock();
        if ledger.sheet.rows.is_empty() {
            return Err(StoreError::Uninitialized);
        }
        Ok(ledger
            .sheet
            .rows
            .range(today..=end)
            .map(|(date, row)| (*date, row.to_slot()))
            .collect())
    }

    async fn claim_seat(&self, date: DateKey, time: TimeOfDay) -> Result<ClaimResult, StoreError> {
        let token = ClaimToken {
            id: self.claim_ids.next(),
            date,
            time,
            issued_at: self.clock.utc_now(),
        };
        with_optimistic_retry(self.cas_attempts, |_| {
            let token = token.clone();
            async move {
                let row = self
                    .read_row(date)
                    .await
                    .ok_or(StoreError::SlotNotFound { date, time })?;
                let idx = row
                    .position(time)
                    .ok_or(StoreError::SlotNotFound { date, time })?;
                let current = row.booked.get(idx).copied().unwrap_or(0);
                if current >= row.max_capacity {
                    return Ok(CasOutcome::Done(ClaimResult::Full));
                }

                let mut booked = row.booked.clone();
                booked.resize(row.times.len(), 0);
                booked[idx] = current + 1;
                // Other writers may land between the read and the write
                tokio::task::yield_now().await;

                let granted = token.clone();
                let write = self.compare_and_set(
                    date,
                    row.version,
                    booked,
                    |_| true,
                    move |claims| {
                        claims.insert(granted.id.clone(), granted);
                    },
                )?;
                match write {
                    CasWrite::Written => Ok(CasOutcome::Done(ClaimResult::Granted(token))),
                    CasWrite::Stale | CasWrite::Refused => Ok(CasOutcome::Contended),
                }
            }
        })
        .await
    }

    async fn record_booking(
        &self,
        token: &ClaimToken,
        booking: Booking,
    ) -> Result<Booking, StoreError> {
        if booking.date != token.date || booking.time != token.time {
            return Err(StoreError::ClaimMismatch(token.id.clone()));
        }
        let mut ledger = self.lock();
        if ledger.sheet.index.contains_key(&booking.id) {
            return Err(StoreError::DuplicateBooking(booking.id.clone()));
        }
        if !ledger.claims.contains_key(&token.id) {
            return Err(StoreError::ClaimNotHeld(token.id.clone()));
        }
        ledger.commit(LedgerOp::AppendBookingRow(BookingRow::from(&booking)))?;
        ledger.claims.remove(&token.id);
        Ok(booking)
    }

    async fn release_seat(&self, token: &ClaimToken) -> Result<bool, StoreError> {
        if !self.lock().claims.contains_key(&token.id) {
            return Ok(false);
        }
        with_optimistic_retry(self.cas_attempts, |_| async move {
            let Some(row) = self.read_row(token.date).await else {
                return Ok(CasOutcome::Done(false));
            };
            let Some(idx) = row.position(token.time) else {
                return Ok(CasOutcome::Done(false));
            };
            let mut booked = row.booked.clone();
            if let Some(n) = booked.get_mut(idx) {
                *n = n.saturating_sub(1);
            }

            // Recorded or expired since the read: the counter is not ours
            let write = self.compare_and_set(
                token.date,
                row.version,
                booked,
                |claims| claims.contains_key(&token.id),
                |claims| {
                    claims.remove(&token.id);
                },
            )?;
            match write {
                CasWrite::Written => Ok(CasOutcome::Done(true)),
                CasWrite::Refused => Ok(CasOutcome::Done(false)),
                CasWrite::Stale => Ok(CasOutcome::Contended),
            }
        })
        .await
    }

    async fn seed_slots(&self, slots: SlotMap) -> Result<usize, StoreError> {
        let mut ledger = self.lock();
        let mut inserted = 0;
        for (date, slot) in &slots {
            if !ledger.sheet.rows.contains_key(date) {
                ledger.commit(LedgerOp::AppendSlotRow(SlotRow::from_slot(slot)))?;
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn reconcile(&self) -> Result<ReconcileReport, StoreError> {
        let mut ledger = self.lock();

        let mut actual: HashMap<(DateKey, TimeOfDay), u32> = HashMap::new();
        for row in &ledger.sheet.bookings {
            if row.status.counts_against_capacity() {
                *actual.entry((row.date_key, row.time)).or_insert(0) += 1;
            }
        }
        for claim in ledger.claims.values() {
            *actual.entry((claim.date, claim.time)).or_insert(0) += 1;
        }

        let mut report = ReconcileReport {
            slots_checked: ledger.sheet.rows.len(),
            corrections: Vec::new(),
        };
        let mut rewrites = Vec::new();
        for (date, row) in &ledger.sheet.rows {
            let expected: Vec<u32> = row
                .times
                .iter()
                .map(|time| actual.get(&(*date, *time)).copied().unwrap_or(0))
                .collect();
            if expected == row.booked {
                continue;
            }
            for (i, time) in row.times.iter().enumerate() {
                let before = row.booked.get(i).copied().unwrap_or(0);
                let after = expected[i];
                if before != after {
                    report.corrections.push(Correction {
                        date: *date,
                        time: *time,
                        before,
                        after,
                    });
                }
            }
            rewrites.push((*date, expected));
        }
        for (date, booked) in rewrites {
            ledger.write_booked(date, booked)?;
        }
        Ok(report)
    }

    async fn expire_claims(&self, cutoff: DateTime<Utc>) -> Result<Vec<ClaimToken>, StoreError> {
        let mut ledger = self.lock();
        let mut stale: Vec<ClaimToken> = ledger
            .claims
            .values()
            .filter(|t| t.issued_at < cutoff)
            .cloned()
            .collect();
        stale.sort_by(|a, b| a.issued_at.cmp(&b.issued_at));

        for token in &stale {
            let Some(row) = ledger.sheet.rows.get(&token.date).cloned() else {
                ledger.claims.remove(&token.id);
                continue;
            };
            let mut booked = row.booked.clone();
            if let Some(n) = row.position(token.time).and_then(|i| booked.get_mut(i)) {
                *n = n.saturating_sub(1);
            }
            ledger.write_booked(token.date, booked)?;
            ledger.claims.remove(&token.id);
        }
        Ok(stale)
    }

    async fn find_booking(&self, id: &BookingId) -> Result<Option<Booking>, StoreError> {
        let ledger = self.lock();
        Ok(ledger
            .sheet
            .index
            .get(id)
            .and_then(|&i| ledger.sheet.bookings.get(i))
            .map(BookingRow::to_booking))
    }
}

/// `Vec<TimeOfDay>` as a comma-separated cell
mod csv_times {
    use kiln_core::TimeOfDay;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(times: &[TimeOfDay], s: S) -> Result<S::Ok, S::Error> {
        let cell: Vec<String> = times.iter().map(ToString::to_string).collect();
        s.serialize_str(&cell.join(","))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<TimeOfDay>, D::Error> {
        let cell = String::deserialize(d)?;
        cell.split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.parse().map_err(serde::de::Error::custom))
            .collect()
    }
}

/// `Vec<u32>` as a comma-separated cell
mod csv_counts {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(counts: &[u32], s: S) -> Result<S::Ok, S::Error> {
        let cell: Vec<String> = counts.iter().map(ToString::to_string).collect();
        s.serialize_str(&cell.join(","))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u32>, D::Error> {
        let cell = String::deserialize(d)?;
        cell.split(',')
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim().parse().map_err(serde::de::Error::custom))
            .collect()
    }
}

#[cfg(test)]
#[path = "ledger_tests.rs"]
mod tests;
