// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transactional document store
//!
//! Three collections (`slots`, `bookings`, `activity`) plus outstanding
//! claims. Every mutation runs as a transaction: the closure works on a
//! staged copy, and the copy is persisted and swapped in only if the whole
//! closure succeeds. Recording a booking creates the booking document,
//! moves the seat from held to booked and appends the audit entry in one
//! commit.

use crate::error::StoreError;
use crate::store::{
    ActivityEntry, ActivityKind, ClaimResult, ClaimToken, Correction, ReconcileReport, SlotStore,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kiln_core::{
    Booking, BookingId, ClassKind, Clock, DateKey, IdGen, Slot, SlotMap, TimeOfDay, UuidIdGen,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// A `slots` collection document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotDoc {
    pub times: Vec<TimeOfDay>,
    pub max_capacity: u32,
    pub class_kind: ClassKind,
    /// Recorded bookings per time
    pub current_bookings: BTreeMap<TimeOfDay, u32>,
    /// Seats held by claims not yet recorded
    #[serde(default)]
    pub held: BTreeMap<TimeOfDay, u32>,
}

impl SlotDoc {
    fn from_slot(slot: &Slot) -> Self {
        Self {
            times: slot.times().collect(),
            max_capacity: slot.max_capacity,
            class_kind: slot.class_kind,
            current_bookings: slot.seats.clone(),
            held: BTreeMap::new(),
        }
    }

    fn occupied(&self, time: TimeOfDay) -> u32 {
        self.current_bookings.get(&time).copied().unwrap_or(0)
            + self.held.get(&time).copied().unwrap_or(0)
    }

    fn to_slot(&self, date: DateKey) -> Slot {
        let mut slot = Slot::new(date, self.class_kind, self.max_capacity, self.times.clone());
        for (time, seats) in slot.seats.iter_mut() {
            *seats = self.occupied(*time);
        }
        slot
    }
}

fn bump(counts: &mut BTreeMap<TimeOfDay, u32>, time: TimeOfDay) {
    *counts.entry(time).or_insert(0) += 1;
}

fn drop_one(counts: &mut BTreeMap<TimeOfDay, u32>, time: TimeOfDay) {
    if let Some(n) = counts.get_mut(&time) {
        *n = n.saturating_sub(1);
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Collections {
    slots: BTreeMap<DateKey, SlotDoc>,
    bookings: BTreeMap<BookingId, Booking>,
    activity: Vec<ActivityEntry>,
    claims: BTreeMap<String, ClaimToken>,
}

impl Collections {
    fn release(&mut self, token: &ClaimToken) -> bool {
        if self.claims.remove(&token.id).is_none() {
            return false;
        }
        if let Some(doc) = self.slots.get_mut(&token.date) {
            drop_one(&mut doc.held, token.time);
        }
        true
    }
}

/// Document store backed by an atomically replaced JSON snapshot
#[derive(Clone)]
pub struct DocumentStore<C: Clock> {
    collections: Arc<Mutex<Collections>>,
    snapshot: Option<PathBuf>,
    clock: C,
    claim_ids: UuidIdGen,
}

impl<C: Clock> DocumentStore<C> {
    /// A store that lives only in memory
    pub fn in_memory(clock: C) -> Self {
        Self {
            collections: Arc::new(Mutex::new(Collections::default())),
            snapshot: None,
            clock,
            claim_ids: UuidIdGen,
        }
    }

    /// Open or create a store persisted at `path`
    pub fn open(path: &Path, clock: C) -> Result<Self, StoreError> {
        let collections = match fs::read_to_string(path) {
            Ok(json) => serde_json::from_str(&json)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Collections::default(),
            Err(e) => return Err(e.into()),
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self {
            collections: Arc::new(Mutex::new(collections)),
            snapshot: Some(path.to_path_buf()),
            clock,
            claim_ids: UuidIdGen,
        })
    }

    /// Audit entries, oldest first
    pub fn activity(&self) -> Vec<ActivityEntry> {
        self.read(|c| c.activity.clone())
    }

    fn read<T>(&self, f: impl FnOnce(&Collections) -> T) -> T {
        let guard = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        f(&guard)
    }

    /// Run `f` against a staged copy and commit it only on success
    fn transaction<T>(
        &self,
        f: impl FnOnce(&mut Collections) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        let mut staged = guard.clone();
        let value = f(&mut staged)?;
        if let Some(path) = &self.snapshot {
            write_snapshot(path, &staged)?;
        }
        *guard = staged;
        Ok(value)
    }
}

fn write_snapshot(path: &Path, collections: &Collections) -> Result<(), StoreError> {
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_vec(collections)?;
    let mut file = fs::File::create(&tmp)?;
    file.write_all(&json)?;
    file.sync_all()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[async_trait]
impl<C: Clock> SlotStore for DocumentStore<C> {
    async fn list_upcoming_slots(
        &self,
        today: DateKey,
        horizon_days: u32,
    ) -> Result<SlotMap, StoreError> {
        let end = today.add_days(horizon_days);
        self.read(|c| {
            if c.slots.is_empty() {
                return Err(StoreError::Uninitialized);
            }
            Ok(c.slots
                .range(today..=end)
                .map(|(date, doc)| (*date, doc.to_slot(*date)))
                .collect())
        })
    }

    async fn claim_seat(&self, date: DateKey, time: TimeOfDay) -> Result<ClaimResult, StoreError> {
        let issued_at = self.clock.utc_now();
        let id = self.claim_ids.next();
        self.transaction(|c| {
            let doc = c
                .slots
                .get_mut(&date)
                .filter(|doc| doc.times.contains(&time))
                .ok_or(StoreError::SlotNotFound { date, time })?;
            if doc.occupied(time) >= doc.max_capacity {
                return Ok(ClaimResult::Full);
            }
            bump(&mut doc.held, time);
            let token = ClaimToken {
                id,
                date,
                time,
                issued_at,
            };
            c.claims.insert(token.id.clone(), token.clone());
            Ok(ClaimResult::Granted(token))
        })
    }

    async fn record_booking(
        &self,
        token: &ClaimToken,
        booking: Booking,
    ) -> Result<Booking, StoreError> {
        if booking.date != token.date || booking.time != token.time {
            return Err(StoreError::ClaimMismatch(token.id.clone()));
        }
        let at = self.clock.utc_now();
        self.transaction(|c| {
            if c.bookings.contains_key(&booking.id) {
                return Err(StoreError::DuplicateBooking(booking.id.clone()));
            }
            if c.claims.remove(&token.id).is_none() {
                return Err(StoreError::ClaimNotHeld(token.id.clone()));
            }
            let doc = c
                .slots
                .get_mut(&token.date)
                .ok_or(StoreError::SlotNotFound {
                    date: token.date,
                    time: token.time,
                })?;
            drop_one(&mut doc.held, token.time);
            bump(&mut doc.current_bookings, token.time);
            c.activity
                .push(ActivityEntry::new(ActivityKind::BookingCreated, at).booking(&booking));
            c.bookings.insert(booking.id.clone(), booking.clone());
            Ok(booking)
        })
    }

    async fn release_seat(&self, token: &ClaimToken) -> Result<bool, StoreError> {
        let at = self.clock.utc_now();
        self.transaction(|c| {
            let released = c.release(token);
            if released {
                c.activity.push(
                    ActivityEntry::new(ActivityKind::ClaimReleased, at)
                        .detail(format!("{} {}", token.date, token.time)),
                );
            }
            Ok(released)
        })
    }

    async fn seed_slots(&self, slots: SlotMap) -> Result<usize, StoreError> {
        let at = self.clock.utc_now();
        self.transaction(|c| {
            let mut inserted = 0;
            for (date, slot) in &slots {
                if !c.slots.contains_key(date) {
                    c.slots.insert(*date, SlotDoc::from_slot(slot));
                    inserted += 1;
                }
            }
            if inserted > 0 {
                c.activity.push(
                    ActivityEntry::new(ActivityKind::SlotsSeeded, at)
                        .detail(format!("{inserted} slots")),
                );
            }
            Ok(inserted)
        })
    }

    async fn reconcile(&self) -> Result<ReconcileReport, StoreError> {
        let at = self.clock.utc_now();
        self.transaction(|c| {
            let mut recorded: BTreeMap<(DateKey, TimeOfDay), u32> = BTreeMap::new();
            for booking in c.bookings.values() {
                if booking.status.counts_against_capacity() {
                    *recorded.entry((booking.date, booking.time)).or_insert(0) += 1;
                }
            }
            let mut held: BTreeMap<(DateKey, TimeOfDay), u32> = BTreeMap::new();
            for claim in c.claims.values() {
                *held.entry((claim.date, claim.time)).or_insert(0) += 1;
            }

            let mut report = ReconcileReport {
                slots_checked: c.slots.len(),
                corrections: Vec::new(),
            };
            for (date, doc) in c.slots.iter_mut() {
                for time in doc.times.clone() {
                    let before = doc.occupied(time);
                    let booked = recorded.get(&(*date, time)).copied().unwrap_or(0);
                    let holding = held.get(&(*date, time)).copied().unwrap_or(0);
                    doc.current_bookings.insert(time, booked);
                    doc.held.insert(time, holding);
                    let after = booked + holding;
                    if before != after {
                        report.corrections.push(Correction {
                            date: *date,
                            time,
                            before,
                            after,
                        });
                    }
                }
            }
            if !report.is_clean() {
                c.activity.push(
                    ActivityEntry::new(ActivityKind::Reconciled, at)
                        .detail(format!("{} corrections", report.corrections.len())),
                );
            }
            Ok(report)
        })
    }

    async fn expire_claims(&self, cutoff: DateTime<Utc>) -> Result<Vec<ClaimToken>, StoreError> {
        let at = self.clock.utc_now();
        self.transaction(|c| {
            let stale: Vec<ClaimToken> = c
                .claims
                .values()
                .filter(|t| t.issued_at < cutoff)
                .cloned()
                .collect();
            for token in &stale {
                c.release(token);
            }
            if !stale.is_empty() {
                c.activity.push(
                    ActivityEntry::new(ActivityKind::ClaimsExpired, at)
                        .detail(format!("{} claims", stale.len())),
                );
            }
            Ok(stale)
        })
    }

    async fn find_booking(&self, id: &BookingId) -> Result<Option<Booking>, StoreError> {
        Ok(self.read(|c| c.bookings.get(id).cloned()))
    }
}

#[cfg(test)]
#[path = "document_tests.rs"]
mod tests;
