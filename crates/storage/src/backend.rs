// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runtime choice between the two store backends

use crate::document::DocumentStore;
use crate::error::StoreError;
use crate::ledger::LedgerStore;
use crate::store::{ClaimResult, ClaimToken, ReconcileReport, SlotStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kiln_core::{Booking, BookingId, Clock, DateKey, SlotMap, TimeOfDay};
use std::path::Path;

/// File name of the ledger backend's log inside the data directory
pub const LEDGER_FILE: &str = "ledger.jsonl";
/// File name of the document backend's snapshot inside the data directory
pub const DOCUMENT_FILE: &str = "documents.json";
/// Exclusive lock held by whichever process owns the data directory
pub const LOCK_FILE: &str = "kiln.lock";

#[derive(Clone)]
pub enum AnyStore<C: Clock> {
    Ledger(LedgerStore<C>),
    Document(DocumentStore<C>),
}

impl<C: Clock> AnyStore<C> {
    pub fn open_ledger(data_dir: &Path, clock: C, cas_attempts: u32) -> Result<Self, StoreError> {
        let store = LedgerStore::open(&data_dir.join(LEDGER_FILE), clock)?;
        Ok(Self::Ledger(store.with_cas_attempts(cas_attempts)))
    }

    pub fn open_document(data_dir: &Path, clock: C) -> Result<Self, StoreError> {
        Ok(Self::Document(DocumentStore::open(
            &data_dir.join(DOCUMENT_FILE),
            clock,
        )?))
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            AnyStore::Ledger(_) => "ledger",
            AnyStore::Document(_) => "document",
        }
    }
}

#[async_trait]
impl<C: Clock> SlotStore for AnyStore<C> {
    async fn list_upcoming_slots(
        &self,
        today: DateKey,
        horizon_days: u32,
    ) -> Result<SlotMap, StoreError> {
        match self {
            AnyStore::Ledger(s) => s.list_upcoming_slots(today, horizon_days).await,
            AnyStore::Document(s) => s.list_upcoming_slots(today, horizon_days).await,
        }
    }

    async fn claim_seat(&self, date: DateKey, time: TimeOfDay) -> Result<ClaimResult, StoreError> {
        match self {
            AnyStore::Ledger(s) => s.claim_seat(date, time).await,
            AnyStore::Document(s) => s.claim_seat(date, time).await,
        }
    }

    async fn record_booking(
        &self,
        token: &ClaimToken,
        booking: Booking,
    ) -> Result<Booking, StoreError> {
        match self {
            AnyStore::Ledger(s) => s.record_booking(token, booking).await,
            AnyStore::Document(s) => s.record_booking(token, booking).await,
        }
    }

    async fn release_seat(&self, token: &ClaimToken) -> Result<bool, StoreError> {
        match self {
            AnyStore::Ledger(s) => s.release_seat(token).await,
            AnyStore::Document(s) => s.release_seat(token).await,
        }
    }

    async fn seed_slots(&self, slots: SlotMap) -> Result<usize, StoreError> {
        match self {
            AnyStore::Ledger(s) => s.seed_slots(slots).await,
            AnyStore::Document(s) => s.seed_slots(slots).await,
        }
    }

    async fn reconcile(&self) -> Result<ReconcileReport, StoreError> {
        match self {
            AnyStore::Ledger(s) => s.reconcile().await,
            AnyStore::Document(s) => s.reconcile().await,
        }
    }

    async fn expire_claims(&self, cutoff: DateTime<Utc>) -> Result<Vec<ClaimToken>, StoreError> {
        match self {
            AnyStore::Ledger(s) => s.expire_claims(cutoff).await,
            AnyStore::Document(s) => s.expire_claims(cutoff).await,
        }
    }

    async fn find_booking(&self, id: &BookingId) -> Result<Option<Booking>, StoreError> {
        match self {
            AnyStore::Ledger(s) => s.find_booking(id).await,
            AnyStore::Document(s) => s.find_booking(id).await,
        }
    }
}
