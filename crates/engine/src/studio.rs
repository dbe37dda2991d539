// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Studio assembly
//!
//! Wires a store, a notifier and a [`StudioConfig`] into the services a
//! front end talks to.

use crate::availability::{AvailabilityService, AvailabilitySnapshot, FetchMode};
use crate::coordinator::{Outcome, ReservationCoordinator};
use crate::error::{AvailabilityError, EngineError};
use crate::maintenance::{MaintenanceReport, MaintenanceTask, ReconcileFlag};
use crate::outbox::{Outbox, OutboxStats};
use crate::retry::{call_store, RetryPolicy};
use kiln_adapters::{NotifyAdapter, StudioContact};
use kiln_config::{StoreBackend, StudioConfig};
use kiln_core::{
    Booking, BookingId, Clock, IdGen, RawBookingForm, ScheduleGenerator, Selection,
};
use kiln_storage::{AnyStore, ReconcileReport, SlotStore, StoreError, TracedStore};
use std::path::Path;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Store type used by the daemon and CLI
pub type StudioStore<C> = TracedStore<AnyStore<C>>;

/// Open the configured backend under `data_dir`
pub fn open_store<C: Clock>(
    config: &StudioConfig,
    data_dir: &Path,
    clock: C,
) -> Result<StudioStore<C>, StoreError> {
    let store = match config.store.backend {
        StoreBackend::Ledger => AnyStore::open_ledger(data_dir, clock, config.store.cas_attempts)?,
        StoreBackend::Document => AnyStore::open_document(data_dir, clock)?,
    };
    tracing::info!(backend = store.backend_name(), path = %data_dir.display(), "store opened");
    Ok(TracedStore::new(store))
}

pub fn studio_contact(config: &StudioConfig) -> StudioContact {
    StudioContact {
        name: config.studio.name.clone(),
        address: config.studio.address.clone(),
        inbox: config.studio.notification_email.clone(),
    }
}

/// Adapter dependencies
pub struct StudioDeps<S, N, I> {
    pub store: S,
    pub notify: N,
    pub ids: I,
}

pub struct Studio<S, I, C> {
    name: String,
    store: S,
    policy: RetryPolicy,
    call_timeout: Duration,
    availability: AvailabilityService<S, C>,
    coordinator: ReservationCoordinator<S, I, C>,
    maintenance: MaintenanceTask<S, C>,
    outbox: Outbox,
    worker: JoinHandle<OutboxStats>,
}

impl<S, I, C> Studio<S, I, C>
where
    S: SlotStore,
    I: IdGen,
    C: Clock,
{
    /// Build every service for `config`; must be called inside a runtime
    pub fn new<N: NotifyAdapter>(
        config: &StudioConfig,
        deps: StudioDeps<S, N, I>,
        clock: C,
    ) -> Result<Self, EngineError> {
        let validator = config
            .validator()
            .map_err(|e| EngineError::InvalidConfig(format!("booking.phone_pattern: {e}")))?;
        let settings = &config.store;
        let policy = RetryPolicy::new(settings.retry_attempts, settings.retry_backoff);
        let call_timeout = settings.call_timeout;

        let availability = AvailabilityService::new(
            deps.store.clone(),
            clock.clone(),
            ScheduleGenerator::new(config.schedule.clone()),
            config.studio.horizon_days,
        )
        .with_retry(policy.clone(), call_timeout);

        let (outbox, worker) = Outbox::spawn(deps.notify, policy.clone(), studio_contact(config));
        let flag = ReconcileFlag::new();
        let coordinator =
            ReservationCoordinator::new(deps.store.clone(), validator, deps.ids, clock.clone())
                .with_retry(policy.clone(), call_timeout)
                .with_outbox(outbox.clone())
                .with_reconcile_flag(flag.clone());
        let maintenance = MaintenanceTask::new(
            deps.store.clone(),
            clock,
            settings.claim_ttl,
            flag,
            availability.clone(),
        );

        Ok(Self {
            name: config.studio.name.clone(),
            store: deps.store,
            policy,
            call_timeout,
            availability,
            coordinator,
            maintenance,
            outbox,
            worker,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn reconcile_flag(&self) -> &ReconcileFlag {
        self.coordinator.reconcile_flag()
    }

    pub async fn availability(
        &self,
        mode: FetchMode,
    ) -> Result<AvailabilitySnapshot, AvailabilityError> {
        self.availability.load(mode).await
    }

    pub async fn submit(
        &self,
        selection: Selection,
        form: &RawBookingForm,
        actor: Option<String>,
    ) -> Outcome {
        self.coordinator.submit(selection, form, actor).await
    }

    /// Seed dates missing from the booking horizon
    pub async fn seed(&self) -> Result<usize, StoreError> {
        self.availability.ensure_horizon().await
    }

    /// Recompute seat counters from recorded bookings and held claims
    pub async fn reconcile(&self) -> Result<ReconcileReport, StoreError> {
        let report = call_store(&self.policy, self.call_timeout, || self.store.reconcile()).await?;
        // A requested pass has now happened
        self.reconcile_flag().take();
        Ok(report)
    }

    pub async fn find_booking(&self, id: &BookingId) -> Result<Option<Booking>, StoreError> {
        call_store(&self.policy, self.call_timeout, || self.store.find_booking(id)).await
    }

    /// Repair seat counters, then release stale claims and seed the horizon
    ///
    /// A crash between claiming and recording leaves a counter ahead of its
    /// bookings; reconciling here returns those seats. Failures are logged
    /// and left to the next maintenance pass.
    pub async fn recover(&self) -> MaintenanceReport {
        let reconciled = match self.reconcile().await {
            Ok(report) => {
                for c in &report.corrections {
                    tracing::warn!(
                        date = %c.date,
                        time = %c.time,
                        before = c.before,
                        after = c.after,
                        "seat counter corrected on open"
                    );
                }
                Some(report)
            }
            Err(e) => {
                tracing::warn!(error = %e, "reconcile on open failed, will retry during maintenance");
                self.reconcile_flag().raise();
                None
            }
        };

        let mut report = self.maintain().await;
        report.reconciled = report.reconciled.or(reconciled);
        report
    }

    pub async fn maintain(&self) -> MaintenanceReport {
        self.maintenance.tick().await
    }

    /// Wait for queued notifications to be handled
    pub async fn flush_notifications(&self) {
        self.outbox.flush().await;
    }

    /// Stop accepting work and drain the outbox
    pub async fn shutdown(self) -> OutboxStats {
        let Self {
            coordinator,
            outbox,
            worker,
            ..
        } = self;
        drop(coordinator);
        drop(outbox);
        match worker.await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::warn!(error = %e, "outbox worker ended abnormally");
                OutboxStats::default()
            }
        }
    }
}

#[cfg(test)]
#[path = "studio_tests.rs"]
mod tests;
