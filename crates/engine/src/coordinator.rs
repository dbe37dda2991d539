// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reservation coordinator
//!
//! Drives one booking attempt through validate, claim and record. Once a
//! seat is claimed the remaining steps run on their own task, so a caller
//! that gives up mid-attempt cannot strand the seat: the attempt still
//! ends in a recorded booking or a release.

use crate::maintenance::ReconcileFlag;
use crate::outbox::Outbox;
use crate::retry::{call_store, RetryPolicy};
use crate::DEFAULT_CALL_TIMEOUT;
use kiln_core::{
    AttemptEvent, AttemptState, Booking, BookingInput, BookingValidator, Clock, FieldError, IdGen,
    RawBookingForm, Selection, SlotOrigin,
};
use kiln_storage::{ClaimResult, ClaimToken, SlotStore, StoreError};
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

/// Result of a booking attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Date or time not selected
    Incomplete,
    Rejected(Vec<FieldError>),
    /// The slot cannot take this booking
    Conflict(ConflictReason),
    /// The store could not be reached; nothing was reserved
    Unavailable(String),
    /// The booking could not be written after a seat was claimed
    PersistenceFailed { compensated: bool },
    Confirmed(Booking),
}

/// Why a claim was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictReason {
    /// Every seat was taken since availability was read
    Full,
    /// The schedule has no class at that date and time
    NotOffered,
}

impl Outcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Outcome::Confirmed(_))
    }

    pub fn booking(&self) -> Option<&Booking> {
        match self {
            Outcome::Confirmed(booking) => Some(booking),
            _ => None,
        }
    }

    /// Short machine-readable name
    pub fn kind(&self) -> &'static str {
        match self {
            Outcome::Incomplete => "incomplete",
            Outcome::Rejected(_) => "rejected",
            Outcome::Conflict(_) => "conflict",
            Outcome::Unavailable(_) => "unavailable",
            Outcome::PersistenceFailed { .. } => "persistence_failed",
            Outcome::Confirmed(_) => "confirmed",
        }
    }

    /// Message suitable for showing to the person booking
    pub fn message(&self) -> String {
        match self {
            Outcome::Incomplete => "Please select a date and time".to_string(),
            Outcome::Rejected(errors) => {
                let fields: Vec<String> = errors.iter().map(|e| e.field.to_string()).collect();
                format!("Please correct: {}", fields.join(", "))
            }
            Outcome::Conflict(ConflictReason::Full) => {
                "That class just filled up. Please refresh and choose another time".to_string()
            }
            Outcome::Conflict(ConflictReason::NotOffered) => {
                "No class is offered at that date and time".to_string()
            }
            Outcome::Unavailable(_) => {
                "Booking is temporarily unavailable. Please try again shortly".to_string()
            }
            Outcome::PersistenceFailed { .. } => {
                "We couldn't save your booking. Please try again".to_string()
            }
            Outcome::Confirmed(booking) => format!("Booking confirmed: {}", booking.id),
        }
    }
}

fn step(state: AttemptState, event: AttemptEvent) -> AttemptState {
    let next = state.transition(event);
    tracing::debug!(from = state.name(), to = next.name(), "attempt");
    next
}

#[derive(Clone)]
pub struct ReservationCoordinator<S, I, C> {
    store: S,
    validator: Arc<BookingValidator>,
    ids: I,
    clock: C,
    policy: RetryPolicy,
    call_timeout: Duration,
    outbox: Option<Outbox>,
    reconcile: ReconcileFlag,
}

impl<S, I, C> ReservationCoordinator<S, I, C>
where
    S: SlotStore,
    I: IdGen,
    C: Clock,
{
    pub fn new(store: S, validator: BookingValidator, ids: I, clock: C) -> Self {
        Self {
            store,
            validator: Arc::new(validator),
            ids,
            clock,
            policy: RetryPolicy::default(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
            outbox: None,
            reconcile: ReconcileFlag::new(),
        }
    }

    pub fn with_retry(mut self, policy: RetryPolicy, call_timeout: Duration) -> Self {
        self.policy = policy;
        self.call_timeout = call_timeout;
        self
    }

    pub fn with_outbox(mut self, outbox: Outbox) -> Self {
        self.outbox = Some(outbox);
        self
    }

    /// Flag raised when a held seat could not be released
    pub fn with_reconcile_flag(mut self, flag: ReconcileFlag) -> Self {
        self.reconcile = flag;
        self
    }

    pub fn reconcile_flag(&self) -> &ReconcileFlag {
        &self.reconcile
    }

    /// Attempt one booking
    ///
    /// Each call is independent: resubmitting after `Confirmed` books again.
    pub async fn submit(
        &self,
        selection: Selection,
        form: &RawBookingForm,
        actor: Option<String>,
    ) -> Outcome {
        let span = tracing::info_span!(
            "reservation.submit",
            date = ?selection.date.map(|d| d.to_string()),
            time = ?selection.time.map(|t| t.to_string()),
            actor = actor.as_deref().unwrap_or("-"),
        );
        let outcome = self.attempt(selection, form, actor).instrument(span.clone()).await;
        span.in_scope(|| tracing::info!(outcome = outcome.kind(), "attempt finished"));
        outcome
    }

    async fn attempt(
        &self,
        selection: Selection,
        form: &RawBookingForm,
        actor: Option<String>,
    ) -> Outcome {
        let (Some(date), Some(time)) = (selection.date, selection.time) else {
            return Outcome::Incomplete;
        };
        let mut state = step(AttemptState::Idle, AttemptEvent::SelectDate(date));
        state = step(state, AttemptEvent::SelectTime(time));
        state = step(state, AttemptEvent::Submit);

        let input = match self.validator.validate(form) {
            Ok(input) => input,
            Err(errors) => {
                step(state, AttemptEvent::Invalid(errors.clone()));
                return Outcome::Rejected(errors);
            }
        };
        state = step(state, AttemptEvent::Validated);

        if selection.origin == SlotOrigin::Offline {
            let reason = "slot came from the offline schedule".to_string();
            step(state, AttemptEvent::Unavailable(reason.clone()));
            return Outcome::Unavailable(reason);
        }

        let claimed = call_store(&self.policy, self.call_timeout, || {
            self.store.claim_seat(date, time)
        })
        .await;
        let token = match claimed {
            Ok(ClaimResult::Granted(token)) => token,
            Ok(ClaimResult::Full) => {
                step(state, AttemptEvent::Full);
                return Outcome::Conflict(ConflictReason::Full);
            }
            Err(StoreError::SlotNotFound { .. }) => {
                step(state, AttemptEvent::Full);
                return Outcome::Conflict(ConflictReason::NotOffered);
            }
            Err(e) => {
                step(state, AttemptEvent::Unavailable(e.to_string()));
                return Outcome::Unavailable(e.to_string());
            }
        };
        state = step(state, AttemptEvent::Granted);

        // The seat is held from here on; finish even if our caller goes away
        let this = self.clone();
        let finish = async move { this.finish(state, token, input, actor).await };
        match tokio::spawn(finish.in_current_span()).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "recording task failed, seat state unknown");
                self.reconcile.raise();
                Outcome::PersistenceFailed { compensated: false }
            }
        }
    }

    async fn finish(
        &self,
        state: AttemptState,
        token: ClaimToken,
        input: BookingInput,
        actor: Option<String>,
    ) -> Outcome {
        let booking = Booking::confirmed(
            self.ids.next().into(),
            token.date,
            token.time,
            input,
            self.clock.utc_now(),
        )
        .with_actor(actor);

        let recorded = call_store(&self.policy, self.call_timeout, || {
            self.store.record_booking(&token, booking.clone())
        })
        .await;

        match recorded {
            Ok(saved) => {
                step(state, AttemptEvent::Recorded(saved.id.clone()));
                if let Some(outbox) = &self.outbox {
                    outbox.enqueue(&saved);
                }
                Outcome::Confirmed(saved)
            }
            Err(e) => {
                tracing::error!(error = %e, claim = %token.id, "record failed, releasing seat");
                let compensated = self.compensate(&token).await;
                step(state, AttemptEvent::RecordFailed { compensated });
                Outcome::PersistenceFailed { compensated }
            }
        }
    }

    async fn compensate(&self, token: &ClaimToken) -> bool {
        let released = call_store(&self.policy, self.call_timeout, || {
            self.store.release_seat(token)
        })
        .await;
        match released {
            Ok(true) => true,
            Ok(false) => {
                tracing::warn!(claim = %token.id, "claim already gone before release");
                true
            }
            Err(e) => {
                tracing::error!(
                    claim = %token.id,
                    error = %e,
                    "seat release failed, flagging for reconciliation"
                );
                self.reconcile.raise();
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
