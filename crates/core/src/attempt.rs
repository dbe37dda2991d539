// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Booking attempt state machine
//!
//! ```text
//! Idle -> DateSelected -> TimeSelected -> Validating -> Claiming -> Recording -> Confirmed
//!                                            |             |            |
//!                                         Rejected     SlotFull    PersistenceFailed
//!                                                   StoreUnavailable
//! ```
//!
//! Events that do not apply to the current state leave it unchanged.

use crate::booking::BookingId;
use crate::date::{DateKey, TimeOfDay};
use crate::validate::FieldError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptState {
    Idle,
    DateSelected {
        date: DateKey,
    },
    TimeSelected {
        date: DateKey,
        time: TimeOfDay,
    },
    Validating {
        date: DateKey,
        time: TimeOfDay,
    },
    Claiming {
        date: DateKey,
        time: TimeOfDay,
    },
    /// A seat is held; the attempt must end in a record or a release
    Recording {
        date: DateKey,
        time: TimeOfDay,
    },
    Confirmed {
        booking_id: BookingId,
    },
    Rejected {
        errors: Vec<FieldError>,
    },
    SlotFull,
    StoreUnavailable {
        reason: String,
    },
    /// `compensated` is false when the held seat could not be released
    PersistenceFailed {
        compensated: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptEvent {
    SelectDate(DateKey),
    SelectTime(TimeOfDay),
    Submit,
    Validated,
    Invalid(Vec<FieldError>),
    Granted,
    Full,
    Unavailable(String),
    Recorded(BookingId),
    RecordFailed { compensated: bool },
}

impl AttemptState {
    /// Pure transition function
    pub fn transition(&self, event: AttemptEvent) -> AttemptState {
        use AttemptEvent as E;
        use AttemptState as S;

        match (self, event) {
            // Re-selection is allowed until submit, and after any terminal state
            (s, E::SelectDate(date)) if s.accepts_selection() => S::DateSelected { date },

            (S::DateSelected { date } | S::TimeSelected { date, .. }, E::SelectTime(time)) => {
                S::TimeSelected { date: *date, time }
            }

            (S::TimeSelected { date, time }, E::Submit) => S::Validating {
                date: *date,
                time: *time,
            },

            (S::Validating { date, time }, E::Validated) => S::Claiming {
                date: *date,
                time: *time,
            },
            (S::Validating { .. }, E::Invalid(errors)) => S::Rejected { errors },

            (S::Claiming { date, time }, E::Granted) => S::Recording {
                date: *date,
                time: *time,
            },
            (S::Claiming { .. }, E::Full) => S::SlotFull,
            (S::Claiming { .. }, E::Unavailable(reason)) => S::StoreUnavailable { reason },

            (S::Recording { .. }, E::Recorded(booking_id)) => S::Confirmed { booking_id },
            (S::Recording { .. }, E::RecordFailed { compensated }) => {
                S::PersistenceFailed { compensated }
            }

            (s, _) => s.clone(),
        }
    }

    fn accepts_selection(&self) -> bool {
        matches!(
            self,
            AttemptState::Idle
                | AttemptState::DateSelected { .. }
                | AttemptState::TimeSelected { .. }
        ) || self.is_terminal()
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AttemptState::Confirmed { .. }
                | AttemptState::Rejected { .. }
                | AttemptState::SlotFull
                | AttemptState::StoreUnavailable { .. }
                | AttemptState::PersistenceFailed { .. }
        )
    }

    /// A seat is claimed but not yet recorded or released
    pub fn holds_seat(&self) -> bool {
        matches!(self, AttemptState::Recording { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            AttemptState::Idle => "idle",
            AttemptState::DateSelected { .. } => "date_selected",
            AttemptState::TimeSelected { .. } => "time_selected",
            AttemptState::Validating { .. } => "validating",
            AttemptState::Claiming { .. } => "claiming",
            AttemptState::Recording { .. } => "recording",
            AttemptState::Confirmed { .. } => "confirmed",
            AttemptState::Rejected { .. } => "rejected",
            AttemptState::SlotFull => "slot_full",
            AttemptState::StoreUnavailable { .. } => "store_unavailable",
            AttemptState::PersistenceFailed { .. } => "persistence_failed",
        }
    }
}

#[cfg(test)]
#[path = "attempt_tests.rs"]
mod tests;
