// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! kiln-core: domain model for the kiln class-booking engine
//!
//! This crate provides:
//! - Calendar keys, slots and booking records
//! - Booking form validation and sanitizing
//! - Default schedule generation from recurrence rules
//! - Pure calendar projection and the booking attempt state machine
//! - Clock and ID abstractions for deterministic tests

pub mod clock;
pub mod id;

pub mod attempt;
pub mod booking;
pub mod calendar;
pub mod date;
pub mod schedule;
pub mod slot;
pub mod validate;

// Re-exports
pub use attempt::{AttemptEvent, AttemptState};
pub use booking::{
    Attendee, Booking, BookingId, BookingInput, BookingStatus, ExperienceLevel, RawBookingForm,
    Selection,
};
pub use calendar::{project, time_options, Availability, DayCell, TimeOption, ViewState};
pub use chrono::Weekday;
pub use clock::{Clock, FakeClock, SystemClock};
pub use date::{DateKey, DateParseError, TimeOfDay, YearMonth};
pub use id::{BookingIdGen, IdGen, SequentialIdGen, UuidIdGen};
pub use schedule::{Cadence, RecurrenceRule, ScheduleGenerator, ScheduleRules};
pub use slot::{ClassKind, Slot, SlotMap, SlotOrigin};
pub use validate::{sanitize, BookingValidator, Field, FieldError};
