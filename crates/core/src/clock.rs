// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for testable time handling
//!
//! Reservation code needs two notions of time: a monotonic [`Instant`] for
//! timeouts and elapsed measurements, and a wall-clock timestamp for
//! booking records, claim expiry and "today" in the studio calendar.

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// A clock that provides the current time
pub trait Clock: Clone + Send + Sync + 'static {
    fn now(&self) -> Instant;

    /// Wall-clock time in UTC
    fn utc_now(&self) -> DateTime<Utc>;

    /// The studio's current calendar date
    fn today(&self) -> NaiveDate;
}

/// Real system clock, using the host's local timezone for `today`
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

#[derive(Debug)]
struct FakeTime {
    instant: Instant,
    wall: DateTime<Utc>,
}

/// Fake clock for testing with controllable time
///
/// Advancing the clock moves the monotonic and wall-clock readings
/// together. `today` is the UTC date of the wall-clock reading.
#[derive(Clone)]
pub struct FakeClock {
    current: Arc<Mutex<FakeTime>>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self::at_wall(Utc::now())
    }

    /// A clock whose wall time is noon UTC on `date`
    pub fn at(date: NaiveDate) -> Self {
        let noon = date
            .and_hms_opt(12, 0, 0)
            .map(|dt| Utc.from_utc_datetime(&dt))
            .unwrap_or_else(Utc::now);
        Self::at_wall(noon)
    }

    pub fn at_wall(wall: DateTime<Utc>) -> Self {
        Self {
            current: Arc::new(Mutex::new(FakeTime {
                instant: Instant::now(),
                wall,
            })),
        }
    }

    /// Advance the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        current.instant += duration;
        current.wall += chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::zero());
    }

    /// Jump the wall clock to noon on a specific date
    pub fn set_date(&self, date: NaiveDate) {
        if let Some(noon) = date.and_hms_opt(12, 0, 0) {
            let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
            current.wall = Utc.from_utc_datetime(&noon);
        }
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.current.lock().unwrap_or_else(|e| e.into_inner()).instant
    }

    fn utc_now(&self) -> DateTime<Utc> {
        self.current.lock().unwrap_or_else(|e| e.into_inner()).wall
    }

    fn today(&self) -> NaiveDate {
        self.utc_now().date_naive()
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
