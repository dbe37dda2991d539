// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Month grid projection for the booking calendar
//!
//! [`project`] is a pure function of its inputs. The page being viewed and
//! the current selection live in a [`ViewState`] value owned by the caller.

use crate::date::{DateKey, TimeOfDay, YearMonth};
use crate::slot::{Slot, SlotMap};
use chrono::{Datelike, Days};
use serde::{Deserialize, Serialize};

/// Six weeks of seven days
pub const GRID_CELLS: usize = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    None,
    Open,
    Full,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCell {
    pub date: DateKey,
    pub in_current_month: bool,
    pub is_past: bool,
    pub is_today: bool,
    pub is_selected: bool,
    pub availability: Availability,
    /// The slot behind this cell was generated offline and cannot be booked
    pub offline: bool,
}

impl DayCell {
    /// A cell the customer may pick
    pub fn is_bookable(&self) -> bool {
        self.availability == Availability::Open && !self.is_past && !self.offline
    }
}

/// Project `month` onto a Sunday-first 42-cell grid
pub fn project(
    month: YearMonth,
    today: DateKey,
    slots: &SlotMap,
    selected: Option<DateKey>,
) -> Vec<DayCell> {
    let first = month.first_day();
    let lead = u64::from(first.weekday().num_days_from_sunday());
    let grid_start = first.checked_sub_days(Days::new(lead)).unwrap_or(first);

    (0..GRID_CELLS as u64)
        .filter_map(|i| grid_start.checked_add_days(Days::new(i)))
        .map(DateKey::new)
        .map(|date| {
            let slot = slots.get(&date);
            DayCell {
                date,
                in_current_month: date.month() == month,
                is_past: date < today,
                is_today: date == today,
                is_selected: selected == Some(date),
                availability: availability(slot),
                offline: slot.is_some_and(Slot::is_offline),
            }
        })
        .collect()
}

fn availability(slot: Option<&Slot>) -> Availability {
    match slot {
        None => Availability::None,
        Some(s) if s.has_open_seat() => Availability::Open,
        Some(_) => Availability::Full,
    }
}

/// A time button for the selected date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOption {
    pub time: TimeOfDay,
    pub remaining: u32,
}

/// Times offered on `date`, in order, with seats remaining
pub fn time_options(slots: &SlotMap, date: DateKey) -> Vec<TimeOption> {
    slots
        .get(&date)
        .map(|slot| {
            slot.seats
                .iter()
                .map(|(&time, &booked)| TimeOption {
                    time,
                    remaining: slot.max_capacity.saturating_sub(booked),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Displayed month and current selection, passed by value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub month: YearMonth,
    pub selected_date: Option<DateKey>,
    pub selected_time: Option<TimeOfDay>,
}

impl ViewState {
    pub fn new(month: YearMonth) -> Self {
        Self {
            month,
            selected_date: None,
            selected_time: None,
        }
    }

    pub fn next_month(self) -> Self {
        Self {
            month: self.month.next(),
            ..self
        }
    }

    pub fn prev_month(self) -> Self {
        Self {
            month: self.month.prev(),
            ..self
        }
    }

    /// Picking a new date clears any chosen time
    pub fn select_date(self, date: DateKey) -> Self {
        Self {
            selected_date: Some(date),
            selected_time: None,
            ..self
        }
    }

    pub fn select_time(self, time: TimeOfDay) -> Self {
        Self {
            selected_time: self.selected_date.map(|_| time),
            ..self
        }
    }

    pub fn grid(&self, today: DateKey, slots: &SlotMap) -> Vec<DayCell> {
        project(self.month, today, slots, self.selected_date)
    }
}

#[cfg(test)]
#[path = "calendar_tests.rs"]
mod tests;
