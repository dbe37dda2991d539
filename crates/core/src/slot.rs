// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bookable slots
//!
//! A [`Slot`] is one calendar date offering one or more start times. Each
//! (date, time) pair is its own capacity pool of `max_capacity` seats.

use crate::date::{DateKey, TimeOfDay};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Slots keyed and ordered by date
pub type SlotMap = BTreeMap<DateKey, Slot>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassKind {
    Regular,
    Workshop,
}

impl fmt::Display for ClassKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassKind::Regular => write!(f, "regular"),
            ClassKind::Workshop => write!(f, "workshop"),
        }
    }
}

impl FromStr for ClassKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "regular" => Ok(ClassKind::Regular),
            "workshop" => Ok(ClassKind::Workshop),
            other => Err(format!("unknown class kind '{other}'")),
        }
    }
}

/// Where a slot's numbers came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotOrigin {
    /// Read from the store; claims against it are real
    #[default]
    Store,
    /// Generated locally while the store was unreachable; never claimable
    Offline,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Slot {
    pub date: DateKey,
    pub class_kind: ClassKind,
    pub max_capacity: u32,
    /// Booked seats per offered time
    pub seats: BTreeMap<TimeOfDay, u32>,
    #[serde(default)]
    pub origin: SlotOrigin,
}

impl Slot {
    /// An empty slot offering `times`, each with `max_capacity` seats
    pub fn new(
        date: DateKey,
        class_kind: ClassKind,
        max_capacity: u32,
        times: impl IntoIterator<Item = TimeOfDay>,
    ) -> Self {
        Self {
            date,
            class_kind,
            max_capacity,
            seats: times.into_iter().map(|t| (t, 0)).collect(),
            origin: SlotOrigin::Store,
        }
    }

    pub fn with_booked(mut self, time: TimeOfDay, booked: u32) -> Self {
        if let Some(seats) = self.seats.get_mut(&time) {
            *seats = booked.min(self.max_capacity);
        }
        self
    }

    pub fn offline(mut self) -> Self {
        self.origin = SlotOrigin::Offline;
        self
    }

    pub fn times(&self) -> impl Iterator<Item = TimeOfDay> + '_ {
        self.seats.keys().copied()
    }

    pub fn offers(&self, time: TimeOfDay) -> bool {
        self.seats.contains_key(&time)
    }

    pub fn booked_at(&self, time: TimeOfDay) -> Option<u32> {
        self.seats.get(&time).copied()
    }

    pub fn remaining_at(&self, time: TimeOfDay) -> Option<u32> {
        self.booked_at(time)
            .map(|booked| self.max_capacity.saturating_sub(booked))
    }

    /// Total booked seats across all times
    pub fn booked(&self) -> u32 {
        self.seats.values().sum()
    }

    /// Total seats across all times
    pub fn capacity(&self) -> u32 {
        self.max_capacity
            .saturating_mul(u32::try_from(self.seats.len()).unwrap_or(u32::MAX))
    }

    pub fn remaining(&self) -> u32 {
        self.capacity().saturating_sub(self.booked())
    }

    /// At least one offered time still has a free seat
    pub fn has_open_seat(&self) -> bool {
        self.seats.values().any(|&b| b < self.max_capacity)
    }

    pub fn is_offline(&self) -> bool {
        self.origin == SlotOrigin::Offline
    }

    /// `booked <= max_capacity` for every offered time
    pub fn within_capacity(&self) -> bool {
        self.seats.values().all(|&b| b <= self.max_capacity)
    }
}

#[cfg(test)]
#[path = "slot_tests.rs"]
mod tests;
