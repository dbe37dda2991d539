// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Default slot calendar from declarative recurrence rules
//!
//! Generation is pure: the same start date, horizon and rules always give
//! the same [`SlotMap`]. Randomized demo occupancy is a separate entry
//! point that takes an explicit RNG and marks its slots offline, so it can
//! never be confused with a real seed (which always starts at zero).

use crate::date::{DateKey, TimeOfDay};
use crate::slot::{ClassKind, Slot, SlotMap};
use chrono::{Datelike, Weekday};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    #[default]
    Weekly,
    /// First, third and fifth occurrence of the weekday in each month
    Alternate,
}

impl Cadence {
    fn includes(&self, date: DateKey) -> bool {
        match self {
            Cadence::Weekly => true,
            Cadence::Alternate => ((date.date().day() - 1) / 7) % 2 == 0,
        }
    }
}

/// One weekday's offering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub weekday: Weekday,
    pub times: Vec<TimeOfDay>,
    pub max_capacity: u32,
    pub class_kind: ClassKind,
    pub cadence: Cadence,
}

impl RecurrenceRule {
    pub fn weekly(weekday: Weekday, times: Vec<TimeOfDay>, max_capacity: u32) -> Self {
        Self {
            weekday,
            times,
            max_capacity,
            class_kind: ClassKind::Regular,
            cadence: Cadence::Weekly,
        }
    }

    pub fn class_kind(mut self, class_kind: ClassKind) -> Self {
        self.class_kind = class_kind;
        self
    }

    pub fn cadence(mut self, cadence: Cadence) -> Self {
        self.cadence = cadence;
        self
    }

    pub fn applies_to(&self, date: DateKey) -> bool {
        date.weekday() == self.weekday && self.cadence.includes(date)
    }
}

/// Ordered rule set; the first rule matching a date wins
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScheduleRules {
    pub rules: Vec<RecurrenceRule>,
}

impl ScheduleRules {
    pub fn new(rules: Vec<RecurrenceRule>) -> Self {
        Self { rules }
    }

    /// Monday evening wheel class and alternate-Saturday workshops
    pub fn studio_default() -> Self {
        let t = |h| TimeOfDay::new(h, 0).into_iter().collect::<Vec<_>>();
        let mut saturday = t(10);
        saturday.extend(t(14));
        Self::new(vec![
            RecurrenceRule::weekly(Weekday::Mon, t(18), 6),
            RecurrenceRule::weekly(Weekday::Sat, saturday, 8)
                .class_kind(ClassKind::Workshop)
                .cadence(Cadence::Alternate),
        ])
    }

    pub fn rule_for(&self, date: DateKey) -> Option<&RecurrenceRule> {
        self.rules.iter().find(|r| r.applies_to(date))
    }
}

#[derive(Debug, Clone)]
pub struct ScheduleGenerator {
    rules: ScheduleRules,
}

impl ScheduleGenerator {
    pub fn new(rules: ScheduleRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ScheduleRules {
        &self.rules
    }

    /// Empty slots for `start ..= start + horizon_days`, ready to seed a store
    pub fn generate(&self, start: DateKey, horizon_days: u32) -> SlotMap {
        let mut slots = SlotMap::new();
        let mut date = start;
        let end = start.add_days(horizon_days);
        while date <= end {
            if let Some(rule) = self.rules.rule_for(date) {
                slots.insert(
                    date,
                    Slot::new(date, rule.class_kind, rule.max_capacity, rule.times.clone()),
                );
            }
            if date == end {
                break;
            }
            date = date.succ();
        }
        tracing::debug!(%start, horizon_days, slots = slots.len(), "schedule generated");
        slots
    }

    /// Empty slots marked offline, for display while the store is unreachable
    pub fn generate_offline(&self, start: DateKey, horizon_days: u32) -> SlotMap {
        self.generate(start, horizon_days)
            .into_iter()
            .map(|(date, slot)| (date, slot.offline()))
            .collect()
    }

    /// Offline slots with random occupancy, for demonstrations
    ///
    /// Dates may be dropped at random, and each time gets between zero and
    /// half its capacity booked.
    pub fn generate_demo<R: Rng + ?Sized>(
        &self,
        start: DateKey,
        horizon_days: u32,
        rng: &mut R,
    ) -> SlotMap {
        let mut slots = SlotMap::new();
        for (date, mut slot) in self.generate_offline(start, horizon_days) {
            if !rng.gen_bool(0.8) {
                continue;
            }
            let max_demo = slot.max_capacity / 2;
            for booked in slot.seats.values_mut() {
                *booked = rng.gen_range(0..=max_demo);
            }
            slots.insert(date, slot);
        }
        slots
    }
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
