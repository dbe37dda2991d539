// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use yare::parameterized;

fn d(s: &str) -> DateKey {
    s.parse().unwrap()
}

fn t(s: &str) -> TimeOfDay {
    s.parse().unwrap()
}

fn studio() -> ScheduleGenerator {
    ScheduleGenerator::new(ScheduleRules::studio_default())
}

#[test]
fn march_2024_default_schedule() {
    let slots = studio().generate(d("2024-03-01"), 30);
    let dates: Vec<String> = slots.keys().map(|k| k.to_string()).collect();
    assert_eq!(
        dates,
        vec![
            "2024-03-02", // 1st Saturday
            "2024-03-04",
            "2024-03-11",
            "2024-03-16", // 3rd Saturday
            "2024-03-18",
            "2024-03-25",
            "2024-03-30", // 5th Saturday
        ]
    );

    let monday = &slots[&d("2024-03-04")];
    assert_eq!(monday.max_capacity, 6);
    assert_eq!(monday.class_kind, ClassKind::Regular);
    assert_eq!(monday.times().collect::<Vec<_>>(), vec![t("18:00")]);

    let workshop = &slots[&d("2024-03-16")];
    assert_eq!(workshop.max_capacity, 8);
    assert_eq!(workshop.class_kind, ClassKind::Workshop);
    assert_eq!(
        workshop.times().collect::<Vec<_>>(),
        vec![t("10:00"), t("14:00")]
    );
}

#[test]
fn horizon_is_inclusive() {
    let slots = studio().generate(d("2024-03-04"), 7);
    assert!(slots.contains_key(&d("2024-03-04")));
    assert!(slots.contains_key(&d("2024-03-11")));

    let single = studio().generate(d("2024-03-04"), 0);
    assert_eq!(single.len(), 1);
}

#[parameterized(
    first_week = { "2024-03-02", true },
    second_week = { "2024-03-09", false },
    third_week = { "2024-03-16", true },
    fourth_week = { "2024-03-23", false },
    fifth_week = { "2024-03-30", true },
)]
fn alternate_cadence(date: &str, included: bool) {
    assert_eq!(Cadence::Alternate.includes(d(date)), included);
}

#[test]
fn real_seed_starts_empty_and_store_backed() {
    let slots = studio().generate(d("2024-03-01"), 90);
    assert!(!slots.is_empty());
    assert!(slots.values().all(|s| s.booked() == 0 && !s.is_offline()));
}

#[test]
fn offline_generation_is_marked() {
    let slots = studio().generate_offline(d("2024-03-01"), 14);
    assert!(slots.values().all(|s| s.is_offline() && s.booked() == 0));
}

#[test]
fn demo_generation_is_seeded_and_offline() {
    let a = studio().generate_demo(d("2024-03-01"), 60, &mut StdRng::seed_from_u64(7));
    let b = studio().generate_demo(d("2024-03-01"), 60, &mut StdRng::seed_from_u64(7));
    assert_eq!(a, b);
    assert!(a.values().all(|s| s.is_offline() && s.within_capacity()));
}

#[test]
fn first_matching_rule_wins() {
    let rules = ScheduleRules::new(vec![
        RecurrenceRule::weekly(Weekday::Mon, vec![t("18:00")], 6),
        RecurrenceRule::weekly(Weekday::Mon, vec![t("09:00")], 2),
    ]);
    let slots = ScheduleGenerator::new(rules).generate(d("2024-03-04"), 0);
    assert_eq!(slots[&d("2024-03-04")].max_capacity, 6);
}

proptest! {
    #[test]
    fn generation_is_deterministic(offset in 0u32..2000, horizon in 0u32..120) {
        let start = d("2023-01-01").add_days(offset);
        let a = serde_json::to_vec(&studio().generate(start, horizon)).unwrap();
        let b = serde_json::to_vec(&studio().generate(start, horizon)).unwrap();
        prop_assert_eq!(a, b);
    }

    #[test]
    fn generated_dates_stay_within_horizon(offset in 0u32..2000, horizon in 0u32..120) {
        let start = d("2023-01-01").add_days(offset);
        let end = start.add_days(horizon);
        for (date, slot) in studio().generate(start, horizon) {
            prop_assert!(date >= start && date <= end);
            prop_assert_eq!(slot.date, date);
        }
    }
}
