// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::studio;
use kiln_core::{DateKey, TimeOfDay};
use kiln_storage::Correction;
use yare::parameterized;

#[parameterized(
    nothing = { 0, "Schedule already covers the booking horizon" },
    one = { 1, "Seeded 1 new class date" },
    several = { 8, "Seeded 8 new class dates" },
)]
fn seed_summary_text(seeded: usize, expected: &str) {
    assert_eq!(SeedSummary { seeded }.to_string(), expected);
}

#[test]
fn corrections_are_listed() {
    let report = ReconcileReport {
        slots_checked: 3,
        corrections: vec![Correction {
            date: DateKey::from_ymd(2024, 3, 4).unwrap(),
            time: TimeOfDay::new(18, 0).unwrap(),
            before: 4,
            after: 3,
        }],
    };

    let text = ReconcileView(report).to_string();

    assert_eq!(
        text,
        "Checked 3 slots; corrected 1\n  2024-03-04 18:00: 4 -> 3"
    );
}

#[tokio::test]
async fn seed_then_reconcile_is_clean() {
    let (_temp, _dir, studio) = studio(6);

    seed(&studio, OutputFormat::Text).await.unwrap();
    assert_eq!(studio.seed().await.unwrap(), 0);

    let report = studio.reconcile().await.unwrap();
    assert!(report.is_clean());
    assert_eq!(report.slots_checked, 8);

    reconcile(&studio, OutputFormat::Json).await.unwrap();
    studio.shutdown().await;
}
