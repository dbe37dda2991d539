// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use kiln_core::FakeClock;

fn d(s: &str) -> DateKey {
    s.parse().unwrap()
}

fn t(s: &str) -> TimeOfDay {
    s.parse().unwrap()
}

fn clock() -> FakeClock {
    FakeClock::at(d("2024-03-01").date())
}

fn saturday(booked_at_two: u32) -> SlotMap {
    let slot = Slot::new(
        d("2024-03-02"),
        ClassKind::Workshop,
        8,
        [t("10:00"), t("14:00")],
    )
    .with_booked(t("14:00"), booked_at_two);
    SlotMap::from([(slot.date, slot)])
}

fn booking(id: &str, token: &ClaimToken) -> Booking {
    Booking {
        id: id.into(),
        date: token.date,
        time: token.time,
        class_kind: ClassKind::Workshop,
        attendee: Attendee {
            full_name: "Sam Wheeler".into(),
            email: "sam@example.com".into(),
            phone: "0298765432".into(),
            experience: ExperienceLevel::Some,
        },
        notes: Some("Bringing my own apron".into()),
        status: BookingStatus::Confirmed,
        created_at: token.issued_at,
        actor: None,
    }
}

async fn claim(store: &LedgerStore<FakeClock>, time: &str) -> ClaimToken {
    match store.claim_seat(d("2024-03-02"), t(time)).await.unwrap() {
        ClaimResult::Granted(token) => token,
        ClaimResult::Full => panic!("expected a seat at {time}"),
    }
}

async fn booked(store: &LedgerStore<FakeClock>, time: &str) -> u32 {
    let slots = store.list_upcoming_slots(d("2024-03-01"), 7).await.unwrap();
    slots[&d("2024-03-02")].booked_at(t(time)).unwrap()
}

#[test]
fn slot_row_uses_comma_separated_cells() {
    let slots = saturday(3);
    let row = SlotRow::from_slot(&slots[&d("2024-03-02")]);
    let json = serde_json::to_value(&row).unwrap();

    assert_eq!(json["date_key"], "2024-03-02");
    assert_eq!(json["display_date"], "Saturday, 2 March 2024");
    assert_eq!(json["day_of_week"], "Saturday");
    assert_eq!(json["times"], "10:00,14:00");
    assert_eq!(json["booked"], "0,3");

    let back: SlotRow = serde_json::from_value(json).unwrap();
    assert_eq!(back, row);
}

#[test]
fn booking_row_keeps_every_column() {
    let token = ClaimToken {
        id: "c1".into(),
        date: d("2024-03-02"),
        time: t("14:00"),
        issued_at: clock().utc_now(),
    };
    let original = booking("BSC-9", &token);
    let row = BookingRow::from(&original);
    assert_eq!(row.date, "Saturday, 2 March 2024");
    assert_eq!(row.notes, "Bringing my own apron");
    assert_eq!(row.to_booking(), original);
}

#[tokio::test]
async fn claim_bumps_only_the_chosen_time() {
    let store = LedgerStore::in_memory(clock());
    store.seed_slots(saturday(0)).await.unwrap();

    let token = claim(&store, "14:00").await;
    assert_eq!(booked(&store, "14:00").await, 1);
    assert_eq!(booked(&store, "10:00").await, 0);

    store.record_booking(&token, booking("BSC-1", &token)).await.unwrap();
    assert_eq!(booked(&store, "14:00").await, 1);
    assert_eq!(store.booking_rows().len(), 1);
}

#[tokio::test]
async fn full_time_reports_full() {
    let store = LedgerStore::in_memory(clock());
    store.seed_slots(saturday(8)).await.unwrap();

    let result = store.claim_seat(d("2024-03-02"), t("14:00")).await.unwrap();
    assert_eq!(result, ClaimResult::Full);
    assert!(store
        .claim_seat(d("2024-03-02"), t("10:00"))
        .await
        .unwrap()
        .is_granted());
}

#[tokio::test]
async fn release_restores_the_seat_once() {
    let store = LedgerStore::in_memory(clock());
    store.seed_slots(saturday(2)).await.unwrap();
    let token = claim(&store, "14:00").await;

    assert!(store.release_seat(&token).await.unwrap());
    assert!(!store.release_seat(&token).await.unwrap());
    assert_eq!(booked(&store, "14:00").await, 2);
}

#[tokio::test]
async fn recorded_claim_cannot_be_released() {
    let store = LedgerStore::in_memory(clock());
    store.seed_slots(saturday(0)).await.unwrap();
    let token = claim(&store, "10:00").await;
    store.record_booking(&token, booking("BSC-1", &token)).await.unwrap();

    assert!(!store.release_seat(&token).await.unwrap());
    assert_eq!(booked(&store, "10:00").await, 1);
}

#[tokio::test]
async fn last_seat_goes_to_exactly_one_racer() {
    let store = LedgerStore::in_memory(clock());
    store.seed_slots(saturday(7)).await.unwrap();

    let mut tasks = Vec::new();
    for _ in 0..10 {
        let store = store.clone();
        tasks.push(tokio::spawn(async move {
            store.claim_seat(d("2024-03-02"), t("14:00")).await
        }));
    }
    let mut granted = 0;
    for task in tasks {
        if task.await.unwrap().unwrap().is_granted() {
            granted += 1;
        }
    }
    assert_eq!(granted, 1);
    assert_eq!(booked(&store, "14:00").await, 8);
}

#[tokio::test]
async fn ledger_replays_after_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.jsonl");
    {
        let store = LedgerStore::open(&path, clock()).unwrap();
        store.seed_slots(saturday(0)).await.unwrap();
        let token = claim(&store, "10:00").await;
        store.record_booking(&token, booking("BSC-1", &token)).await.unwrap();
    }

    let store = LedgerStore::open(&path, clock()).unwrap();
    assert_eq!(booked(&store, "10:00").await, 1);
    let found = store.find_booking(&"BSC-1".into()).await.unwrap().unwrap();
    assert_eq!(found.attendee.full_name, "Sam Wheeler");
}

#[tokio::test]
async fn reconcile_repairs_seat_of_a_claim_lost_in_a_crash() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.jsonl");
    {
        let store = LedgerStore::open(&path, clock()).unwrap();
        store.seed_slots(saturday(0)).await.unwrap();
        let kept = claim(&store, "10:00").await;
        store.record_booking(&kept, booking("BSC-1", &kept)).await.unwrap();
        // Claimed but never recorded or released
        let _lost = claim(&store, "10:00").await;
    }

    let store = LedgerStore::open(&path, clock()).unwrap();
    assert_eq!(booked(&store, "10:00").await, 2);

    let report = store.reconcile().await.unwrap();
    assert_eq!(
        report.corrections,
        vec![Correction {
            date: d("2024-03-02"),
            time: t("10:00"),
            before: 2,
            after: 1,
        }]
    );
    assert_eq!(booked(&store, "10:00").await, 1);

    // The repair itself is durable
    drop(store);
    let store = LedgerStore::open(&path, clock()).unwrap();
    assert_eq!(booked(&store, "10:00").await, 1);
}

#[tokio::test]
async fn expire_releases_only_stale_claims() {
    let clock = clock();
    let store = LedgerStore::in_memory(clock.clone());
    store.seed_slots(saturday(0)).await.unwrap();
    let old = claim(&store, "10:00").await;
    clock.advance(std::time::Duration::from_secs(600));
    let _fresh = claim(&store, "10:00").await;

    let cutoff = clock.utc_now() - chrono::Duration::seconds(120);
    assert_eq!(store.expire_claims(cutoff).await.unwrap(), vec![old.clone()]);
    assert_eq!(booked(&store, "10:00").await, 1);
    assert!(matches!(
        store.record_booking(&old, booking("BSC-1", &old)).await,
        Err(StoreError::ClaimNotHeld(_))
    ));
}

#[tokio::test]
async fn unknown_date_is_not_found() {
    let store = LedgerStore::in_memory(clock());
    store.seed_slots(saturday(0)).await.unwrap();
    let err = store
        .claim_seat(d("2024-03-09"), t("10:00"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::SlotNotFound { .. }));
}

#[tokio::test]
async fn horizon_bounds_the_listing() {
    let store = LedgerStore::in_memory(clock());
    let mut slots = saturday(0);
    let later = Slot::new(d("2024-04-06"), ClassKind::Workshop, 8, [t("10:00")]);
    slots.insert(later.date, later);
    store.seed_slots(slots).await.unwrap();

    let listed = store.list_upcoming_slots(d("2024-03-01"), 30).await.unwrap();
    assert_eq!(listed.keys().copied().collect::<Vec<_>>(), vec![d("2024-03-02")]);
    let listed = store.list_upcoming_slots(d("2024-03-01"), 36).await.unwrap();
    assert_eq!(listed.len(), 2);
}
