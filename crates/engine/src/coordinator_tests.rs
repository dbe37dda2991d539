// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::outbox::Outbox;
use kiln_adapters::{FakeNotifyAdapter, NotificationKind, StudioContact};
use kiln_core::{
    BookingId, ClassKind, DateKey, FakeClock, SequentialIdGen, Slot, SlotMap, TimeOfDay,
};
use kiln_storage::{ActivityKind, DocumentStore, FlakyStore};

type Store = FlakyStore<DocumentStore<FakeClock>>;

fn d(s: &str) -> DateKey {
    s.parse().unwrap()
}

fn t(s: &str) -> TimeOfDay {
    s.parse().unwrap()
}

fn monday() -> Selection {
    Selection::new(d("2024-03-04"), t("18:00"))
}

fn form() -> RawBookingForm {
    RawBookingForm {
        class_kind: Some("regular".into()),
        full_name: Some("Jane Potter".into()),
        email: Some("jane@example.com".into()),
        phone: Some("0412345678".into()),
        experience: Some("beginner".into()),
        notes: None,
    }
}

async fn setup(booked: u32) -> (Store, ReservationCoordinator<Store, SequentialIdGen, FakeClock>) {
    let clock = FakeClock::at(d("2024-03-01").date());
    let store = FlakyStore::new(DocumentStore::in_memory(clock.clone()));
    let slot =
        Slot::new(d("2024-03-04"), ClassKind::Regular, 6, [t("18:00")]).with_booked(t("18:00"), booked);
    store
        .seed_slots(SlotMap::from([(slot.date, slot)]))
        .await
        .unwrap();
    let validator = BookingValidator::new(kiln_core::validate::DEFAULT_PHONE_PATTERN).unwrap();
    let coordinator =
        ReservationCoordinator::new(store.clone(), validator, SequentialIdGen::new("BSC"), clock)
            .with_retry(RetryPolicy::new(2, Duration::from_millis(1)), DEFAULT_CALL_TIMEOUT);
    (store, coordinator)
}

async fn booked(store: &Store) -> u32 {
    let slots = store.list_upcoming_slots(d("2024-03-01"), 30).await.unwrap();
    slots[&d("2024-03-04")].booked_at(t("18:00")).unwrap()
}

#[tokio::test]
async fn missing_time_is_incomplete_without_touching_the_store() {
    let (store, coordinator) = setup(0).await;
    let calls_before = store.calls().len();

    let selection = Selection {
        date: Some(d("2024-03-04")),
        ..Selection::default()
    };
    let outcome = coordinator.submit(selection, &form(), None).await;

    assert_eq!(outcome, Outcome::Incomplete);
    assert_eq!(store.calls().len(), calls_before);
}

#[tokio::test]
async fn invalid_fields_are_rejected_together() {
    let (store, coordinator) = setup(0).await;
    let calls_before = store.calls().len();
    let mut bad = form();
    bad.full_name = Some("A".into());
    bad.email = Some("bad".into());
    bad.phone = Some("123".into());

    let outcome = coordinator.submit(monday(), &bad, None).await;

    let Outcome::Rejected(errors) = &outcome else {
        panic!("expected rejection, got {outcome:?}");
    };
    assert_eq!(errors.len(), 3);
    assert_eq!(store.calls().len(), calls_before);
    assert!(outcome.message().starts_with("Please correct:"));
}

#[tokio::test]
async fn last_seat_is_confirmed_then_the_slot_is_full() {
    let (store, coordinator) = setup(5).await;

    let first = coordinator.submit(monday(), &form(), None).await;
    let booking = first.booking().unwrap().clone();
    assert_eq!(booking.id, BookingId::from("BSC-1"));
    assert_eq!(booking.attendee.full_name, "Jane Potter");
    assert_eq!(booked(&store).await, 6);

    let second = coordinator.submit(monday(), &form(), None).await;
    assert_eq!(second, Outcome::Conflict(ConflictReason::Full));
    assert_eq!(booked(&store).await, 6);

    let found = store.find_booking(&booking.id).await.unwrap();
    assert_eq!(found, Some(booking));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_submissions_for_the_last_seat() {
    let (store, coordinator) = setup(5).await;

    let mut tasks = Vec::new();
    for _ in 0..10 {
        let coordinator = coordinator.clone();
        tasks.push(tokio::spawn(async move {
            coordinator.submit(monday(), &form(), None).await
        }));
    }

    let mut confirmed = 0;
    let mut conflicts = 0;
    for task in tasks {
        match task.await.unwrap() {
            Outcome::Confirmed(_) => confirmed += 1,
            Outcome::Conflict(ConflictReason::Full) => conflicts += 1,
            other => panic!("unexpected outcome {other:?}"),
        }
    }
    assert_eq!((confirmed, conflicts), (1, 9));
    assert_eq!(booked(&store).await, 6);
}

#[tokio::test]
async fn record_failure_releases_the_seat() {
    let (store, coordinator) = setup(5).await;
    let coordinator = coordinator.with_retry(RetryPolicy::none(), DEFAULT_CALL_TIMEOUT);
    store.fail_next_records(1);

    let outcome = coordinator.submit(monday(), &form(), None).await;

    assert_eq!(outcome, Outcome::PersistenceFailed { compensated: true });
    assert_eq!(booked(&store).await, 5);
    assert!(!coordinator.reconcile_flag().is_raised());
    assert!(store.calls().contains(&"release"));
}

#[tokio::test]
async fn failed_release_asks_for_reconciliation() {
    let (store, coordinator) = setup(0).await;
    let coordinator = coordinator.with_retry(RetryPolicy::none(), DEFAULT_CALL_TIMEOUT);
    store.fail_next_records(1);
    store.fail_next_releases(1);

    let outcome = coordinator.submit(monday(), &form(), None).await;

    assert_eq!(outcome, Outcome::PersistenceFailed { compensated: false });
    assert!(coordinator.reconcile_flag().is_raised());
}

#[tokio::test]
async fn transient_claim_failure_is_retried() {
    let (store, coordinator) = setup(0).await;
    store.fail_next_claims(1);

    let outcome = coordinator.submit(monday(), &form(), None).await;

    assert!(outcome.is_confirmed());
    let claims = store.calls().iter().filter(|op| **op == "claim").count();
    assert_eq!(claims, 2);
}

#[tokio::test]
async fn unreachable_store_is_unavailable() {
    let (store, coordinator) = setup(0).await;
    store.go_offline();

    let outcome = coordinator.submit(monday(), &form(), None).await;

    assert!(matches!(outcome, Outcome::Unavailable(_)));
    store.go_online();
    assert_eq!(booked(&store).await, 0);
}

#[tokio::test]
async fn offline_selection_is_refused() {
    let (store, coordinator) = setup(0).await;
    let calls_before = store.calls().len();

    let selection = monday().from_origin(SlotOrigin::Offline);
    let outcome = coordinator.submit(selection, &form(), None).await;

    assert!(matches!(outcome, Outcome::Unavailable(_)));
    assert_eq!(store.calls().len(), calls_before);
}

#[tokio::test]
async fn time_not_offered_is_a_conflict() {
    let (_store, coordinator) = setup(0).await;

    let outcome = coordinator
        .submit(Selection::new(d("2024-03-04"), t("10:00")), &form(), None)
        .await;

    assert_eq!(outcome, Outcome::Conflict(ConflictReason::NotOffered));
    assert_eq!(outcome.kind(), "conflict");
    assert!(outcome.message().contains("No class is offered"));
}

#[tokio::test]
async fn confirmed_booking_is_announced() {
    let (_store, coordinator) = setup(0).await;
    let fake = FakeNotifyAdapter::new();
    let studio = StudioContact {
        name: "Test Studio".into(),
        address: None,
        inbox: Some("studio@example.com".into()),
    };
    let (outbox, _worker) = Outbox::spawn(fake.clone(), RetryPolicy::none(), studio);
    let coordinator = coordinator.with_outbox(outbox.clone());

    let outcome = coordinator.submit(monday(), &form(), None).await;
    outbox.flush().await;

    assert!(outcome.is_confirmed());
    let sent = fake.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].kind, NotificationKind::Confirmation);
    assert_eq!(sent[0].recipient, "jane@example.com");
    assert_eq!(sent[1].kind, NotificationKind::StudioAlert);
}

#[tokio::test]
async fn notification_failure_does_not_undo_the_booking() {
    let (store, coordinator) = setup(0).await;
    let fake = FakeNotifyAdapter::new();
    fake.fail_next(10);
    let (outbox, _worker) =
        Outbox::spawn(fake.clone(), RetryPolicy::none(), StudioContact::default());
    let coordinator = coordinator.with_outbox(outbox.clone());

    let outcome = coordinator.submit(monday(), &form(), None).await;
    outbox.flush().await;

    assert!(outcome.is_confirmed());
    assert!(fake.sent().is_empty());
    assert_eq!(booked(&store).await, 1);
}

#[tokio::test]
async fn actor_is_kept_on_the_booking() {
    let (store, coordinator) = setup(0).await;

    let outcome = coordinator
        .submit(monday(), &form(), Some("front-desk".into()))
        .await;

    let booking = outcome.booking().unwrap();
    assert_eq!(booking.actor.as_deref(), Some("front-desk"));
    let activity = store.inner().activity();
    let created = activity
        .iter()
        .find(|e| e.kind == ActivityKind::BookingCreated)
        .unwrap();
    assert_eq!(created.actor.as_deref(), Some("front-desk"));
}

#[tokio::test]
async fn each_submit_is_a_new_booking() {
    let (store, coordinator) = setup(0).await;

    let first = coordinator.submit(monday(), &form(), None).await;
    let second = coordinator.submit(monday(), &form(), None).await;

    assert_ne!(first.booking().unwrap().id, second.booking().unwrap().id);
    assert_eq!(booked(&store).await, 2);
}

#[tokio::test(start_paused = true)]
async fn abandoned_attempt_still_records_its_seat() {
    let (store, coordinator) = setup(5).await;
    store.delay_calls(Duration::from_millis(50));

    let abandoned = tokio::time::timeout(
        Duration::from_millis(75),
        coordinator.submit(monday(), &form(), None),
    )
    .await;
    assert!(abandoned.is_err());

    tokio::time::sleep(Duration::from_millis(200)).await;

    let created = store
        .inner()
        .activity()
        .iter()
        .filter(|e| e.kind == ActivityKind::BookingCreated)
        .count();
    assert_eq!(created, 1);
    store.delay_calls(Duration::ZERO);
    assert_eq!(booked(&store).await, 6);
}
