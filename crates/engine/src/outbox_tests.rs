// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use kiln_adapters::{FakeNotifyAdapter, NotificationKind};
use kiln_core::{Attendee, BookingInput, ClassKind, ExperienceLevel};
use std::time::Duration;

fn booking(id: &str) -> Booking {
    Booking::confirmed(
        id.into(),
        "2024-03-04".parse().unwrap(),
        "18:00".parse().unwrap(),
        BookingInput {
            class_kind: ClassKind::Regular,
            attendee: Attendee {
                full_name: "Jane Potter".into(),
                email: "jane@example.com".into(),
                phone: "0412345678".into(),
                experience: ExperienceLevel::Beginner,
            },
            notes: None,
        },
        chrono::Utc::now(),
    )
}

fn studio(inbox: Option<&str>) -> StudioContact {
    StudioContact {
        name: "Test Studio".into(),
        address: None,
        inbox: inbox.map(String::from),
    }
}

fn fast() -> RetryPolicy {
    RetryPolicy::new(2, Duration::from_millis(1))
}

#[tokio::test]
async fn confirmation_and_alert_are_delivered() {
    let fake = FakeNotifyAdapter::new();
    let (outbox, worker) = Outbox::spawn(fake.clone(), fast(), studio(Some("s@example.com")));

    outbox.enqueue(&booking("BSC-1"));
    outbox.flush().await;

    let kinds: Vec<_> = fake.sent().iter().map(|n| n.kind).collect();
    assert_eq!(
        kinds,
        vec![NotificationKind::Confirmation, NotificationKind::StudioAlert]
    );

    drop(outbox);
    let stats = worker.await.unwrap();
    assert_eq!(stats, OutboxStats { delivered: 2, failed: 0 });
}

#[tokio::test]
async fn transient_delivery_failures_are_retried() {
    let fake = FakeNotifyAdapter::new();
    fake.fail_next(2);
    let (outbox, worker) = Outbox::spawn(fake.clone(), fast(), studio(None));

    outbox.enqueue(&booking("BSC-1"));
    drop(outbox);
    let stats = worker.await.unwrap();

    assert_eq!(stats.delivered, 1);
    assert_eq!(fake.attempts(), 3);
}

#[tokio::test]
async fn undeliverable_message_is_dropped_and_worker_continues() {
    let fake = FakeNotifyAdapter::new();
    fake.fail_next(3);
    let (outbox, worker) = Outbox::spawn(fake.clone(), fast(), studio(None));

    outbox.enqueue(&booking("BSC-1"));
    outbox.enqueue(&booking("BSC-2"));
    drop(outbox);
    let stats = worker.await.unwrap();

    assert_eq!(stats, OutboxStats { delivered: 1, failed: 1 });
    assert_eq!(fake.sent()[0].booking_id, kiln_core::BookingId::from("BSC-2"));
}

#[tokio::test]
async fn enqueue_after_worker_stopped_does_not_panic() {
    let (outbox, worker) = Outbox::spawn(FakeNotifyAdapter::new(), fast(), studio(None));
    worker.abort();
    let _ = worker.await;
    outbox.enqueue(&booking("BSC-1"));
    outbox.flush().await;
}
