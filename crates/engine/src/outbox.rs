// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification outbox
//!
//! Confirmed bookings are handed to a queue drained by a background
//! worker with its own retry policy. Enqueueing never blocks and never
//! fails the caller; a message that cannot be delivered is logged and
//! dropped.

use crate::retry::{retry_with_predicate, RetryPolicy};
use kiln_adapters::{Notification, NotifyAdapter, StudioContact};
use kiln_core::Booking;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

enum OutboxMessage {
    Deliver(Notification),
    Flush(oneshot::Sender<()>),
}

/// Delivery counts reported when the worker stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutboxStats {
    pub delivered: u32,
    pub failed: u32,
}

/// Handle for queueing notifications
#[derive(Clone)]
pub struct Outbox {
    tx: mpsc::UnboundedSender<OutboxMessage>,
    studio: StudioContact,
}

impl Outbox {
    /// Start the delivery worker
    ///
    /// The worker runs until every `Outbox` handle is dropped, then returns
    /// its counts.
    pub fn spawn<N: NotifyAdapter>(
        notifier: N,
        policy: RetryPolicy,
        studio: StudioContact,
    ) -> (Self, JoinHandle<OutboxStats>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run(notifier, policy, rx));
        (Self { tx, studio }, worker)
    }

    /// Queue every message a confirmed booking produces
    pub fn enqueue(&self, booking: &Booking) {
        for notification in Notification::for_booking(booking, &self.studio) {
            let kind = notification.kind;
            if self.tx.send(OutboxMessage::Deliver(notification)).is_err() {
                tracing::warn!(booking = %booking.id, %kind, "outbox closed, notification dropped");
            }
        }
    }

    /// Wait until everything queued before this call has been handled
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(OutboxMessage::Flush(ack)).is_ok() {
            let _ = done.await;
        }
    }
}

async fn run<N: NotifyAdapter>(
    notifier: N,
    policy: RetryPolicy,
    mut rx: mpsc::UnboundedReceiver<OutboxMessage>,
) -> OutboxStats {
    let mut stats = OutboxStats::default();
    while let Some(message) = rx.recv().await {
        match message {
            OutboxMessage::Deliver(notification) => {
                let result =
                    retry_with_predicate(&policy, || notifier.send(&notification), |_| true).await;
                match result {
                    Ok(()) => stats.delivered += 1,
                    Err(e) => {
                        stats.failed += 1;
                        tracing::error!(
                            booking = %notification.booking_id,
                            kind = %notification.kind,
                            error = %e,
                            "notification undeliverable"
                        );
                    }
                }
            }
            OutboxMessage::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
    tracing::debug!(
        delivered = stats.delivered,
        failed = stats.failed,
        "outbox drained"
    );
    stats
}

#[cfg(test)]
#[path = "outbox_tests.rs"]
mod tests;
