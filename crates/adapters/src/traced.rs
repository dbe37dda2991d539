// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::notify::{Notification, NotifyAdapter, NotifyError};
use async_trait::async_trait;
use tracing::Instrument;

/// Wrapper that adds tracing to any NotifyAdapter
#[derive(Clone)]
pub struct TracedNotifyAdapter<N> {
    inner: N,
}

impl<N> TracedNotifyAdapter<N> {
    pub fn new(inner: N) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<N: NotifyAdapter> NotifyAdapter for TracedNotifyAdapter<N> {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let span = tracing::info_span!(
            "notify.send",
            kind = %notification.kind,
            booking = %notification.booking_id,
        );
        async {
            // Precondition: a message needs somewhere to go
            if notification.recipient.trim().is_empty() {
                tracing::error!("notification has no recipient");
                return Err(NotifyError::DeliveryFailed(
                    "notification has no recipient".to_string(),
                ));
            }

            let start = std::time::Instant::now();
            let result = self.inner.send(notification).await;
            let elapsed = start.elapsed();

            match &result {
                Ok(()) => tracing::info!(
                    to = %notification.recipient,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "delivered"
                ),
                Err(e) => tracing::warn!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "delivery failed"
                ),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
