// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake notification adapter for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{Notification, NotifyAdapter, NotifyError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct FakeState {
    sent: Vec<Notification>,
    attempts: u32,
    failures_left: u32,
}

/// Fake notification adapter for testing
#[derive(Clone, Default)]
pub struct FakeNotifyAdapter {
    state: Arc<Mutex<FakeState>>,
}

impl FakeNotifyAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `n` deliveries
    pub fn fail_next(&self, n: u32) {
        self.lock().failures_left = n;
    }

    /// Get all delivered notifications
    pub fn sent(&self) -> Vec<Notification> {
        self.lock().sent.clone()
    }

    /// Number of delivery attempts, failed ones included
    pub fn attempts(&self) -> u32 {
        self.lock().attempts
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl NotifyAdapter for FakeNotifyAdapter {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let mut state = self.lock();
        state.attempts += 1;
        if state.failures_left > 0 {
            state.failures_left -= 1;
            return Err(NotifyError::DeliveryFailed("injected failure".into()));
        }
        state.sent.push(notification.clone());
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
