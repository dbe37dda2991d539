// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ID generation abstractions

use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Generates unique identifiers
pub trait IdGen: Clone + Send + Sync + 'static {
    fn next(&self) -> String;
}

/// UUID-based ID generator, used for claim tokens
#[derive(Clone, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn next(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Default prefix for studio booking references
pub const DEFAULT_BOOKING_PREFIX: &str = "BSC";

const RANDOM_DIGITS: u32 = 9;

/// Booking reference generator: `PREFIX-<base36 millis>-<base36 random>`, uppercased
///
/// The random suffix is always nine base36 digits (about 46 bits), so two
/// references minted in the same millisecond collide with negligible
/// probability.
#[derive(Clone)]
pub struct BookingIdGen {
    prefix: String,
}

impl BookingIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into().to_uppercase(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Default for BookingIdGen {
    fn default() -> Self {
        Self::new(DEFAULT_BOOKING_PREFIX)
    }
}

impl IdGen for BookingIdGen {
    fn next(&self) -> String {
        let millis = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0);
        let space = 36u64.pow(RANDOM_DIGITS);
        let random = rand::thread_rng().gen_range(0..space);
        format!(
            "{}-{}-{:0>width$}",
            self.prefix,
            to_base36(millis),
            to_base36(random),
            width = RANDOM_DIGITS as usize
        )
        .to_uppercase()
    }
}

/// Lowercase base36 rendering of an unsigned integer
pub fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// Sequential ID generator for testing
#[derive(Clone)]
pub struct SequentialIdGen {
    prefix: String,
    counter: Arc<AtomicU64>,
}

impl SequentialIdGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl Default for SequentialIdGen {
    fn default() -> Self {
        Self::new("id")
    }
}

impl IdGen for SequentialIdGen {
    fn next(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{}-{}", self.prefix, n)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
