// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed studio configuration with defaults

use kiln_core::id::DEFAULT_BOOKING_PREFIX;
use kiln_core::validate::{DEFAULT_MAX_NOTES_CHARS, DEFAULT_PHONE_PATTERN};
use kiln_core::{BookingValidator, ScheduleRules};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioSettings {
    pub name: String,
    pub booking_prefix: String,
    /// Where studio alerts for new bookings are sent
    pub notification_email: Option<String>,
    pub address: Option<String>,
    /// Days ahead of today that slots are offered
    pub horizon_days: u32,
}

impl Default for StudioSettings {
    fn default() -> Self {
        Self {
            name: "Bodhi Swan Ceramics".to_string(),
            booking_prefix: DEFAULT_BOOKING_PREFIX.to_string(),
            notification_email: None,
            address: None,
            horizon_days: 90,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingSettings {
    pub phone_pattern: String,
    pub max_notes_len: usize,
}

impl Default for BookingSettings {
    fn default() -> Self {
        Self {
            phone_pattern: DEFAULT_PHONE_PATTERN.to_string(),
            max_notes_len: DEFAULT_MAX_NOTES_CHARS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Append-only log with per-row compare-and-set
    #[default]
    Ledger,
    /// Transactional document collections
    Document,
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Ledger => write!(f, "ledger"),
            StoreBackend::Document => write!(f, "document"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub backend: StoreBackend,
    /// Upper bound on any single store call
    #[serde(with = "humantime_serde")]
    pub call_timeout: Duration,
    /// Claims older than this are released by maintenance
    #[serde(with = "humantime_serde")]
    pub claim_ttl: Duration,
    /// Compare-and-set attempts before a claim reports a conflict
    pub cas_attempts: u32,
    /// Retries for transient store failures
    pub retry_attempts: u32,
    #[serde(with = "humantime_serde")]
    pub retry_backoff: Duration,
    #[serde(with = "humantime_serde")]
    pub maintenance_interval: Duration,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            call_timeout: Duration::from_secs(5),
            claim_ttl: Duration::from_secs(120),
            cas_attempts: 5,
            retry_attempts: 3,
            retry_backoff: Duration::from_millis(100),
            maintenance_interval: Duration::from_secs(30),
        }
    }
}

/// Everything read from `kiln.toml`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudioConfig {
    pub studio: StudioSettings,
    pub booking: BookingSettings,
    pub store: StoreSettings,
    pub schedule: ScheduleRules,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            studio: StudioSettings::default(),
            booking: BookingSettings::default(),
            store: StoreSettings::default(),
            schedule: ScheduleRules::studio_default(),
        }
    }
}

impl StudioConfig {
    /// Validator for this studio's phone format and notes limit
    ///
    /// The phone pattern is checked when the config is parsed, so this only
    /// fails for configs built by hand.
    pub fn validator(&self) -> Result<BookingValidator, regex::Error> {
        Ok(BookingValidator::new(&self.booking.phone_pattern)?
            .with_max_notes_chars(self.booking.max_notes_len))
    }
}
