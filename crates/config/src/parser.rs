// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `kiln.toml` parsing

use crate::studio::{BookingSettings, StoreSettings, StudioConfig, StudioSettings};
use kiln_core::{Cadence, ClassKind, RecurrenceRule, ScheduleRules, TimeOfDay};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Config file name inside a data directory
pub const CONFIG_FILE: &str = "kiln.toml";

/// Errors that can occur while loading studio configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),
    #[error("invalid phone pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    studio: StudioSettings,
    #[serde(default)]
    booking: BookingSettings,
    #[serde(default)]
    store: StoreSettings,
    schedule: Option<Vec<RawRule>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRule {
    day: String,
    times: Vec<TimeOfDay>,
    max_capacity: u32,
    #[serde(default = "default_class_kind")]
    class_kind: ClassKind,
    #[serde(default)]
    cadence: Cadence,
}

fn default_class_kind() -> ClassKind {
    ClassKind::Regular
}

/// Parse studio configuration from TOML content
pub fn parse_config(content: &str) -> Result<StudioConfig, ConfigError> {
    let raw: RawConfig = toml::from_str(content)?;

    let schedule = match raw.schedule {
        None => ScheduleRules::studio_default(),
        Some(rules) => parse_schedule(rules)?,
    };

    let config = StudioConfig {
        studio: raw.studio,
        booking: raw.booking,
        store: raw.store,
        schedule,
    };
    check(&config)?;
    Ok(config)
}

/// Load `path`, or defaults when the file does not exist
pub fn load_config(path: &Path) -> Result<StudioConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => parse_config(&content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(StudioConfig::default())
        }
        Err(source) => Err(ConfigError::Io {
            path: path.display().to_string(),
            source,
        }),
    }
}

fn parse_schedule(rules: Vec<RawRule>) -> Result<ScheduleRules, ConfigError> {
    if rules.is_empty() {
        return Err(ConfigError::InvalidSchedule(
            "at least one [[schedule]] rule is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    let mut parsed = Vec::with_capacity(rules.len());
    for rule in rules {
        let weekday = rule
            .day
            .parse::<kiln_core::Weekday>()
            .map_err(|_| ConfigError::InvalidSchedule(format!("unknown day '{}'", rule.day)))?;
        if !seen.insert((weekday, rule.cadence)) {
            return Err(ConfigError::InvalidSchedule(format!(
                "duplicate {} rule for {}",
                cadence_name(rule.cadence),
                rule.day
            )));
        }
        if rule.times.is_empty() {
            return Err(ConfigError::InvalidSchedule(format!(
                "{} rule has no times",
                rule.day
            )));
        }
        if rule.max_capacity == 0 {
            return Err(ConfigError::InvalidSchedule(format!(
                "{} rule has zero capacity",
                rule.day
            )));
        }
        parsed.push(
            RecurrenceRule::weekly(weekday, rule.times, rule.max_capacity)
                .class_kind(rule.class_kind)
                .cadence(rule.cadence),
        );
    }
    Ok(ScheduleRules::new(parsed))
}

fn cadence_name(cadence: Cadence) -> &'static str {
    match cadence {
        Cadence::Weekly => "weekly",
        Cadence::Alternate => "alternate",
    }
}

fn check(config: &StudioConfig) -> Result<(), ConfigError> {
    regex::Regex::new(&config.booking.phone_pattern)?;

    let prefix = &config.studio.booking_prefix;
    if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::InvalidValue(format!(
            "booking_prefix must be alphanumeric, got '{prefix}'"
        )));
    }
    if config.studio.horizon_days == 0 {
        return Err(ConfigError::InvalidValue(
            "horizon_days must be at least 1".to_string(),
        ));
    }
    if config.store.cas_attempts == 0 {
        return Err(ConfigError::InvalidValue(
            "cas_attempts must be at least 1".to_string(),
        ));
    }
    if config.store.call_timeout.is_zero() {
        return Err(ConfigError::InvalidValue(
            "call_timeout must be non-zero".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
