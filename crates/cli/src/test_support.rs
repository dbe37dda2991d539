// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for command tests

use crate::workspace::{CliStudio, DataDir};
use kiln_core::{Clock, DateKey, SystemClock};
use tempfile::TempDir;

/// Every weekday offers an 18:00 class with `capacity` seats
pub fn daily_config(capacity: u32) -> String {
    let mut toml = String::from("[studio]\nhorizon_days = 7\n");
    for day in [
        "monday",
        "tuesday",
        "wednesday",
        "thursday",
        "friday",
        "saturday",
        "sunday",
    ] {
        toml.push_str(&format!(
            "\n[[schedule]]\nday = \"{day}\"\ntimes = [\"18:00\"]\nmax_capacity = {capacity}\n"
        ));
    }
    toml
}

/// A locked data directory with a daily schedule and its studio
pub fn studio(capacity: u32) -> (TempDir, DataDir, CliStudio) {
    let temp = TempDir::new().unwrap();
    std::fs::write(temp.path().join("kiln.toml"), daily_config(capacity)).unwrap();
    let dir = DataDir::lock(temp.path()).unwrap();
    let studio = dir.open_studio().unwrap();
    (temp, dir, studio)
}

/// [`studio`] after the recovery pass booking commands run on open
pub async fn recovered_studio(capacity: u32) -> (TempDir, DataDir, CliStudio) {
    let (temp, dir, studio) = studio(capacity);
    studio.recover().await;
    (temp, dir, studio)
}

pub fn today() -> DateKey {
    DateKey::new(SystemClock.today())
}
