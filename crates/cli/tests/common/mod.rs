// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test utilities for CLI integration tests.

#![allow(dead_code)]

use assert_cmd::Command;
use kiln_core::{Clock, DateKey, SystemClock};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Every weekday offers an 18:00 class with `capacity` seats for a week
pub fn daily_config(capacity: u32) -> String {
    let mut toml = String::from("[studio]\nhorizon_days = 7\nbooking_prefix = \"TST\"\n");
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

/// Data directory holding a daily schedule
pub fn setup_data_dir(capacity: u32) -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp directory");
    fs::write(temp.path().join("kiln.toml"), daily_config(capacity))
        .expect("Failed to write config");
    temp
}

/// `kiln` pointed at `data_dir`, with the caller's environment isolated
pub fn kiln(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("kiln").expect("kiln binary");
    cmd.env_remove("KILN_DATA_DIR")
        .env_remove("KILN_ACTOR")
        .env("KILN_LOG", "off")
        .arg("--data-dir")
        .arg(data_dir);
    cmd
}

/// Today's date key, as the CLI computes it
pub fn today() -> String {
    DateKey::new(SystemClock.today()).to_string()
}

/// Booking flags for a valid attendee
pub fn attendee_args() -> Vec<&'static str> {
    vec![
        "--name",
        "Jane Potter",
        "--email",
        "jane@example.com",
        "--phone",
        "0412345678",
        "--experience",
        "beginner",
    ]
}
