//! Error rendering specs
//!
//! Failures print `error:` with context lines and numbered suggestions.

use crate::prelude::*;

#[test]
fn unknown_booking_suggests_checking_the_reference() {
    Project::daily(6)
        .kiln()
        .args(["show", "SPEC-MISSING"])
        .fails()
        .code(1)
        .stderr_has("error: Booking 'SPEC-MISSING' not found")
        .stderr_has("suggestions:")
        .stderr_has("  1. ");
}

#[test]
fn invalid_config_is_named() {
    let project = Project::empty();
    project.file("kiln.toml", "[store]\nbackend = \"paper\"\n");

    project
        .kiln()
        .args(["availability"])
        .fails()
        .stderr_has("Invalid studio config")
        .stderr_has("kiln.toml");
}

#[test]
fn malformed_date_is_a_usage_error() {
    Project::daily(6)
        .kiln()
        .args(["book", "--date", "04/03/2024", "--time", "18:00"])
        .fails()
        .code(2)
        .stderr_has("--date");
}

#[test]
fn bad_phone_pattern_is_a_config_error() {
    let project = Project::daily(6);
    let config = format!(
        "{}\n[booking]\nphone_pattern = \"([0-9\"\n",
        daily_config(6)
    );
    project.file("kiln.toml", &config);

    project
        .kiln()
        .args(["availability"])
        .fails()
        .stderr_has("Invalid studio config")
        .stderr_has("invalid phone pattern");
}
