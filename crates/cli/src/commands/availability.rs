// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Upcoming classes and their open seats

use crate::error::KilnError;
use crate::output::{self, OutputFormat};
use crate::workspace::CliStudio;
use anyhow::Result;
use kiln_core::{ClassKind, DateKey, TimeOfDay};
use kiln_engine::{AvailabilityError, AvailabilitySnapshot, FetchMode};
use serde::Serialize;
use std::fmt;

#[derive(clap::Args)]
pub struct AvailabilityArgs {
    /// Show the regular schedule when the store cannot be read
    #[arg(long)]
    pub offline: bool,
}

/// One bookable time on one date
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRow {
    pub date_key: DateKey,
    pub day: &'static str,
    pub time: TimeOfDay,
    pub class_kind: ClassKind,
    pub max_capacity: u32,
    pub booked: u32,
    pub remaining: u32,
    pub offline: bool,
}

impl fmt::Display for AvailabilityRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seats = if self.remaining == 0 {
            "full".to_string()
        } else {
            format!("{} left", self.remaining)
        };
        write!(
            f,
            "{}  {:<9}  {:>8}  {:<8}  {}/{} booked  {}",
            self.date_key,
            self.day,
            self.time.display_12h(),
            self.class_kind.to_string(),
            self.booked,
            self.max_capacity,
            seats
        )?;
        if self.offline {
            write!(f, "  (offline)")?;
        }
        Ok(())
    }
}

/// Flatten a snapshot into one row per offered time, in date then time order
pub fn rows(snapshot: &AvailabilitySnapshot) -> Vec<AvailabilityRow> {
    snapshot
        .slots
        .values()
        .flat_map(|slot| {
            slot.times().map(move |time| {
                let booked = slot.booked_at(time).unwrap_or(0);
                AvailabilityRow {
                    date_key: slot.date,
                    day: slot.date.day_name(),
                    time,
                    class_kind: slot.class_kind,
                    max_capacity: slot.max_capacity,
                    booked,
                    remaining: slot.max_capacity.saturating_sub(booked),
                    offline: slot.is_offline(),
                }
            })
        })
        .collect()
}

/// Load availability, turning an unreachable store into a friendly error
pub async fn load(studio: &CliStudio, offline: bool) -> Result<AvailabilitySnapshot> {
    let mode = if offline {
        FetchMode::AllowOffline
    } else {
        FetchMode::Live
    };
    match studio.availability(mode).await {
        Ok(snapshot) => Ok(snapshot),
        Err(e @ AvailabilityError::Unavailable(_)) => Err(KilnError::new(
            "The booking store is unavailable",
        )
        .with_source(e)
        .with_suggestion("View the regular schedule: kiln availability --offline")
        .into()),
        Err(e) => Err(e.into()),
    }
}

pub async fn handle(
    args: AvailabilityArgs,
    studio: &CliStudio,
    format: OutputFormat,
) -> Result<()> {
    let snapshot = load(studio, args.offline).await?;
    if snapshot.offline && format == OutputFormat::Text {
        eprintln!("Store unreachable; showing the regular schedule. Booking is unavailable.");
    }
    output::print_list(&rows(&snapshot), format, "No upcoming classes");
    Ok(())
}

#[cfg(test)]
#[path = "availability_tests.rs"]
mod tests;
