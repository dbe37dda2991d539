// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store upkeep: extend the schedule, repair seat counters

use crate::error::KilnError;
use crate::output::{self, OutputFormat};
use crate::workspace::CliStudio;
use anyhow::Result;
use kiln_storage::ReconcileReport;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Serialize)]
pub struct SeedSummary {
    pub seeded: usize,
}

impl fmt::Display for SeedSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.seeded {
            0 => write!(f, "Schedule already covers the booking horizon"),
            1 => write!(f, "Seeded 1 new class date"),
            n => write!(f, "Seeded {} new class dates", n),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct ReconcileView(pub ReconcileReport);

impl fmt::Display for ReconcileView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = &self.0;
        if report.is_clean() {
            return write!(
                f,
                "Checked {} slots; seat counters consistent",
                report.slots_checked
            );
        }
        write!(
            f,
            "Checked {} slots; corrected {}",
            report.slots_checked,
            report.corrections.len()
        )?;
        for c in &report.corrections {
            write!(f, "\n  {} {}: {} -> {}", c.date, c.time, c.before, c.after)?;
        }
        Ok(())
    }
}

pub async fn seed(studio: &CliStudio, format: OutputFormat) -> Result<()> {
    let seeded = studio
        .seed()
        .await
        .map_err(|e| KilnError::new("Seeding failed").with_source(e))?;
    output::print(&SeedSummary { seeded }, format);
    Ok(())
}

pub async fn reconcile(studio: &CliStudio, format: OutputFormat) -> Result<()> {
    let report = studio
        .reconcile()
        .await
        .map_err(|e| KilnError::new("Reconcile failed").with_source(e))?;
    output::print(&ReconcileView(report), format);
    Ok(())
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
