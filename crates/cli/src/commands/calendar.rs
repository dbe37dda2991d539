// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Month grid with per-day availability

use crate::commands::availability;
use crate::output::{self, OutputFormat};
use crate::workspace::CliStudio;
use anyhow::Result;
use kiln_core::{time_options, Availability, DateKey, DayCell, TimeOption, ViewState, YearMonth};
use serde::Serialize;
use std::fmt;

const WEEKDAYS: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

#[derive(clap::Args)]
pub struct CalendarArgs {
    /// Month to show (YYYY-MM); defaults to the selected date's month, else this month
    #[arg(long)]
    pub month: Option<YearMonth>,

    /// Date whose class times to list (YYYY-MM-DD)
    #[arg(long)]
    pub select: Option<DateKey>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarView {
    pub view: ViewState,
    pub today: DateKey,
    pub offline: bool,
    pub cells: Vec<DayCell>,
    /// Times for the selected date
    pub times: Vec<TimeOption>,
}

impl CalendarView {
    pub fn new(view: ViewState, snapshot: &kiln_engine::AvailabilitySnapshot) -> Self {
        let times = view
            .selected_date
            .map(|date| time_options(&snapshot.slots, date))
            .unwrap_or_default();
        Self {
            view,
            today: snapshot.today,
            offline: snapshot.offline,
            cells: view.grid(snapshot.today, &snapshot.slots),
            times,
        }
    }
}

fn cell(c: &DayCell) -> String {
    if !c.in_current_month {
        return "    ".to_string();
    }
    let day = c.date.date().format("%e");
    if c.is_selected {
        return format!("[{day}]");
    }
    let mark = match c.availability {
        _ if c.is_past => ' ',
        Availability::None => ' ',
        Availability::Full => 'x',
        Availability::Open if c.offline => '~',
        Availability::Open => '+',
    };
    format!(" {day}{mark}")
}

impl fmt::Display for CalendarView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:^28}", self.view.month.title())?;
        let header: Vec<String> = WEEKDAYS.iter().map(|d| format!(" {d} ")).collect();
        writeln!(f, "{}", header.concat().trim_end())?;
        for week in self.cells.chunks(7) {
            let row: String = week.iter().map(cell).collect();
            if !row.trim().is_empty() {
                writeln!(f, "{}", row.trim_end())?;
            }
        }
        writeln!(f)?;
        write!(f, "+ open   x full   ~ offline   [ ] selected")?;

        if let Some(date) = self.view.selected_date {
            writeln!(f)?;
            writeln!(f)?;
            write!(f, "{}", date.display_long())?;
            if self.times.is_empty() {
                write!(f, "\n  No classes on this day")?;
            }
            for option in &self.times {
                let seats = match option.remaining {
                    0 => "full".to_string(),
                    1 => "1 seat left".to_string(),
                    n => format!("{n} seats left"),
                };
                write!(f, "\n  {:>8}  {}", option.time.display_12h(), seats)?;
            }
        }
        Ok(())
    }
}

pub async fn handle(args: CalendarArgs, studio: &CliStudio, format: OutputFormat) -> Result<()> {
    let snapshot = availability::load(studio, true).await?;
    let month = args
        .month
        .or(args.select.map(|d| d.month()))
        .unwrap_or_else(|| snapshot.today.month());

    let mut view = ViewState::new(month);
    if let Some(date) = args.select {
        view = view.select_date(date);
    }

    if snapshot.offline && format == OutputFormat::Text {
        eprintln!("Store unreachable; showing the regular schedule. Booking is unavailable.");
    }
    output::print(&CalendarView::new(view, &snapshot), format);
    Ok(())
}

#[cfg(test)]
#[path = "calendar_tests.rs"]
mod tests;
