// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Booking commands: reserve a seat, look a booking up

use crate::error::KilnError;
use crate::output::{self, OutputFormat};
use crate::workspace::CliStudio;
use anyhow::Result;
use kiln_core::{Booking, BookingId, DateKey, RawBookingForm, Selection, SlotOrigin, TimeOfDay};
use kiln_engine::Outcome;
use serde::Serialize;
use std::fmt;

#[derive(clap::Args)]
pub struct BookArgs {
    /// Class date (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<DateKey>,

    /// Class start time (18:00 or "6:00 PM")
    #[arg(long)]
    pub time: Option<TimeOfDay>,

    /// Attendee's full name
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    /// beginner, some, intermediate or advanced
    #[arg(long)]
    pub experience: Option<String>,

    /// regular or workshop
    #[arg(long, default_value = "regular")]
    pub class_kind: String,

    #[arg(long)]
    pub notes: Option<String>,

    /// Who is making the booking, recorded for auditing
    #[arg(long, env = "KILN_ACTOR")]
    pub actor: Option<String>,
}

impl BookArgs {
    fn selection(&self) -> Selection {
        Selection {
            date: self.date,
            time: self.time,
            origin: SlotOrigin::Store,
        }
    }

    fn form(&self) -> RawBookingForm {
        RawBookingForm {
            class_kind: Some(self.class_kind.clone()),
            full_name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            experience: self.experience.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// Booking as shown to the operator
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct BookingView(pub Booking);

impl fmt::Display for BookingView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        writeln!(f, "Booking: {}", b.id)?;
        writeln!(f, "  Class: {} {}", b.date.display_long(), b.time.display_12h())?;
        writeln!(f, "  Kind: {}", b.class_kind)?;
        writeln!(f, "  Name: {}", b.attendee.full_name)?;
        writeln!(f, "  Email: {}", b.attendee.email)?;
        writeln!(f, "  Phone: {}", b.attendee.phone)?;
        writeln!(f, "  Experience: {}", b.attendee.experience)?;
        if let Some(notes) = &b.notes {
            writeln!(f, "  Notes: {}", notes)?;
        }
        if let Some(actor) = &b.actor {
            writeln!(f, "  Booked by: {}", actor)?;
        }
        write!(
            f,
            "  Status: {} ({})",
            b.status,
            b.created_at.format("%Y-%m-%d %H:%M UTC")
        )
    }
}

/// Submit the booking; anything short of a confirmation is an error
pub async fn submit(args: &BookArgs, studio: &CliStudio) -> Result<Booking> {
    let outcome = studio
        .submit(args.selection(), &args.form(), args.actor.clone())
        .await;
    tracing::info!(outcome = outcome.kind(), "booking attempt finished");

    match outcome {
        Outcome::Confirmed(booking) => Ok(booking),
        other => Err(KilnError::booking_failed(&other).into()),
    }
}

pub async fn book(args: BookArgs, studio: &CliStudio, format: OutputFormat) -> Result<()> {
    let booking = submit(&args, studio).await?;
    if format == OutputFormat::Text {
        println!("Booking confirmed: {}", booking.id);
        println!();
    }
    output::print(&BookingView(booking), format);
    Ok(())
}

pub async fn show(id: String, studio: &CliStudio, format: OutputFormat) -> Result<()> {
    let found = studio
        .find_booking(&BookingId::from(id.as_str()))
        .await
        .map_err(|e| KilnError::new("Cannot read bookings").with_source(e))?;
    match found {
        Some(booking) => {
            output::print(&BookingView(booking), format);
            Ok(())
        }
        None => Err(KilnError::booking_not_found(&id).into()),
    }
}

#[cfg(test)]
#[path = "book_tests.rs"]
mod tests;
