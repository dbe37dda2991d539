// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Messages built for a confirmed booking

use kiln_core::{Booking, BookingId};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Sent to the attendee
    Confirmation,
    /// Sent to the studio inbox
    StudioAlert,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::Confirmation => write!(f, "confirmation"),
            NotificationKind::StudioAlert => write!(f, "studio_alert"),
        }
    }
}

/// Studio details quoted in outgoing messages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudioContact {
    pub name: String,
    pub address: Option<String>,
    pub inbox: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub booking_id: BookingId,
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

const REMINDERS: [&str; 4] = [
    "Payment is due at the beginning of class",
    "Wear clothes you don't mind getting dirty",
    "Closed-toe shoes recommended",
    "All tools and materials provided",
];

impl Notification {
    /// Confirmation for the attendee
    pub fn confirmation(booking: &Booking, studio: &StudioContact) -> Self {
        let date = booking.date.display_long();
        let mut body = format!(
            "Booking Confirmed!\n{}\n\n\
             Class Details\n\
             Date: {date}\n\
             Time: {}\n\
             Class Type: {}\n\
             Booking ID: {}\n\n\
             Important Reminders\n",
            studio.name,
            booking.time.display_12h(),
            booking.class_kind,
            booking.id,
        );
        for reminder in REMINDERS {
            body.push_str("- ");
            body.push_str(reminder);
            body.push('\n');
        }
        if let Some(address) = &studio.address {
            body.push_str("\nStudio Location\n");
            body.push_str(address);
            body.push('\n');
        }

        Self {
            kind: NotificationKind::Confirmation,
            booking_id: booking.id.clone(),
            recipient: booking.attendee.email.clone(),
            subject: format!("Pottery Class Booking Confirmation - {date}"),
            body,
        }
    }

    /// Alert for the studio inbox; `None` when the studio has no inbox
    pub fn studio_alert(booking: &Booking, studio: &StudioContact) -> Option<Self> {
        let inbox = studio.inbox.as_ref()?;
        let a = &booking.attendee;
        let date = booking.date.display_long();
        let body = format!(
            "New class booking received:\n\n\
             Booking ID: {}\n\
             Date: {date}\n\
             Time: {}\n\
             Class Type: {}\n\n\
             Student Information:\n\
             Name: {}\n\
             Email: {}\n\
             Phone: {}\n\
             Experience: {}\n\n\
             Special Notes:\n{}\n",
            booking.id,
            booking.time.display_12h(),
            booking.class_kind,
            a.full_name,
            a.email,
            a.phone,
            a.experience,
            booking.notes.as_deref().unwrap_or("None"),
        );

        Some(Self {
            kind: NotificationKind::StudioAlert,
            booking_id: booking.id.clone(),
            recipient: inbox.clone(),
            subject: format!("New Booking: {} - {date}", a.full_name),
            body,
        })
    }

    /// Every message a confirmed booking produces
    pub fn for_booking(booking: &Booking, studio: &StudioContact) -> Vec<Self> {
        let mut messages = vec![Self::confirmation(booking, studio)];
        messages.extend(Self::studio_alert(booking, studio));
        messages
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
