// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Booking records and the raw form they are built from

use crate::date::{DateKey, TimeOfDay};
use crate::slot::{ClassKind, SlotOrigin};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Booking reference, e.g. `BSC-LTC6CQO0-0K3J9X2QA`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(pub String);

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for BookingId {
    fn from(s: String) -> Self {
        BookingId(s)
    }
}

impl From<&str> for BookingId {
    fn from(s: &str) -> Self {
        BookingId(s.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Beginner,
    Some,
    Intermediate,
    Advanced,
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExperienceLevel::Beginner => "beginner",
            ExperienceLevel::Some => "some",
            ExperienceLevel::Intermediate => "intermediate",
            ExperienceLevel::Advanced => "advanced",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ExperienceLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(ExperienceLevel::Beginner),
            "some" => Ok(ExperienceLevel::Some),
            "intermediate" => Ok(ExperienceLevel::Intermediate),
            "advanced" => Ok(ExperienceLevel::Advanced),
            other => Err(format!("unknown experience level '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Failed,
}

impl BookingStatus {
    /// Whether this booking holds a seat
    pub fn counts_against_capacity(&self) -> bool {
        !matches!(self, BookingStatus::Failed)
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "failed" => Ok(BookingStatus::Failed),
            other => Err(format!("unknown booking status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub experience: ExperienceLevel,
}

/// Form fields as submitted, before validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBookingForm {
    #[serde(default, alias = "classType")]
    pub class_kind: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, alias = "experienceLevel")]
    pub experience: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Validated, sanitized form fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingInput {
    pub class_kind: ClassKind,
    pub attendee: Attendee,
    pub notes: Option<String>,
}

/// The date and time a customer picked from the calendar
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub date: Option<DateKey>,
    pub time: Option<TimeOfDay>,
    /// Origin of the slot the selection was made from
    #[serde(default)]
    pub origin: SlotOrigin,
}

impl Selection {
    pub fn new(date: DateKey, time: TimeOfDay) -> Self {
        Self {
            date: Some(date),
            time: Some(time),
            origin: SlotOrigin::Store,
        }
    }

    pub fn from_origin(mut self, origin: SlotOrigin) -> Self {
        self.origin = origin;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub id: BookingId,
    pub date: DateKey,
    pub time: TimeOfDay,
    pub class_kind: ClassKind,
    pub attendee: Attendee,
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    /// Opaque identifier of whoever submitted the booking, for auditing
    #[serde(default)]
    pub actor: Option<String>,
}

impl Booking {
    pub fn confirmed(
        id: BookingId,
        date: DateKey,
        time: TimeOfDay,
        input: BookingInput,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            date,
            time,
            class_kind: input.class_kind,
            attendee: input.attendee,
            notes: input.notes,
            status: BookingStatus::Confirmed,
            created_at,
            actor: None,
        }
    }

    pub fn with_actor(mut self, actor: Option<String>) -> Self {
        self.actor = actor;
        self
    }
}
