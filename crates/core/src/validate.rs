// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Booking form validation
//!
//! [`BookingValidator::validate`] checks every rule and returns the full
//! list of violations, so a form can show all of them at once. It never
//! touches a store.

use crate::booking::{Attendee, BookingInput, ExperienceLevel, RawBookingForm};
use crate::slot::ClassKind;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Australian landline or mobile number, after whitespace is removed
pub const DEFAULT_PHONE_PATTERN: &str = r"^(\+61|0)[2-9]\d{8}$";

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 50;
pub const DEFAULT_MAX_NOTES_CHARS: usize = 500;

// Script blocks, including their contents, across lines
#[allow(clippy::expect_used)]
static SCRIPT_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b.*?</script\s*>").expect("constant regex pattern is valid")
});

#[allow(clippy::expect_used)]
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("constant regex pattern is valid"));

#[allow(clippy::expect_used)]
static DEFAULT_PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_PHONE_PATTERN).expect("constant regex pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    ClassKind,
    FullName,
    Email,
    Phone,
    Experience,
    Notes,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Field::ClassKind => "classKind",
            Field::FullName => "fullName",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Experience => "experience",
            Field::Notes => "notes",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: Field,
    pub message: String,
}

impl FieldError {
    fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Strip `<script>` blocks and angle brackets, then trim
pub fn sanitize(input: &str) -> String {
    let without_scripts = SCRIPT_BLOCK.replace_all(input, "");
    without_scripts
        .chars()
        .filter(|c| *c != '<' && *c != '>')
        .collect::<String>()
        .trim()
        .to_string()
}

#[derive(Debug, Clone)]
pub struct BookingValidator {
    phone: Regex,
    max_notes_chars: usize,
}

impl BookingValidator {
    /// Validator using a custom regional phone pattern
    pub fn new(phone_pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            phone: Regex::new(phone_pattern)?,
            max_notes_chars: DEFAULT_MAX_NOTES_CHARS,
        })
    }

    pub fn with_max_notes_chars(mut self, max: usize) -> Self {
        self.max_notes_chars = max;
        self
    }

    pub fn validate(&self, raw: &RawBookingForm) -> Result<BookingInput, Vec<FieldError>> {
        let mut errors = Vec::new();

        let class_kind = required(&raw.class_kind, Field::ClassKind, &mut errors).and_then(|v| {
            v.parse::<ClassKind>()
                .map_err(|_| errors.push(FieldError::new(Field::ClassKind, "unknown class type")))
                .ok()
        });

        let full_name = required(&raw.full_name, Field::FullName, &mut errors)
            .map(sanitize)
            .and_then(|name| {
                let len = name.chars().count();
                if (NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len) {
                    Some(name)
                } else {
                    errors.push(FieldError::new(
                        Field::FullName,
                        format!("name must be {NAME_MIN_CHARS}-{NAME_MAX_CHARS} characters"),
                    ));
                    None
                }
            });

        let email = required(&raw.email, Field::Email, &mut errors).and_then(|email| {
            let email = email.trim().to_string();
            if EMAIL.is_match(&email) {
                Some(email)
            } else {
                errors.push(FieldError::new(Field::Email, "enter a valid email address"));
                None
            }
        });

        let phone = required(&raw.phone, Field::Phone, &mut errors).and_then(|phone| {
            let compact: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
            if self.phone.is_match(&compact) {
                Some(compact)
            } else {
                errors.push(FieldError::new(Field::Phone, "enter a valid phone number"));
                None
            }
        });

        let experience = required(&raw.experience, Field::Experience, &mut errors).and_then(|v| {
            v.parse::<ExperienceLevel>()
                .map_err(|_| {
                    errors.push(FieldError::new(Field::Experience, "unknown experience level"))
                })
                .ok()
        });

        let notes = raw
            .notes
            .as_deref()
            .map(sanitize)
            .filter(|n| !n.is_empty());
        if let Some(n) = &notes {
            if n.chars().count() > self.max_notes_chars {
                errors.push(FieldError::new(
                    Field::Notes,
                    format!("notes must be at most {} characters", self.max_notes_chars),
                ));
            }
        }

        match (class_kind, full_name, email, phone, experience) {
            (Some(class_kind), Some(full_name), Some(email), Some(phone), Some(experience))
                if errors.is_empty() =>
            {
                Ok(BookingInput {
                    class_kind,
                    attendee: Attendee {
                        full_name,
                        email,
                        phone,
                        experience,
                    },
                    notes,
                })
            }
            _ => Err(errors),
        }
    }
}

impl Default for BookingValidator {
    fn default() -> Self {
        Self {
            phone: DEFAULT_PHONE.clone(),
            max_notes_chars: DEFAULT_MAX_NOTES_CHARS,
        }
    }
}

fn required<'a>(
    value: &'a Option<String>,
    field: Field,
    errors: &mut Vec<FieldError>,
) -> Option<&'a str> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            errors.push(FieldError::new(field, "required"));
            None
        }
    }
}

#[cfg(test)]
#[path = "validate_tests.rs"]
mod tests;
