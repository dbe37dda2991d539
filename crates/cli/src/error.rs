// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User-friendly error display with context and suggestions.
//!
//! Each error carries what went wrong, why it may have happened and how to
//! recover.

use kiln_engine::{ConflictReason, Outcome};
use std::fmt;
use std::path::Path;

/// Error with context and recovery suggestions for user-friendly display.
#[derive(Debug)]
pub struct KilnError {
    /// What went wrong
    pub message: String,
    /// Why it might have happened
    pub context: Vec<String>,
    /// How to fix it
    pub suggestions: Vec<String>,
    /// Original error if any
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl KilnError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Vec::new(),
            suggestions: Vec::new(),
            source: None,
        }
    }

    /// Add context about why this error might have happened.
    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    /// Add a suggestion for how to fix this error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Set the source error that caused this error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for KilnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;

        if let Some(source) = &self.source {
            writeln!(f, "  caused by: {}", source)?;
        }

        if !self.context.is_empty() {
            writeln!(f)?;
            for ctx in &self.context {
                writeln!(f, "  -> {}", ctx)?;
            }
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            writeln!(f, "suggestions:")?;
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for KilnError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Common error builders for typical failure scenarios.
impl KilnError {
    /// Another process holds the data directory lock.
    pub fn data_dir_locked(path: &Path) -> Self {
        KilnError::new(format!("Data directory '{}' is in use", path.display()))
            .with_context("Another kiln command or a running kilnd holds its lock")
            .with_suggestion("Wait for the other command to finish")
            .with_suggestion("Stop kilnd before running administrative commands")
    }

    /// The config file exists but cannot be used.
    pub fn invalid_config(path: &Path) -> Self {
        KilnError::new(format!("Invalid studio config '{}'", path.display()))
            .with_suggestion("Fix the file, or remove it to use the default schedule")
    }

    /// The store could not be opened or reached.
    pub fn store_unavailable(path: &Path) -> Self {
        KilnError::new("The booking store is unavailable")
            .with_context(format!("Data directory: {}", path.display()))
            .with_suggestion("Check the directory is readable and writable")
            .with_suggestion("View the regular schedule: kiln availability --offline")
    }

    pub fn booking_not_found(id: &str) -> Self {
        KilnError::new(format!("Booking '{}' not found", id))
            .with_context("Booking references are case-sensitive")
            .with_suggestion("Check the reference in the confirmation message")
    }

    /// A booking attempt that did not end in a confirmed booking.
    pub fn booking_failed(outcome: &Outcome) -> Self {
        let err = KilnError::new(outcome.message());
        match outcome {
            Outcome::Incomplete => {
                err.with_suggestion("Pass both --date YYYY-MM-DD and --time HH:MM")
            }
            Outcome::Rejected(errors) => errors
                .iter()
                .fold(err, |err, e| err.with_context(e.to_string())),
            Outcome::Conflict(ConflictReason::Full) => err
                .with_context("Seats are claimed in the order requests arrive")
                .with_suggestion("See what is still open: kiln availability"),
            Outcome::Conflict(ConflictReason::NotOffered) => err
                .with_suggestion("See the class dates and times: kiln availability")
                .with_suggestion("Pick a day in the month grid: kiln calendar"),
            Outcome::Unavailable(reason) => err
                .with_context(reason.clone())
                .with_suggestion("Try again in a moment"),
            Outcome::PersistenceFailed { compensated: true } => err
                .with_context("The seat was returned; nothing was booked")
                .with_suggestion("Try again in a moment"),
            Outcome::PersistenceFailed { compensated: false } => err
                .with_context("A seat may still be held without a booking")
                .with_suggestion("Repair seat counters: kiln reconcile"),
            Outcome::Confirmed(_) => err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::{Field, FieldError};

    #[test]
    fn test_error_display() {
        let err = KilnError::new("Something went wrong")
            .with_context("First context")
            .with_context("Second context")
            .with_suggestion("Try this")
            .with_suggestion("Or this");

        let output = format!("{}", err);
        assert!(output.contains("error: Something went wrong"));
        assert!(output.contains("-> First context"));
        assert!(output.contains("-> Second context"));
        assert!(output.contains("1. Try this"));
        assert!(output.contains("2. Or this"));
    }

    #[test]
    fn test_source_is_shown() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let output = KilnError::new("Cannot open").with_source(io).to_string();
        assert!(output.contains("caused by: denied"));
    }

    #[test]
    fn test_rejected_lists_every_field() {
        let outcome = Outcome::Rejected(vec![
            FieldError {
                field: Field::Email,
                message: "Please enter a valid email address".to_string(),
            },
            FieldError {
                field: Field::Phone,
                message: "Please enter a valid phone number".to_string(),
            },
        ]);

        let output = KilnError::booking_failed(&outcome).to_string();
        assert!(output.contains("error: Please correct: email, phone"));
        assert!(output.contains("-> email: Please enter a valid email address"));
        assert!(output.contains("-> phone: Please enter a valid phone number"));
    }

    #[test]
    fn test_uncompensated_failure_suggests_reconcile() {
        let outcome = Outcome::PersistenceFailed { compensated: false };
        let output = KilnError::booking_failed(&outcome).to_string();
        assert!(output.contains("kiln reconcile"));
    }

    #[test]
    fn test_not_offered_points_at_the_schedule() {
        let outcome = Outcome::Conflict(ConflictReason::NotOffered);
        let output = KilnError::booking_failed(&outcome).to_string();
        assert!(output.contains("error: No class is offered at that date and time"));
        assert!(output.contains("kiln availability"));
        assert!(!output.contains("filled up"));
    }

    #[test]
    fn test_locked_names_the_directory() {
        let output = KilnError::data_dir_locked(Path::new("/srv/kiln")).to_string();
        assert!(output.contains("'/srv/kiln' is in use"));
    }
}
