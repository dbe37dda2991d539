// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! kiln - studio class bookings from the command line
//!
//! Works directly on a data directory; stop kilnd first, since both take
//! the directory lock.

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod commands;
mod error;
mod output;
mod workspace;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{availability, book, calendar, store};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::error::KilnError;
use crate::output::OutputFormat;
use crate::workspace::DataDir;

#[derive(Parser)]
#[command(
    name = "kiln",
    version,
    about = "Kiln - class bookings for a pottery studio"
)]
struct Cli {
    /// Studio data directory
    #[arg(long, global = true, env = "KILN_DATA_DIR", default_value = ".kiln")]
    data_dir: PathBuf,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Shorthand for --format json
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add upcoming class dates from the recurring schedule
    Seed,
    /// List upcoming classes and open seats
    Availability(availability::AvailabilityArgs),
    /// Show a month grid with bookable days
    Calendar(calendar::CalendarArgs),
    /// Reserve a seat
    Book(book::BookArgs),
    /// Show a booking by reference
    Show {
        /// Booking reference, e.g. BSC-LTC6CQO0-0K3J9X2QA
        id: String,
    },
    /// Recompute seat counters from recorded bookings
    Reconcile,
}

impl Commands {
    /// Whether the store is repaired and seeded before the command runs;
    /// seed and reconcile report on their own pass instead
    fn recovers_first(&self) -> bool {
        !matches!(self, Commands::Seed | Commands::Reconcile)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<KilnError>() {
                Some(kiln) => eprint!("{}", kiln),
                None => eprintln!("error: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let format = if cli.json {
        OutputFormat::Json
    } else {
        cli.format
    };

    let dir = DataDir::lock(&cli.data_dir)?;
    let studio = dir.open_studio()?;
    if cli.command.recovers_first() {
        let report = studio.recover().await;
        tracing::debug!(
            expired = report.expired,
            seeded = report.seeded,
            "data directory recovered"
        );
    }

    let result = match cli.command {
        Commands::Seed => store::seed(&studio, format).await,
        Commands::Availability(args) => availability::handle(args, &studio, format).await,
        Commands::Calendar(args) => calendar::handle(args, &studio, format).await,
        Commands::Book(args) => book::book(args, &studio, format).await,
        Commands::Show { id } => book::show(id, &studio, format).await,
        Commands::Reconcile => store::reconcile(&studio, format).await,
    };

    // Deliver queued confirmations before the process exits
    let stats = studio.shutdown().await;
    tracing::debug!(
        delivered = stats.delivered,
        failed = stats.failed,
        "notification outbox drained"
    );
    result
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_env("KILN_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
