// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kiln booking daemon (kilnd)
//!
//! Background process that owns a studio's data directory and answers
//! availability and booking requests.

use std::path::PathBuf;
use std::time::Duration;

use kiln_daemon::lifecycle::{self, Config, LifecycleError};
use kiln_daemon::server;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};

/// Data directory used when none is given
const DEFAULT_DATA_DIR: &str = ".kiln";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse arguments: `kilnd [DATA_DIR]`, falling back to $KILN_DATA_DIR
    let args: Vec<String> = std::env::args().collect();
    let data_dir = match args.get(1) {
        Some(dir) => PathBuf::from(dir),
        None => std::env::var_os("KILN_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
    };

    let config = Config::for_data_dir(&data_dir)?;

    // Write startup marker to log (before tracing setup, so operators can find it)
    write_startup_marker(&config)?;

    let log_guard = setup_logging(&config)?;

    info!("Starting kilnd for data directory: {}", config.data_dir.display());

    let mut daemon = match lifecycle::startup(&config).await {
        Ok(d) => d,
        Err(e) => {
            // Write error synchronously (tracing is non-blocking and may not flush in time)
            write_startup_error(&config, &e);
            error!("Failed to start daemon: {}", e);
            drop(log_guard);
            return Err(e.into());
        }
    };

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    let period = daemon.maintenance_interval.max(Duration::from_secs(1));
    let mut maintenance = tokio::time::interval(period);
    // The first tick completes immediately; startup already did a pass
    maintenance.tick().await;

    info!(
        "Daemon ready, listening on {}",
        config.socket_path.display()
    );

    // Signal ready for parent process (e.g., systemd, scripts waiting for startup)
    println!("READY");

    loop {
        tokio::select! {
            result = daemon.listener.accept() => {
                match result {
                    Ok((stream, _)) => {
                        if let Err(e) = server::handle_connection(&mut daemon, stream).await {
                            error!("Error handling connection: {}", e);
                        }
                    }
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                    }
                }
            }

            _ = maintenance.tick() => {
                let report = daemon.studio.maintain().await;
                if report.expired > 0 || report.seeded > 0 || report.reconciled.is_some() {
                    info!(
                        expired = report.expired,
                        seeded = report.seeded,
                        reconciled = report.reconciled.is_some(),
                        "maintenance pass"
                    );
                }
            }

            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down...");
                break;
            }

            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down...");
                break;
            }
        }

        if daemon.shutdown_requested {
            info!("Shutdown requested via IPC, shutting down...");
            break;
        }
    }

    daemon.shutdown().await?;
    info!("Daemon stopped");
    drop(log_guard);
    Ok(())
}

/// Startup marker prefix written to log before anything else.
/// Full format: "--- kilnd: starting (pid: 12345) ---"
pub const STARTUP_MARKER_PREFIX: &str = "--- kilnd: starting (pid: ";

fn write_startup_marker(config: &Config) -> Result<(), LifecycleError> {
    use std::io::Write;

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)?;
    writeln!(file, "{}{}) ---", STARTUP_MARKER_PREFIX, std::process::id())?;

    Ok(())
}

/// Write startup error synchronously to log file.
fn write_startup_error(config: &Config, error: &LifecycleError) {
    use std::io::Write;

    let Ok(mut file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
    else {
        return;
    };
    let _ = writeln!(file, "ERROR Failed to start daemon: {}", error);
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let file_appender = tracing_appender::rolling::never(&config.data_dir, lifecycle::LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
        .init();

    Ok(guard)
}
