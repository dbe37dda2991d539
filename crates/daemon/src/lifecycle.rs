// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, shutdown, recovery.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use fs2::FileExt;
use kiln_adapters::{MailboxAdapter, TracedNotifyAdapter, MAILBOX_FILE};
use kiln_config::{load_config, ConfigError, StudioConfig, CONFIG_FILE};
use kiln_core::{BookingIdGen, SystemClock};
use kiln_engine::{open_store, EngineError, Studio, StudioDeps, StudioStore};
use kiln_storage::{StoreError, LOCK_FILE};
use thiserror::Error;
use tokio::net::UnixListener;
use tracing::{info, warn};

/// Studio with the concrete types the daemon runs
pub type DaemonStudio = Studio<StudioStore<SystemClock>, BookingIdGen, SystemClock>;

/// Socket file name inside the data directory
pub const SOCKET_FILE: &str = "kilnd.sock";
/// Log file name inside the data directory
pub const LOG_FILE: &str = "kilnd.log";

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the store, config, socket and log
    pub data_dir: PathBuf,
    /// Path to Unix socket
    pub socket_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    pub mailbox_path: PathBuf,
    pub config_path: PathBuf,
}

impl Config {
    /// Create config for a data directory, creating the directory if needed
    pub fn for_data_dir(data_dir: &Path) -> Result<Self, LifecycleError> {
        std::fs::create_dir_all(data_dir)
            .map_err(|e| LifecycleError::DataDir(data_dir.to_path_buf(), e))?;
        let data_dir = data_dir
            .canonicalize()
            .map_err(|e| LifecycleError::DataDir(data_dir.to_path_buf(), e))?;

        Ok(Self {
            socket_path: data_dir.join(SOCKET_FILE),
            lock_path: data_dir.join(LOCK_FILE),
            log_path: data_dir.join(LOG_FILE),
            mailbox_path: data_dir.join(MAILBOX_FILE),
            config_path: data_dir.join(CONFIG_FILE),
            data_dir,
        })
    }
}

/// Daemon state during operation
pub struct DaemonState {
    /// Configuration
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    /// Unix socket listener
    pub listener: UnixListener,
    pub studio: DaemonStudio,
    pub backend: &'static str,
    /// How often store upkeep runs
    pub maintenance_interval: Duration,
    /// When daemon started
    pub start_time: Instant,
    /// Shutdown requested flag
    pub shutdown_requested: bool,
}

impl DaemonState {
    /// Shutdown the daemon gracefully
    pub async fn shutdown(self) -> Result<(), LifecycleError> {
        info!("Shutting down daemon...");

        // 1. Drain notifications still queued
        let stats = self.studio.shutdown().await;
        info!(
            delivered = stats.delivered,
            failed = stats.failed,
            "notification outbox drained"
        );

        // 2. Remove socket file
        if self.config.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.socket_path) {
                warn!("Failed to remove socket file: {}", e);
            }
        }

        // 3. Lock is released automatically when self.lock_file is dropped

        info!("Daemon shutdown complete");
        Ok(())
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Data directory {0} is not usable: {1}")]
    DataDir(PathBuf, std::io::Error),

    #[error("Failed to acquire lock: data directory in use by another kiln process?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind socket at {0}: {1}")]
    BindFailed(PathBuf, std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the daemon
pub async fn startup(config: &Config) -> Result<DaemonState, LifecycleError> {
    match startup_inner(config).await {
        Ok(state) => Ok(state),
        // Another process owns the directory; its socket is not ours to remove
        Err(e @ LifecycleError::LockFailed(_)) => Err(e),
        Err(e) => {
            // Clean up any resources created before failure
            cleanup_on_failure(config);
            Err(e)
        }
    }
}

/// Inner startup logic - cleanup_on_failure called if this fails
async fn startup_inner(config: &Config) -> Result<DaemonState, LifecycleError> {
    // 1. Acquire lock file FIRST - prevents two processes sharing a store
    let lock_file = std::fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(LifecycleError::LockFailed)?;

    // Write PID to lock file
    use std::io::Write;
    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file;

    // 2. Load config BEFORE binding socket (fail fast, don't accept connections if invalid)
    let studio_config = load_config(&config.config_path)?;

    // 3. Open the store and build the studio
    let store = open_store(&studio_config, &config.data_dir, SystemClock)?;
    let backend = store.inner().backend_name();
    let studio = build_studio(&studio_config, config, store)?;

    // 4. Recover from anything a previous run left behind
    recover(&studio).await;

    // 5. Remove stale socket and bind (LAST - only after all validation passes)
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let listener = UnixListener::bind(&config.socket_path)
        .map_err(|e| LifecycleError::BindFailed(config.socket_path.clone(), e))?;

    info!(
        studio = studio.name(),
        backend,
        "Daemon started for data directory: {}",
        config.data_dir.display()
    );

    Ok(DaemonState {
        config: config.clone(),
        lock_file,
        listener,
        studio,
        backend,
        maintenance_interval: studio_config.store.maintenance_interval,
        start_time: Instant::now(),
        shutdown_requested: false,
    })
}

fn build_studio(
    studio_config: &StudioConfig,
    config: &Config,
    store: StudioStore<SystemClock>,
) -> Result<DaemonStudio, EngineError> {
    let deps = StudioDeps {
        store,
        notify: TracedNotifyAdapter::new(MailboxAdapter::new(&config.mailbox_path)),
        ids: BookingIdGen::new(studio_config.studio.booking_prefix.clone()),
    };
    Studio::new(studio_config, deps, SystemClock)
}

/// Repair seat counters and extend the horizon
async fn recover(studio: &DaemonStudio) {
    let report = studio.recover().await;
    if let Some(reconciled) = report.reconciled.as_ref().filter(|r| r.is_clean()) {
        info!(slots = reconciled.slots_checked, "seat counters consistent");
    }
    if report.expired > 0 {
        info!(expired = report.expired, "released stale claims");
    }
    if report.seeded > 0 {
        info!(inserted = report.seeded, "seeded upcoming classes");
    }
}

/// Clean up resources on startup failure
fn cleanup_on_failure(config: &Config) {
    // Remove socket if we created it
    if config.socket_path.exists() {
        let _ = std::fs::remove_file(&config.socket_path);
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
