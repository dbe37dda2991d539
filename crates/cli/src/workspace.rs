// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Data directory access for one CLI invocation

use crate::error::KilnError;
use anyhow::Result;
use fs2::FileExt;
use kiln_adapters::{MailboxAdapter, TracedNotifyAdapter, MAILBOX_FILE};
use kiln_config::{load_config, StudioConfig, CONFIG_FILE};
use kiln_core::{BookingIdGen, SystemClock};
use kiln_engine::{open_store, Studio, StudioDeps, StudioStore};
use kiln_storage::LOCK_FILE;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Studio with the concrete types the CLI runs
pub type CliStudio = Studio<StudioStore<SystemClock>, BookingIdGen, SystemClock>;

/// A data directory locked for the lifetime of this value
pub struct DataDir {
    path: PathBuf,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
}

impl DataDir {
    /// Create `path` if needed and take its lock without waiting
    pub fn lock(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path).map_err(|e| {
            KilnError::new(format!("Cannot create data directory '{}'", path.display()))
                .with_source(e)
        })?;

        let lock_file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path.join(LOCK_FILE))?;
        lock_file
            .try_lock_exclusive()
            .map_err(|e| KilnError::data_dir_locked(path).with_source(e))?;

        tracing::debug!(path = %path.display(), "data directory locked");
        Ok(Self {
            path: path.to_path_buf(),
            lock_file,
        })
    }

    pub fn config(&self) -> Result<StudioConfig> {
        let path = self.path.join(CONFIG_FILE);
        let config = load_config(&path)
            .map_err(|e| KilnError::invalid_config(&path).with_source(e))?;
        Ok(config)
    }

    /// Open the store and assemble the studio; must be called inside a runtime
    pub fn open_studio(&self) -> Result<CliStudio> {
        let config = self.config()?;
        let store = open_store(&config, &self.path, SystemClock)
            .map_err(|e| KilnError::store_unavailable(&self.path).with_source(e))?;
        let deps = StudioDeps {
            store,
            notify: TracedNotifyAdapter::new(MailboxAdapter::new(self.path.join(MAILBOX_FILE))),
            ids: BookingIdGen::new(config.studio.booking_prefix.clone()),
        };
        let studio = Studio::new(&config, deps, SystemClock)
            .map_err(|e| KilnError::invalid_config(&self.path.join(CONFIG_FILE)).with_source(e))?;
        Ok(studio)
    }
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
