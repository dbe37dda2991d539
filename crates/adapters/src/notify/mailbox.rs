// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mailbox file adapter
//!
//! Appends each message as one JSON line to a spool file that an external
//! mail relay drains.

use super::{Notification, NotifyAdapter, NotifyError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Spool file name inside a data directory
pub const MAILBOX_FILE: &str = "outbox.jsonl";

#[derive(Clone)]
pub struct MailboxAdapter {
    path: PathBuf,
    // Serializes appends so lines never interleave
    write_lock: Arc<Mutex<()>>,
}

impl MailboxAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every message spooled so far
    pub async fn read_all(&self) -> Result<Vec<Notification>, NotifyError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).map_err(NotifyError::from))
            .collect()
    }
}

#[async_trait]
impl NotifyAdapter for MailboxAdapter {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let mut line = serde_json::to_string(notification)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "mailbox_tests.rs"]
mod tests;
