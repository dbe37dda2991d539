// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only JSONL log with per-entry checksums
//!
//! Each line is `{"seq":N,"checksum":CRC32,"op":{...}}`. Replay stops at the
//! first line that is truncated, unparseable or fails its checksum; opening
//! a log for writing cuts the file back to that point so new entries are
//! never hidden behind a corrupt tail.

use crate::error::StoreError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
struct WalEntry<T> {
    seq: u64,
    checksum: u32,
    op: T,
}

fn checksum<T: Serialize>(op: &T) -> Result<u32, StoreError> {
    let json = serde_json::to_string(op)?;
    Ok(crc32fast::hash(json.as_bytes()))
}

/// Valid entries of a log and the byte length they occupy
struct Scan<T> {
    ops: Vec<T>,
    last_seq: u64,
    valid_len: u64,
    corrupt: bool,
}

fn scan<T: Serialize + DeserializeOwned>(path: &Path) -> Result<Scan<T>, StoreError> {
    let mut scan = Scan {
        ops: Vec::new(),
        last_seq: 0,
        valid_len: 0,
        corrupt: false,
    };
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(scan),
        Err(e) => return Err(e.into()),
    };

    let mut reader = BufReader::new(file);
    let mut line = String::new();
    loop {
        line.clear();
        let read = reader.read_line(&mut line)?;
        if read == 0 {
            break;
        }
        if !line.ends_with('\n') {
            tracing::warn!(path = %path.display(), "log ends in a truncated entry");
            scan.corrupt = true;
            break;
        }
        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            scan.valid_len += read as u64;
            continue;
        }
        let entry: WalEntry<T> = match serde_json::from_str(trimmed) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unparseable log entry");
                scan.corrupt = true;
                break;
            }
        };
        if checksum(&entry.op)? != entry.checksum {
            tracing::warn!(path = %path.display(), seq = entry.seq, "log entry failed checksum");
            scan.corrupt = true;
            break;
        }
        scan.last_seq = entry.seq;
        scan.valid_len += read as u64;
        scan.ops.push(entry.op);
    }
    Ok(scan)
}

/// Durable append-only log of `T` operations
pub struct Wal<T> {
    path: PathBuf,
    file: File,
    sequence: u64,
    _op: PhantomData<fn(T)>,
}

impl<T: Serialize + DeserializeOwned> Wal<T> {
    /// Open or create a log, returning it with the operations already in it
    pub fn open(path: &Path) -> Result<(Self, Vec<T>), StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let scan = scan::<T>(path)?;

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        if scan.corrupt {
            tracing::warn!(
                path = %path.display(),
                kept = scan.ops.len(),
                "truncating log at first corrupt entry"
            );
            file.set_len(scan.valid_len)?;
            file.sync_all()?;
        }

        Ok((
            Self {
                path: path.to_path_buf(),
                file,
                sequence: scan.last_seq,
                _op: PhantomData,
            },
            scan.ops,
        ))
    }

    /// Append an operation and fsync before returning
    pub fn append(&mut self, op: &T) -> Result<u64, StoreError> {
        let seq = self.sequence + 1;
        let entry = WalEntry {
            seq,
            checksum: checksum(op)?,
            op,
        };
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');
        self.file.write_all(line.as_bytes())?;
        self.file.sync_all()?;
        self.sequence = seq;
        Ok(seq)
    }

    /// Sequence number of the last entry written
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every valid operation without opening for writing
    pub fn replay(path: &Path) -> Result<Vec<T>, StoreError> {
        Ok(scan::<T>(path)?.ops)
    }
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
