// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire protocol for the booking socket
//!
//! Each message is a 4-byte big-endian length followed by a JSON body.
//! Requests are tagged by `action` with their payload under `data`.

use std::collections::BTreeMap;
use std::time::Duration;

use kiln_core::{FieldError, RawBookingForm, Slot};
use kiln_storage::ReconcileReport;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Default timeout for reading or writing a message
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Largest message body accepted
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "camelCase")]
pub enum Request {
    GetAvailability,
    SubmitBooking(BookingRequest),
    Reconcile,
    Ping,
    Status,
    Shutdown,
}

/// Booking form plus the chosen slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    #[serde(default)]
    pub date_key: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    /// The slot was shown from the offline schedule
    #[serde(default)]
    pub offline: bool,
    /// Opaque caller identity recorded with the booking
    #[serde(default)]
    pub actor: Option<String>,
    #[serde(flatten)]
    pub form: RawBookingForm,
}

/// Availability of one date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotSummary {
    pub times: Vec<String>,
    pub max_capacity: u32,
    pub booked: u32,
    pub available: u32,
    /// Open seats per time
    pub remaining: BTreeMap<String, u32>,
    pub class_kind: String,
}

impl From<&Slot> for SlotSummary {
    fn from(slot: &Slot) -> Self {
        Self {
            times: slot.times().map(|t| t.to_string()).collect(),
            max_capacity: slot.max_capacity,
            booked: slot.booked(),
            available: slot.remaining(),
            remaining: slot
                .times()
                .map(|t| (t.to_string(), slot.remaining_at(t).unwrap_or(0)))
                .collect(),
            class_kind: slot.class_kind.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaemonStatus {
    pub version: String,
    pub studio: String,
    pub backend: String,
    pub uptime_secs: u64,
    pub reconcile_pending: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slots: Option<BTreeMap<String, SlotSummary>>,
    /// Slots came from the local schedule and cannot be booked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offline: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<String>,
    /// Machine-readable result of a booking attempt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reconciled: Option<ReconcileReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DaemonStatus>,
}

impl Response {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn failure(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// Protocol errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Timeout")]
    Timeout,
}

/// Serialize a message body (no length prefix)
pub fn encode<T: Serialize>(message: &T) -> Result<Vec<u8>, ProtocolError> {
    Ok(serde_json::to_vec(message)?)
}

pub fn decode<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Result<T, ProtocolError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Read one length-prefixed message
pub async fn read_message<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>, ProtocolError> {
    let mut len_buf = [0u8; 4];
    match reader.read_exact(&mut len_buf).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Err(ProtocolError::ConnectionClosed);
        }
        Err(e) => return Err(e.into()),
    }

    let len = u32::from_be_bytes(len_buf) as usize;
    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: len,
            max: MAX_MESSAGE_SIZE,
        });
    }

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).await?;
    Ok(buf)
}

/// Write one length-prefixed message
pub async fn write_message<W: AsyncWrite + Unpin>(
    writer: &mut W,
    data: &[u8],
) -> Result<(), ProtocolError> {
    if data.len() > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: data.len(),
            max: MAX_MESSAGE_SIZE,
        });
    }
    let len = u32::try_from(data.len()).map_err(|_| ProtocolError::MessageTooLarge {
        size: data.len(),
        max: MAX_MESSAGE_SIZE,
    })?;
    writer.write_all(&len.to_be_bytes()).await?;
    writer.write_all(data).await?;
    writer.flush().await?;
    Ok(())
}

pub async fn read_request<R: AsyncRead + Unpin>(
    reader: &mut R,
    timeout: Duration,
) -> Result<Request, ProtocolError> {
    let bytes = tokio::time::timeout(timeout, read_message(reader))
        .await
        .map_err(|_| ProtocolError::Timeout)??;
    decode(&bytes)
}

pub async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &Response,
    timeout: Duration,
) -> Result<(), ProtocolError> {
    let bytes = encode(response)?;
    tokio::time::timeout(timeout, write_message(writer, &bytes))
        .await
        .map_err(|_| ProtocolError::Timeout)?
}

/// Client side: send one request and wait for its response
pub async fn round_trip<S: AsyncRead + AsyncWrite + Unpin>(
    stream: &mut S,
    request: &Request,
    timeout: Duration,
) -> Result<Response, ProtocolError> {
    let bytes = encode(request)?;
    tokio::time::timeout(timeout, write_message(stream, &bytes))
        .await
        .map_err(|_| ProtocolError::Timeout)??;
    let reply = tokio::time::timeout(timeout, read_message(stream))
        .await
        .map_err(|_| ProtocolError::Timeout)??;
    decode(&reply)
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
