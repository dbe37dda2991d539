// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Socket server and connection handling.

use kiln_core::{DateKey, Selection, SlotOrigin, TimeOfDay};
use kiln_engine::{FetchMode, Outcome};
use tokio::net::UnixStream;
use tracing::{debug, error};

use crate::lifecycle::DaemonState;
use crate::protocol::{
    self, BookingRequest, DaemonStatus, Request, Response, SlotSummary, DEFAULT_TIMEOUT,
};

/// Handle a single client connection
pub async fn handle_connection(
    daemon: &mut DaemonState,
    stream: UnixStream,
) -> Result<(), ServerError> {
    // Split stream for reading/writing
    let (mut reader, mut writer) = stream.into_split();

    // Read request with timeout
    let request = match protocol::read_request(&mut reader, DEFAULT_TIMEOUT).await {
        Ok(req) => req,
        Err(protocol::ProtocolError::Timeout) => {
            error!("Request read timeout");
            return Err(ServerError::Timeout);
        }
        Err(protocol::ProtocolError::ConnectionClosed) => {
            debug!("Client disconnected before sending request");
            return Ok(());
        }
        Err(protocol::ProtocolError::Json(e)) => {
            // Malformed or unknown action; tell the client rather than hang up
            let response = Response::failure("Invalid action", e.to_string());
            protocol::write_response(&mut writer, &response, DEFAULT_TIMEOUT).await?;
            return Ok(());
        }
        Err(e) => {
            error!("Failed to read request: {}", e);
            return Err(ServerError::Protocol(e));
        }
    };

    debug!("Received request: {:?}", request);

    // Handle request
    let response = handle_request(daemon, request).await;

    debug!(success = response.success, "Sending response: {}", response.message);

    // Write response with timeout
    protocol::write_response(&mut writer, &response, DEFAULT_TIMEOUT)
        .await
        .map_err(ServerError::Protocol)?;

    Ok(())
}

/// Handle a single request and return a response
pub async fn handle_request(daemon: &mut DaemonState, request: Request) -> Response {
    match request {
        Request::Ping => Response::ok("pong"),

        Request::Shutdown => {
            daemon.shutdown_requested = true;
            Response::ok("Shutting down")
        }

        Request::Status => Response {
            status: Some(DaemonStatus {
                version: env!("CARGO_PKG_VERSION").to_string(),
                studio: daemon.studio.name().to_string(),
                backend: daemon.backend.to_string(),
                uptime_secs: daemon.start_time.elapsed().as_secs(),
                reconcile_pending: daemon.studio.reconcile_flag().is_raised(),
            }),
            ..Response::ok("Running")
        },

        Request::GetAvailability => get_availability(daemon).await,

        Request::SubmitBooking(booking) => submit_booking(daemon, booking).await,

        Request::Reconcile => match daemon.studio.reconcile().await {
            Ok(report) => {
                let message = if report.is_clean() {
                    "Seat counters consistent".to_string()
                } else {
                    format!("Corrected {} seat counters", report.corrections.len())
                };
                Response {
                    reconciled: Some(report),
                    ..Response::ok(message)
                }
            }
            Err(e) => Response::failure("Reconcile failed", e.to_string()),
        },
    }
}

async fn get_availability(daemon: &DaemonState) -> Response {
    match daemon.studio.availability(FetchMode::AllowOffline).await {
        Ok(snapshot) => {
            let slots = snapshot
                .slots
                .values()
                .filter(|slot| slot.times().next().is_some())
                .map(|slot| (slot.date.to_string(), SlotSummary::from(slot)))
                .collect();
            let message = if snapshot.offline {
                "Showing the regular schedule; booking is temporarily unavailable"
            } else {
                "Availability loaded"
            };
            Response {
                slots: Some(slots),
                offline: Some(snapshot.offline),
                ..Response::ok(message)
            }
        }
        Err(e) => Response::failure("Failed to load availability", e.to_string()),
    }
}

async fn submit_booking(daemon: &DaemonState, booking: BookingRequest) -> Response {
    let selection = match selection(&booking) {
        Ok(selection) => selection,
        Err(e) => return Response::failure("Please select a valid date and time", e),
    };

    let outcome = daemon
        .studio
        .submit(selection, &booking.form, booking.actor)
        .await;

    let mut response = match &outcome {
        Outcome::Confirmed(saved) => Response {
            booking_id: Some(saved.id.to_string()),
            ..Response::ok("Booking confirmed")
        },
        Outcome::Rejected(errors) => Response {
            errors: errors.clone(),
            ..Response::failure(outcome.message(), "validation failed")
        },
        Outcome::Unavailable(reason) => Response::failure(outcome.message(), reason.clone()),
        _ => Response::failure(outcome.message(), outcome.kind()),
    };
    response.outcome = Some(outcome.kind().to_string());
    response
}

fn selection(booking: &BookingRequest) -> Result<Selection, String> {
    let date = booking
        .date_key
        .as_deref()
        .map(str::parse::<DateKey>)
        .transpose()
        .map_err(|e| e.to_string())?;
    let time = booking
        .time
        .as_deref()
        .map(str::parse::<TimeOfDay>)
        .transpose()
        .map_err(|e| e.to_string())?;
    let origin = if booking.offline {
        SlotOrigin::Offline
    } else {
        SlotOrigin::Store
    };
    Ok(Selection { date, time, origin })
}

/// Server errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] protocol::ProtocolError),

    #[error("Request timeout")]
    Timeout,
}

#[cfg(test)]
#[path = "server_tests.rs"]
mod tests;
