use serde::Serialize;
use std::fmt;

use crate::api::{ApiClient, ScanRequest};
use crate::error::ApiError;
use crate::models::{AttendanceRecord, Direction, VehicleSummary};

/// Longest code accepted from a QR frame
pub const MAX_CODE_LEN: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    InvalidCode,
    ExpiredRegistration,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    NetworkError,
    ServerError,
}

/// Outcome of one scan, always something the guard can be shown
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScanResult {
    Success {
        record: AttendanceRecord,
        resolved_vehicle: VehicleSummary,
        message: String,
    },
    Rejected {
        reason: RejectReason,
        message: String,
    },
    Failure {
        reason: FailureReason,
        message: String,
    },
}

impl ScanResult {
    pub fn result_type(&self) -> &'static str {
        match self {
            ScanResult::Success { .. } => "success",
            ScanResult::Rejected { .. } => "rejected",
            ScanResult::Failure { .. } => "failure",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ScanResult::Success { .. })
    }

    pub fn record(&self) -> Option<&AttendanceRecord> {
        match self {
            ScanResult::Success { record, .. } => Some(record),
            _ => None,
        }
    }

    /// Human-readable text for the operator
    pub fn display_message(&self) -> &str {
        match self {
            ScanResult::Success { message, .. }
            | ScanResult::Rejected { message, .. }
            | ScanResult::Failure { message, .. } => message,
        }
    }

    fn rejected(reason: RejectReason, message: impl Into<String>) -> Self {
        ScanResult::Rejected {
            reason,
            message: message.into(),
        }
    }

    fn failure(reason: FailureReason, message: impl Into<String>) -> Self {
        ScanResult::Failure {
            reason,
            message: message.into(),
        }
    }
}

impl fmt::Display for ScanResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanResult::Success {
                record,
                resolved_vehicle,
                message,
            } => write!(
                f,
                "{} recorded for {}: {}",
                record.direction,
                resolved_vehicle.label(),
                message
            ),
            ScanResult::Rejected { message, .. } => write!(f, "Rejected: {}", message),
            ScanResult::Failure { message, .. } => write!(f, "Failed: {}", message),
        }
    }
}

/// Trims a decoded QR payload and checks it can be submitted.
///
/// Returns the code to send, or `None` for empty, oversized or
/// control-character payloads.
pub fn normalize_code(raw: &str) -> Option<&str> {
    let code = raw.trim();
    if code.is_empty() || code.len() > MAX_CODE_LEN || code.chars().any(char::is_control) {
        return None;
    }
    Some(code)
}

/// Classifies the backend's message on an error envelope
pub fn classify_rejection(message: &str) -> RejectReason {
    let message = message.to_lowercase();
    if message.contains("expired") {
        RejectReason::ExpiredRegistration
    } else if ["invalid", "not found", "unknown code", "does not exist"]
        .iter()
        .any(|needle| message.contains(needle))
    {
        RejectReason::InvalidCode
    } else {
        RejectReason::Unknown
    }
}

/// Validates a scanned code locally, then records it with the Backend API.
///
/// Invalid codes never reach the network.
#[tracing::instrument(skip(client, code))]
pub async fn submit_scan(client: &ApiClient, code: &str, direction: Direction) -> ScanResult {
    let Some(code) = normalize_code(code) else {
        tracing::warn!(raw_len = code.len(), "Rejected malformed QR payload locally");
        return ScanResult::rejected(
            RejectReason::InvalidCode,
            "Invalid QR code. Please scan a vehicle pass.",
        );
    };

    let request = ScanRequest {
        code: code.to_string(),
        direction,
    };

    let envelope = match client.submit_scan(&request).await {
        Ok(envelope) => envelope,
        Err(e) => return failure_from_error(&e),
    };

    if envelope.is_success() {
        let message = envelope.message_or("Attendance recorded");
        return match envelope.data {
            Some(record) => {
                let resolved_vehicle = record.vehicle_summary();
                tracing::info!(
                    record_id = record.id,
                    plate_number = ?resolved_vehicle.plate_number,
                    "Scan recorded"
                );
                ScanResult::Success {
                    record,
                    resolved_vehicle,
                    message,
                }
            }
            None => {
                tracing::error!("Scan accepted but response carried no record");
                ScanResult::failure(
                    FailureReason::ServerError,
                    "Server accepted the scan but returned no record",
                )
            }
        };
    }

    let message = envelope.message_or("Scan was not accepted");
    let reason = classify_rejection(&message);
    tracing::info!(reason = ?reason, message = %message, "Scan rejected by backend");

    ScanResult::rejected(reason, message)
}

fn failure_from_error(error: &ApiError) -> ScanResult {
    if error.is_transport() {
        tracing::error!(error = %error, "Scan submission did not complete");
        let message = match error {
            ApiError::Http(e) if e.is_timeout() => "Request timed out. Please scan again.",
            _ => "Could not reach the server. Check the connection and scan again.",
        };
        return ScanResult::failure(FailureReason::NetworkError, message);
    }

    tracing::error!(error = %error, "Scan submission failed");
    let message = match error {
        ApiError::Unauthorized(_) => "Session is not authorized to record scans".to_string(),
        other => format!("Server error: {}", other),
    };
    ScanResult::failure(FailureReason::ServerError, message)
}
