use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::ApiError;

/// The `status` tag every Backend API response carries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    /// Listing endpoints omit the tag; on a 2xx response a missing tag
    /// counts as success.
    #[default]
    Success,
    #[serde(other)]
    Error,
}

/// `{ status, message, data }` wrapper, validated at the API boundary
#[derive(Debug, Clone, PartialEq)]
pub struct ApiEnvelope<T> {
    pub status: EnvelopeStatus,
    pub message: Option<String>,
    pub data: Option<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawEnvelope {
    #[serde(default)]
    status: Option<EnvelopeStatus>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<JsonValue>,
}

impl RawEnvelope {
    /// Types the payload. On error envelopes a payload that does not match
    /// `T` is dropped instead of failing the whole response.
    ///
    /// A response outside 2xx is always an error envelope, whatever its tag.
    pub(crate) fn into_typed<T: DeserializeOwned>(
        self,
        http_success: bool,
    ) -> Result<ApiEnvelope<T>, ApiError> {
        let status = match self.status {
            Some(status) if http_success => status,
            None if http_success => EnvelopeStatus::Success,
            _ => EnvelopeStatus::Error,
        };

        let data = match (status, self.data) {
            (_, None) | (_, Some(JsonValue::Null)) => None,
            (EnvelopeStatus::Success, Some(value)) => Some(
                serde_json::from_value(value)
                    .map_err(|e| ApiError::Decode(format!("Invalid response data: {}", e)))?,
            ),
            (EnvelopeStatus::Error, Some(value)) => serde_json::from_value(value).ok(),
        };

        Ok(ApiEnvelope {
            status,
            message: self.message,
            data,
        })
    }
}

impl<T> ApiEnvelope<T> {
    pub fn is_success(&self) -> bool {
        self.status == EnvelopeStatus::Success
    }

    /// Message to show the user, falling back to a generic one
    pub fn message_or(&self, fallback: &str) -> String {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(fallback)
            .to_string()
    }

    pub fn into_data(self) -> Result<T, ApiError> {
        match self.status {
            EnvelopeStatus::Success => self
                .data
                .ok_or_else(|| ApiError::Decode("Response has no data".to_string())),
            EnvelopeStatus::Error => Err(ApiError::Envelope(self.message_or("Request failed"))),
        }
    }
}
