use reqwest::Method;
use serde::Serialize;

use crate::api::client::ApiClient;
use crate::api::envelope::ApiEnvelope;
use crate::error::Result;
use crate::models::{AttendanceRecord, Direction};

/// Body of `POST /scan`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanRequest {
    pub code: String,
    pub direction: Direction,
}

impl ApiClient {
    /// Submits one scan. The envelope is returned as-is so the caller can
    /// classify `status: error` responses.
    #[tracing::instrument(skip(self, request), fields(direction = %request.direction))]
    pub async fn submit_scan(
        &self,
        request: &ScanRequest,
    ) -> Result<ApiEnvelope<AttendanceRecord>> {
        let url = self.endpoint("/scan")?;

        tracing::debug!(code_len = request.code.len(), "Submitting scan");

        let envelope = self
            .send_envelope(self.request(Method::POST, url).json(request))
            .await?;

        tracing::debug!(success = envelope.is_success(), "Scan submission answered");

        Ok(envelope)
    }
}
