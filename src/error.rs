use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid API URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Unauthorized ({0})")]
    Unauthorized(StatusCode),

    #[error("Backend API error: {status} - {message}")]
    Status { status: StatusCode, message: String },

    #[error("Backend rejected the request: {0}")]
    Envelope(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// True when the request never produced an HTTP response.
    ///
    /// Builder and redirect errors come from client setup, not the network.
    pub fn is_transport(&self) -> bool {
        match self {
            ApiError::Http(e) => {
                e.status().is_none() && !e.is_decode() && !e.is_builder() && !e.is_redirect()
            }
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
