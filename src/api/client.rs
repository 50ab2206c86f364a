use reqwest::{Client, Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use crate::api::envelope::{ApiEnvelope, RawEnvelope};
use crate::config::Config;
use crate::error::{ApiError, Result};

/// Typed binding of the Backend API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    token: Option<Secret<String>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: normalize_base_url(&config.api_base_url)?,
            token: config.api_token.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves an endpoint path against the base URL, keeping any base path
    /// prefix such as `/api`.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Builds a request with the bearer token attached when one is configured
    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self
            .http
            .request(method, url)
            .header("Accept", "application/json");

        match &self.token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Sends a request and parses the `{status, message, data}` envelope.
    ///
    /// Error envelopes sent with a 4xx status are returned as `Ok` so callers
    /// can read the backend's message; a 4xx body is never a success, tagged
    /// or not. 401/403 and 5xx are always errors.
    pub(crate) async fn send_envelope<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<ApiEnvelope<T>> {
        let response = builder.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            tracing::warn!(status = %status, "Backend API refused credentials");
            return Err(ApiError::Unauthorized(status));
        }

        let body = response.text().await?;
        let parsed = serde_json::from_str::<RawEnvelope>(&body);

        if status.is_server_error() {
            tracing::error!(status = %status, body = %body, "Backend API server error");
            return Err(ApiError::Status {
                status,
                message: truncate(&body, 200),
            });
        }

        match parsed {
            Ok(raw) => raw.into_typed(status.is_success()),
            Err(e) if status.is_success() => {
                tracing::error!(error = %e, "Failed to parse Backend API response");
                Err(ApiError::Decode(e.to_string()))
            }
            Err(_) => {
                tracing::error!(status = %status, body = %body, "Backend API request failed");
                Err(ApiError::Status {
                    status,
                    message: truncate(&body, 200),
                })
            }
        }
    }
}

fn normalize_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}
