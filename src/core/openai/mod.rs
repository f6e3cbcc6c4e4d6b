//! Shared HTTP plumbing for the OpenAI REST APIs.
//!
//! One [`OpenAIClient`] is built at startup and shared by every endpoint:
//! the Responses API (structured generation), the Realtime sessions API
//! (ephemeral tokens) and the Audio API (transcription). The underlying
//! `reqwest::Client` is reused for connection pooling; each call passes its
//! own timeout.

mod error;
pub mod messages;

pub use error::{TOKEN_BUDGET_REASON, UpstreamError};

use std::fmt;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, multipart::Form};
use serde_json::Value;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use messages::OpenAIErrorResponse;

/// Default OpenAI API base URL
pub const OPENAI_API_BASE_URL: &str = "https://api.openai.com/v1";

/// Connect timeout applied to every outbound call
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Thin authenticated client for the OpenAI REST endpoints.
pub struct OpenAIClient {
    http: Client,
    base_url: String,
    api_key: Option<Zeroizing<String>>,
}

impl fmt::Debug for OpenAIClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAIClient")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl OpenAIClient {
    /// Create a client for `base_url`.
    ///
    /// A missing or blank key is accepted here; calls fail with
    /// [`UpstreamError::MissingApiKey`] until one is configured.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
    ) -> Result<Self, UpstreamError> {
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .build()
            .map_err(|e| {
                UpstreamError::InvalidRequest(format!("Failed to create HTTP client: {e}"))
            })?;

        let api_key = api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .map(Zeroizing::new);

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether an API key is available.
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Fail fast with a configuration error when no key is set.
    pub fn ensure_configured(&self) -> Result<(), UpstreamError> {
        self.api_key().map(|_| ())
    }

    fn api_key(&self) -> Result<&str, UpstreamError> {
        self.api_key
            .as_ref()
            .map(|key| key.as_str())
            .ok_or(UpstreamError::MissingApiKey)
    }

    /// Absolute URL for an API path such as `responses`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn post(&self, path: &str, timeout: Duration) -> Result<RequestBuilder, UpstreamError> {
        let api_key = self.api_key()?;
        Ok(self
            .http
            .post(self.endpoint(path))
            .bearer_auth(api_key)
            .timeout(timeout))
    }

    /// POST a JSON body and decode the JSON response.
    pub async fn post_json(
        &self,
        path: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<Value, UpstreamError> {
        let request = self.post(path, timeout)?.json(body);
        debug!(path, timeout_secs = timeout.as_secs(), "Sending OpenAI JSON request");
        Self::send(request, path).await
    }

    /// POST a multipart form and decode the JSON response.
    pub async fn post_multipart(
        &self,
        path: &str,
        form: Form,
        timeout: Duration,
    ) -> Result<Value, UpstreamError> {
        let request = self.post(path, timeout)?.multipart(form);
        debug!(path, timeout_secs = timeout.as_secs(), "Sending OpenAI multipart request");
        Self::send(request, path).await
    }

    async fn send(request: RequestBuilder, path: &str) -> Result<Value, UpstreamError> {
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            match serde_json::from_str::<OpenAIErrorResponse>(&text) {
                Ok(parsed) => warn!(
                    path,
                    status = status.as_u16(),
                    "OpenAI API error: {}",
                    parsed.error
                ),
                Err(_) => warn!(
                    path,
                    status = status.as_u16(),
                    "OpenAI API error with unstructured body"
                ),
            }
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            UpstreamError::MalformedPayload(format!(
                "Failed to parse OpenAI response from {path}: {e}"
            ))
        })
    }
}
