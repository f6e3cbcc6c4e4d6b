use axum::{
    Json,
    extract::rejection::JsonRejection,
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::core::openai::UpstreamError;
use crate::core::tasks::InvalidTaskInput;
use crate::core::transcription::TranscriptionError;

/// Errors returned by HTTP handlers.
///
/// Each variant maps to one failure category and status code so the client
/// can tell a bad request apart from an upstream contract violation.
#[derive(Debug, Error)]
pub enum AppError {
    /// A required credential or setting is missing.
    #[error("{0}")]
    Configuration(String),

    /// Caller-supplied input is missing or malformed.
    #[error("{0}")]
    InvalidInput(String),

    /// The requested resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Failure talking to OpenAI.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// Local failure unrelated to the caller or the upstream.
    #[error("{0}")]
    Internal(String),
}

/// Result type for handlers.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Stable machine-readable category for the error body.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::InvalidInput(_) => "invalid_input",
            Self::NotFound(_) => "not_found",
            Self::Internal(_) => "internal",
            Self::Upstream(err) => match err {
                UpstreamError::MissingApiKey => "configuration",
                UpstreamError::Transport(_) => "upstream_unavailable",
                UpstreamError::Status { .. } => "upstream_error",
                UpstreamError::Incomplete { .. } => "upstream_incomplete",
                UpstreamError::MalformedPayload(_) => "payload_extraction",
                UpstreamError::InvalidRequest(_) => "internal",
            },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Configuration(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Upstream(err) => match err {
                UpstreamError::MissingApiKey | UpstreamError::InvalidRequest(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
                UpstreamError::Transport(_) => StatusCode::SERVICE_UNAVAILABLE,
                UpstreamError::Status { status, .. } => {
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
                }
                UpstreamError::Incomplete { .. } | UpstreamError::MalformedPayload(_) => {
                    StatusCode::BAD_GATEWAY
                }
            },
        }
    }
}

impl From<InvalidTaskInput> for AppError {
    fn from(err: InvalidTaskInput) -> Self {
        Self::InvalidInput(err.0)
    }
}

impl From<TranscriptionError> for AppError {
    fn from(err: TranscriptionError) -> Self {
        match err {
            TranscriptionError::Io(e) => {
                Self::Internal(format!("Failed to read session audio: {e}"))
            }
            TranscriptionError::Upstream(e) => Self::Upstream(e),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidInput(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::InvalidInput(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        Self::InvalidInput(err.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(category = self.category(), status = %status, "{}", self);
        } else {
            tracing::info!(category = self.category(), status = %status, "{}", self);
        }

        (
            status,
            Json(json!({
                "error": self.category(),
                "detail": self.to_string(),
            })),
        )
            .into_response()
    }
}
