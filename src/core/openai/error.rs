use thiserror::Error;

/// Incompleteness reason the Responses API reports when the output token
/// ceiling was hit before the model finished.
pub const TOKEN_BUDGET_REASON: &str = "max_output_tokens";

/// Failures talking to the OpenAI APIs.
///
/// Every variant is local to a single inbound call; nothing here is retried
/// except the shrink-retry in [`crate::core::generation::policy`].
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// No API key was configured for the gateway.
    #[error("OpenAI API key not configured. Set OPENAI_API_KEY environment variable.")]
    MissingApiKey,

    /// Network failure or timeout before a response arrived.
    #[error("Failed to connect to OpenAI API: {0}")]
    Transport(String),

    /// OpenAI answered with a non-success status. The body is kept verbatim.
    #[error("OpenAI API error: {body}")]
    Status { status: u16, body: String },

    /// Generation did not reach `completed`, even after the permitted retry.
    #[error("{}", describe_incomplete(.reason.as_deref()))]
    Incomplete { reason: Option<String> },

    /// A successful response did not carry a usable JSON payload.
    #[error("{0}")]
    MalformedPayload(String),

    /// The outbound request could not be assembled locally.
    #[error("Failed to build OpenAI request: {0}")]
    InvalidRequest(String),
}

impl UpstreamError {
    pub fn incomplete(reason: Option<&str>) -> Self {
        Self::Incomplete {
            reason: reason.map(str::to_string),
        }
    }

    /// True when the model stopped because it ran out of output tokens.
    pub fn is_token_budget_exhausted(&self) -> bool {
        matches!(self, Self::Incomplete { reason: Some(r) } if r == TOKEN_BUDGET_REASON)
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Transport(format!("request timed out ({err})"))
        } else {
            Self::Transport(err.to_string())
        }
    }
}

fn describe_incomplete(reason: Option<&str>) -> String {
    match reason {
        Some(TOKEN_BUDGET_REASON) => format!(
            "OpenAI response incomplete: {TOKEN_BUDGET_REASON}. \
             The model ran out of output tokens; try again with fewer or shorter items."
        ),
        Some(reason) => format!("OpenAI response incomplete: {reason}."),
        None => "OpenAI response incomplete.".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_message_names_reason() {
        let err = UpstreamError::incomplete(Some("content_filter"));
        assert_eq!(err.to_string(), "OpenAI response incomplete: content_filter.");
        assert!(!err.is_token_budget_exhausted());
    }

    #[test]
    fn test_incomplete_message_hints_on_token_budget() {
        let err = UpstreamError::incomplete(Some(TOKEN_BUDGET_REASON));
        let message = err.to_string();
        assert!(message.contains("max_output_tokens"));
        assert!(message.contains("ran out of output tokens"));
        assert!(err.is_token_budget_exhausted());
    }

    #[test]
    fn test_incomplete_message_without_reason() {
        let err = UpstreamError::incomplete(None);
        assert_eq!(err.to_string(), "OpenAI response incomplete.");
    }

    #[test]
    fn test_status_error_keeps_body() {
        let err = UpstreamError::Status {
            status: 429,
            body: r#"{"error":{"message":"slow down"}}"#.to_string(),
        };
        assert!(err.to_string().contains("slow down"));
    }
}
