//! Error envelope shared by the OpenAI REST APIs.
//!
//! API Reference: https://platform.openai.com/docs/guides/error-codes

use serde::{Deserialize, Serialize};

/// OpenAI API error response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenAIErrorResponse {
    /// Error details.
    pub error: OpenAIError,
}

/// OpenAI API error details.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenAIError {
    /// Human-readable error message.
    pub message: String,

    /// Error type identifier.
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,

    /// Parameter that caused the error (if applicable).
    #[serde(default)]
    pub param: Option<String>,

    /// Error code (if applicable).
    #[serde(default)]
    pub code: Option<String>,
}

impl std::fmt::Display for OpenAIError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.error_type {
            Some(kind) => write!(f, "{} ({})", self.message, kind),
            None => write!(f, "{}", self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_envelope() {
        let body = r#"{"error":{"message":"Invalid schema","type":"invalid_request_error","param":"text.format","code":null}}"#;
        let parsed: OpenAIErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error.param.as_deref(), Some("text.format"));
        assert_eq!(parsed.error.to_string(), "Invalid schema (invalid_request_error)");
    }

    #[test]
    fn test_parse_error_without_type() {
        let parsed: OpenAIErrorResponse =
            serde_json::from_str(r#"{"error":{"message":"boom"}}"#).unwrap();
        assert_eq!(parsed.error.to_string(), "boom");
    }
}
