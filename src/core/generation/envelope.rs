//! Defensive reading of Responses API envelopes.
//!
//! The provider may return the structured payload in several places:
//! a `json` object on a content block, a `text` block holding serialized
//! JSON, or a flattened `output_text` string. Extraction tries them in that
//! order and accepts only JSON objects.

use serde_json::{Map, Value};
use tracing::debug;

/// The task-specific JSON object embedded in an envelope.
pub type Payload = Map<String, Value>;

/// Whether the provider finished generating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionStatus {
    Completed,
    /// Anything other than `completed`. The reason comes from
    /// `incomplete_details.reason` when present.
    Incomplete { reason: Option<String> },
}

impl CompletionStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Raw decoded body returned by the Responses API.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope(Value);

impl ResponseEnvelope {
    pub fn new(raw: Value) -> Self {
        Self(raw)
    }

    pub fn status(&self) -> CompletionStatus {
        match self.0.get("status").and_then(Value::as_str) {
            Some("completed") => CompletionStatus::Completed,
            _ => CompletionStatus::Incomplete {
                reason: self
                    .0
                    .get("incomplete_details")
                    .and_then(|details| details.get("reason"))
                    .and_then(Value::as_str)
                    .map(str::to_string),
            },
        }
    }

    /// Locate the first JSON object payload, or `None` when nothing parses.
    pub fn extract_payload(&self) -> Option<Payload> {
        if let Some(payload) = self.scan_output() {
            return Some(payload);
        }

        let flattened = self.0.get("output_text").and_then(Value::as_str)?;
        let payload = parse_object(flattened);
        if payload.is_some() {
            debug!("Payload recovered from output_text");
        }
        payload
    }

    fn scan_output(&self) -> Option<Payload> {
        let items = self.0.get("output")?.as_array()?;
        for item in items {
            let Some(blocks) = item.get("content").and_then(Value::as_array) else {
                continue;
            };
            for block in blocks {
                if let Some(Value::Object(json)) = block.get("json") {
                    return Some(json.clone());
                }
                if let Some(text) = block.get("text").and_then(Value::as_str) {
                    match parse_object(text) {
                        Some(parsed) if !parsed.is_empty() => return Some(parsed),
                        _ => debug!("Skipping content block without a JSON object"),
                    }
                }
            }
        }
        None
    }
}

fn parse_object(text: &str) -> Option<Payload> {
    match serde_json::from_str(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}
