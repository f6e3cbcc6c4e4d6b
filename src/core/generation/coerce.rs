//! Lenient mapping from extracted payloads to typed task results.
//!
//! Every result type first tries a strict `serde` decode. When the model
//! returned something slightly off-shape (a string where a list was
//! expected, a number where a string was expected, a missing field) the
//! decode falls back to [`LenientDecode::lenient`], which applies the field
//! rules in this module one field at a time.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use super::envelope::Payload;

/// Decode with a strict-then-lenient strategy and normalize the result.
pub trait LenientDecode: DeserializeOwned + Sized {
    /// Build the value field by field from a loosely-typed payload.
    fn lenient(payload: &Payload) -> Self;

    /// Post-processing applied to both decode paths.
    fn normalize(self) -> Self {
        self
    }
}

pub fn decode<T: LenientDecode>(payload: Payload) -> T {
    let value = match serde_json::from_value::<T>(Value::Object(payload.clone())) {
        Ok(value) => value,
        Err(err) => {
            warn!(
                target_type = std::any::type_name::<T>(),
                error = %err,
                "Strict decode failed, falling back to lenient coercion"
            );
            T::lenient(&payload)
        }
    };
    value.normalize()
}

/// Render any JSON value as trimmed text. `null` becomes empty.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

/// Coerce a value into a list of non-blank trimmed strings.
pub fn listify(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::String(s)) => {
            let item = s.trim();
            if item.is_empty() {
                Vec::new()
            } else {
                vec![item.to_string()]
            }
        }
        Some(Value::Array(items)) => items
            .iter()
            .map(stringify)
            .filter(|item| !item.is_empty())
            .collect(),
        _ => Vec::new(),
    }
}

/// Trim every item and drop the blank ones.
pub fn tidy_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Decode a lowercase enum tag, falling back to the type's default.
pub fn enum_or_default<T>(value: Option<&Value>) -> T
where
    T: DeserializeOwned + Default,
{
    value
        .and_then(Value::as_str)
        .map(|tag| Value::String(tag.trim().to_ascii_lowercase()))
        .and_then(|tag| serde_json::from_value(tag).ok())
        .unwrap_or_default()
}

pub fn string_field(payload: &Payload, key: &str) -> String {
    payload.get(key).map(stringify).unwrap_or_default()
}

pub fn list_field(payload: &Payload, key: &str) -> Vec<String> {
    listify(payload.get(key))
}

/// Interpret booleans, `"true"`/`"false"` strings and numbers.
pub fn coerce_bool(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|n| n != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// A non-negative integer given as a JSON number. Integral floats count.
pub fn non_negative_int(value: Option<&Value>) -> Option<u64> {
    let Value::Number(number) = value? else {
        return None;
    };
    number.as_u64().or_else(|| number.as_f64().and_then(integral))
}

/// Like [`non_negative_int`] but also accepts integral strings such as `"25"`.
pub fn integer_like(value: Option<&Value>) -> Option<u64> {
    match value? {
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed
                .parse::<u64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().and_then(integral))
        }
        other => non_negative_int(Some(other)),
    }
}

fn integral(n: f64) -> Option<u64> {
    (n >= 0.0 && n.fract() == 0.0 && n <= u64::MAX as f64).then_some(n as u64)
}

/// Collapse whitespace, keep at most `max_words` words and `max_chars`
/// characters, and strip trailing whitespace.
pub fn clamp_phrase(text: &str, max_words: usize, max_chars: usize) -> String {
    let collapsed = text
        .split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ");
    let truncated: String = collapsed.chars().take(max_chars).collect();
    truncated.trim_end().to_string()
}
