//! Audio transcription API message types.
//!
//! API Reference: https://platform.openai.com/docs/api-reference/audio/createTranscription

use serde::{Deserialize, Serialize};

/// Verbose JSON transcription response. Only the fields the gateway keeps
/// are decoded.
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionResponse {
    /// The transcribed text.
    pub text: String,

    /// Word-level timestamps (when `timestamp_granularities[]=word`).
    #[serde(default)]
    pub words: Vec<WordTiming>,
}

/// A word with timing information.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WordTiming {
    /// The word text.
    pub word: String,

    /// Start time of the word in seconds.
    pub start: f64,

    /// End time of the word in seconds.
    pub end: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_verbose_response() {
        let json = r#"{
            "task": "transcribe",
            "language": "english",
            "duration": 1.2,
            "text": "Hello there",
            "words": [
                {"word": "Hello", "start": 0.0, "end": 0.4},
                {"word": "there", "start": 0.5, "end": 0.9}
            ]
        }"#;
        let response: TranscriptionResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text, "Hello there");
        assert_eq!(response.words.len(), 2);
        assert_eq!(response.words[1].word, "there");
    }

    #[test]
    fn test_words_are_optional() {
        let response: TranscriptionResponse = serde_json::from_str(r#"{"text": "Hi"}"#).unwrap();
        assert!(response.words.is_empty());
    }
}
