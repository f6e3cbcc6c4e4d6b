//! OpenAI Realtime sessions REST message types.
//!
//! `POST /realtime/sessions` creates a session configuration server-side and
//! returns a short-lived client secret the browser uses to open its own
//! WebRTC connection.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Session creation request.
#[derive(Debug, Clone, Serialize)]
pub struct RealtimeSessionRequest {
    /// Realtime model id
    pub model: String,

    /// Voice for audio output
    pub voice: String,

    /// System instructions for the assistant
    pub instructions: String,

    /// Tool definitions
    pub tools: Vec<Value>,

    /// Input audio transcription configuration
    pub input_audio_transcription: InputAudioTranscription,

    /// Turn detection configuration
    pub turn_detection: TurnDetection,
}

/// Input audio transcription configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputAudioTranscription {
    /// Transcription model (e.g., "gpt-4o-mini-transcribe")
    pub model: String,
}

/// Turn detection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TurnDetection {
    /// Server-side VAD
    #[serde(rename = "server_vad")]
    ServerVad {
        /// Activation threshold
        threshold: f32,
        /// Audio prefix padding in ms
        prefix_padding_ms: u32,
        /// Silence duration in ms
        silence_duration_ms: u32,
    },
}

impl Default for TurnDetection {
    fn default() -> Self {
        Self::ServerVad {
            threshold: 0.5,
            prefix_padding_ms: 300,
            silence_duration_ms: 500,
        }
    }
}

/// Session creation response. Only the client secret is read.
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeSessionResponse {
    pub client_secret: ClientSecret,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecret {
    pub value: String,
    pub expires_at: i64,
}

/// Token handed to the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EphemeralToken {
    pub client_secret: String,
    pub expires_at: i64,
    pub model: String,
}
