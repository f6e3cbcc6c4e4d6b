//! Ephemeral token issuance for browser-side Realtime sessions.
//!
//! The gateway never carries realtime audio. It renders the session
//! instructions, registers the session with OpenAI and hands the returned
//! short-lived secret to the client.

pub mod messages;

use std::time::Duration;

use tracing::info;

use crate::core::openai::{OpenAIClient, UpstreamError};
use crate::core::prompts::{SessionBrief, build_instructions, nudge_tool};

pub use messages::{
    EphemeralToken, InputAudioTranscription, RealtimeSessionRequest, RealtimeSessionResponse,
    TurnDetection,
};

pub const REALTIME_SESSIONS_PATH: &str = "realtime/sessions";
pub const REALTIME_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_REALTIME_MODEL: &str = "gpt-4o-realtime-preview-2024-12-17";
pub const DEFAULT_REALTIME_TRANSCRIPTION_MODEL: &str = "gpt-4o-mini-transcribe";
pub const REALTIME_VOICE: &str = "alloy";

/// Models used for realtime sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealtimeSettings {
    pub model: String,
    pub transcription_model: String,
}

impl Default for RealtimeSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_REALTIME_MODEL.to_string(),
            transcription_model: DEFAULT_REALTIME_TRANSCRIPTION_MODEL.to_string(),
        }
    }
}

/// Build the session creation request for `brief`.
pub fn session_request(
    settings: &RealtimeSettings,
    brief: &SessionBrief,
) -> RealtimeSessionRequest {
    RealtimeSessionRequest {
        model: settings.model.clone(),
        voice: REALTIME_VOICE.to_string(),
        instructions: build_instructions(brief),
        tools: vec![nudge_tool()],
        input_audio_transcription: InputAudioTranscription {
            model: settings.transcription_model.clone(),
        },
        turn_detection: TurnDetection::default(),
    }
}

/// Register a realtime session and return its client secret.
pub async fn create_ephemeral_token(
    client: &OpenAIClient,
    settings: &RealtimeSettings,
    brief: &SessionBrief,
) -> Result<EphemeralToken, UpstreamError> {
    client.ensure_configured()?;

    let request = session_request(settings, brief);
    let body = serde_json::to_value(&request).map_err(|e| {
        UpstreamError::InvalidRequest(format!("Failed to encode session request: {e}"))
    })?;

    info!(
        model = %settings.model,
        mode = brief.mode().as_str(),
        scenario_id = brief.scenario_id.as_deref().unwrap_or("-"),
        "Creating realtime session"
    );
    let raw = client
        .post_json(REALTIME_SESSIONS_PATH, &body, REALTIME_TIMEOUT)
        .await?;

    let session: RealtimeSessionResponse = serde_json::from_value(raw).map_err(|e| {
        UpstreamError::MalformedPayload(format!("Failed to parse realtime session response: {e}"))
    })?;

    Ok(EphemeralToken {
        client_secret: session.client_secret.value,
        expires_at: session.client_secret.expires_at,
        model: settings.model.clone(),
    })
}
