use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use super::{ServerConfig, parse_flag};

/// Non-blank value of an environment variable.
pub(super) fn var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parse an environment variable, naming it in the error.
pub(super) fn parse_var<T>(name: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    var(name)
        .map(|value| {
            value
                .parse::<T>()
                .map_err(|e| format!("Invalid {name} value '{value}': {e}"))
        })
        .transpose()
}

/// Load the configuration from environment variables over defaults.
pub(super) fn from_env() -> Result<ServerConfig, String> {
    let mut config = ServerConfig::default();

    if let Some(host) = var("HOST") {
        config.host = host;
    }
    if let Some(port) = parse_var("PORT")? {
        config.port = port;
    }

    config.openai_api_key = var("OPENAI_API_KEY");
    if let Some(base_url) = var("OPENAI_BASE_URL") {
        config.openai_base_url = base_url;
    }
    if let Some(model) = var("OPENAI_REALTIME_MODEL") {
        config.realtime_model = model;
    }
    if let Some(model) = var("OPENAI_TRANSCRIPTION_MODEL") {
        config.realtime_transcription_model = model;
    }
    if let Some(model) = var("OPENAI_SESSION_TRANSCRIPTION_MODEL") {
        config.session_transcription_model = model;
    }
    if let Some(model) = var("OPENAI_COMPANY_BRIEF_MODEL") {
        config.company_brief_model = model;
    }
    if let Some(model) = var("OPENAI_SCENARIO_MODEL") {
        config.scenario_model = model;
    }
    if let Some(tokens) = parse_var("OPENAI_SCENARIO_MAX_OUTPUT_TOKENS")? {
        config.scenario_max_output_tokens = tokens;
    }
    if let Some(model) = var("OPENAI_FACE_PHRASE_MODEL") {
        config.face_phrase_model = model;
    }
    config.face_verify_model = var("OPENAI_FACE_VERIFY_MODEL");
    if let Some(cooldown) = parse_var("FACE_NUDGE_DEFAULT_COOLDOWN_MS")? {
        config.face_nudge_default_cooldown_ms = cooldown;
    }

    config.keep_session_audio = var("KAWKAI_KEEP_SESSION_AUDIO")
        .map(|value| parse_flag(&value))
        .unwrap_or(false);
    config.session_audio_dir = var("SESSION_AUDIO_DIR").map(PathBuf::from);

    if let Some(origins) = var("CORS_ALLOW_ORIGINS") {
        config.cors_allowed_origins = origins;
    }
    if let Some(rps) = parse_var("RATE_LIMIT_REQUESTS_PER_SECOND")? {
        config.rate_limit_requests_per_second = rps;
    }
    if let Some(burst) = parse_var("RATE_LIMIT_BURST_SIZE")? {
        config.rate_limit_burst_size = burst;
    }

    Ok(config)
}
