use std::path::PathBuf;

use super::ServerConfig;
use super::env;
use super::yaml::YamlConfig;
use crate::core::tasks::SCENARIO_TOKEN_LIMITS;

/// Build the configuration from environment variables, then apply YAML
/// overrides on top.
pub(super) fn merge_config(yaml: Option<YamlConfig>) -> Result<ServerConfig, String> {
    let mut config = env::from_env()?;

    if let Some(yaml) = yaml {
        apply_yaml(&mut config, yaml);
    }

    config.scenario_max_output_tokens =
        SCENARIO_TOKEN_LIMITS.clamp(config.scenario_max_output_tokens);
    config.openai_base_url = config.openai_base_url.trim_end_matches('/').to_string();

    Ok(config)
}

fn apply_yaml(config: &mut ServerConfig, yaml: YamlConfig) {
    if let Some(server) = yaml.server {
        override_with(&mut config.host, server.host);
        override_with(&mut config.port, server.port);
    }

    if let Some(openai) = yaml.openai {
        if openai.api_key.is_some() {
            config.openai_api_key = openai.api_key;
        }
        override_with(&mut config.openai_base_url, openai.base_url);
        override_with(&mut config.realtime_model, openai.realtime_model);
        override_with(
            &mut config.realtime_transcription_model,
            openai.realtime_transcription_model,
        );
        override_with(
            &mut config.session_transcription_model,
            openai.session_transcription_model,
        );
        override_with(&mut config.company_brief_model, openai.company_brief_model);
        override_with(&mut config.scenario_model, openai.scenario_model);
        override_with(
            &mut config.scenario_max_output_tokens,
            openai.scenario_max_output_tokens,
        );
        override_with(&mut config.face_phrase_model, openai.face_phrase_model);
        if openai.face_verify_model.is_some() {
            config.face_verify_model = openai.face_verify_model;
        }
    }

    if let Some(face_nudge) = yaml.face_nudge {
        override_with(
            &mut config.face_nudge_default_cooldown_ms,
            face_nudge.default_cooldown_ms,
        );
    }

    if let Some(sessions) = yaml.sessions {
        override_with(&mut config.keep_session_audio, sessions.keep_audio);
        if let Some(dir) = sessions.audio_dir {
            config.session_audio_dir = Some(PathBuf::from(dir));
        }
    }

    if let Some(security) = yaml.security {
        override_with(&mut config.cors_allowed_origins, security.cors_allowed_origins);
        override_with(
            &mut config.rate_limit_requests_per_second,
            security.rate_limit_requests_per_second,
        );
        override_with(
            &mut config.rate_limit_burst_size,
            security.rate_limit_burst_size,
        );
    }
}

fn override_with<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}
