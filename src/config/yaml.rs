use serde::Deserialize;
use std::path::PathBuf;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Values present
/// here override environment variables.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 8000
///
/// openai:
///   api_key: "sk-..."
///   base_url: "https://api.openai.com/v1"
///   realtime_model: "gpt-4o-realtime-preview-2024-12-17"
///   realtime_transcription_model: "gpt-4o-mini-transcribe"
///   session_transcription_model: "whisper-1"
///   company_brief_model: "gpt-5-mini"
///   scenario_model: "gpt-5-mini"
///   scenario_max_output_tokens: 1400
///   face_phrase_model: "gpt-4o-mini"
///   face_verify_model: "gpt-4o-mini"
///
/// face_nudge:
///   default_cooldown_ms: 12000
///
/// sessions:
///   keep_audio: false
///   audio_dir: "/var/lib/kawkai/audio"
///
/// security:
///   cors_allowed_origins: "http://localhost:3000,http://127.0.0.1:3000"
///   rate_limit_requests_per_second: 60
///   rate_limit_burst_size: 10
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub openai: Option<OpenAIYaml>,
    pub face_nudge: Option<FaceNudgeYaml>,
    pub sessions: Option<SessionsYaml>,
    pub security: Option<SecurityYaml>,
}

/// Server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// OpenAI credentials and model ids from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct OpenAIYaml {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub realtime_model: Option<String>,
    pub realtime_transcription_model: Option<String>,
    pub session_transcription_model: Option<String>,
    pub company_brief_model: Option<String>,
    pub scenario_model: Option<String>,
    pub scenario_max_output_tokens: Option<u32>,
    pub face_phrase_model: Option<String>,
    pub face_verify_model: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct FaceNudgeYaml {
    pub default_cooldown_ms: Option<u64>,
}

/// Session audio handling from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SessionsYaml {
    pub keep_audio: Option<bool>,
    pub audio_dir: Option<String>,
}

/// Security configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SecurityYaml {
    pub cors_allowed_origins: Option<String>,
    pub rate_limit_requests_per_second: Option<u32>,
    pub rate_limit_burst_size: Option<u32>,
}

impl YamlConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file cannot be read
    /// - The YAML is malformed
    /// - Required fields have invalid types
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;

        let config: YamlConfig = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse YAML config: {e}"))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_yaml_config_full() {
        let yaml = r#"
server:
  host: "127.0.0.1"
  port: 3001
openai:
  api_key: "sk-test"
  base_url: "http://localhost:9999/v1"
  scenario_max_output_tokens: 1800
  face_verify_model: "gpt-4o"
face_nudge:
  default_cooldown_ms: 8000
sessions:
  keep_audio: true
security:
  cors_allowed_origins: "*"
  rate_limit_requests_per_second: 100000
"#;
        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();

        let server = config.server.unwrap();
        assert_eq!(server.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(server.port, Some(3001));

        let openai = config.openai.unwrap();
        assert_eq!(openai.api_key.as_deref(), Some("sk-test"));
        assert_eq!(openai.scenario_max_output_tokens, Some(1800));
        assert_eq!(openai.face_verify_model.as_deref(), Some("gpt-4o"));
        assert_eq!(openai.scenario_model, None);

        assert_eq!(config.face_nudge.unwrap().default_cooldown_ms, Some(8000));
        assert_eq!(config.sessions.unwrap().keep_audio, Some(true));
        assert_eq!(
            config.security.unwrap().rate_limit_requests_per_second,
            Some(100000)
        );
    }

    #[test]
    fn test_yaml_config_empty() {
        let config: YamlConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.server.is_none());
        assert!(config.openai.is_none());
        assert!(config.security.is_none());
    }

    #[test]
    fn test_from_file_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("invalid.yaml");
        fs::write(&path, "server: [unclosed").unwrap();

        let err = YamlConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse YAML config"));
    }
}
