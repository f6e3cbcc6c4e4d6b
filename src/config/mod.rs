//! Configuration module for the Kawkai gateway
//!
//! This module handles server configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//!
//! # Example
//! ```rust,no_run
//! use kawkai_gateway::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable overrides
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::time::Duration;

mod env;
mod merge;
mod validation;
mod yaml;

pub use yaml::YamlConfig;

use crate::core::openai::OPENAI_API_BASE_URL;
use crate::core::realtime::{
    DEFAULT_REALTIME_MODEL, DEFAULT_REALTIME_TRANSCRIPTION_MODEL, RealtimeSettings,
};
use crate::core::tasks::{DEFAULT_FACE_NUDGE_COOLDOWN_MS, DEFAULT_SCENARIO_MAX_OUTPUT_TOKENS};
use crate::core::transcription::DEFAULT_SESSION_TRANSCRIPTION_MODEL;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_COMPANY_BRIEF_MODEL: &str = "gpt-5-mini";
pub const DEFAULT_SCENARIO_MODEL: &str = "gpt-5-mini";
pub const DEFAULT_FACE_PHRASE_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_CORS_ALLOWED_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";
pub const DEFAULT_RATE_LIMIT_REQUESTS_PER_SECOND: u32 = 60;
pub const DEFAULT_RATE_LIMIT_BURST_SIZE: u32 = 10;

/// Rates at or above this value disable the rate limiter.
pub const RATE_LIMIT_DISABLED_THRESHOLD: u32 = 100_000;

/// Server configuration
///
/// Contains all configuration needed to run the gateway:
/// - Server settings (host, port)
/// - OpenAI credentials, base URL and per-endpoint model ids
/// - Face nudge and session audio behaviour
/// - Security settings (CORS, rate limiting)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // OpenAI settings
    /// OpenAI API key. Endpoints answer with a configuration error while unset.
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub realtime_model: String,
    /// Transcription model for the live realtime session
    pub realtime_transcription_model: String,
    /// Transcription model for uploaded session recordings
    pub session_transcription_model: String,
    pub company_brief_model: String,
    pub scenario_model: String,
    /// Initial scenario output ceiling, clamped to 600..=3000
    pub scenario_max_output_tokens: u32,
    pub face_phrase_model: String,
    /// Falls back to `face_phrase_model` when unset
    pub face_verify_model: Option<String>,
    pub face_nudge_default_cooldown_ms: u64,

    // Session audio
    /// Keep spooled session audio after transcription
    pub keep_session_audio: bool,
    /// Directory for spooled audio. Defaults to the system temp directory.
    pub session_audio_dir: Option<PathBuf>,

    // Security configuration
    /// CORS allowed origins (comma-separated list or "*" for all)
    pub cors_allowed_origins: String,
    /// Maximum requests per second per IP address
    /// Default: 60
    pub rate_limit_requests_per_second: u32,
    /// Maximum burst size for rate limiting
    /// Default: 10
    pub rate_limit_burst_size: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            openai_api_key: None,
            openai_base_url: OPENAI_API_BASE_URL.to_string(),
            realtime_model: DEFAULT_REALTIME_MODEL.to_string(),
            realtime_transcription_model: DEFAULT_REALTIME_TRANSCRIPTION_MODEL.to_string(),
            session_transcription_model: DEFAULT_SESSION_TRANSCRIPTION_MODEL.to_string(),
            company_brief_model: DEFAULT_COMPANY_BRIEF_MODEL.to_string(),
            scenario_model: DEFAULT_SCENARIO_MODEL.to_string(),
            scenario_max_output_tokens: DEFAULT_SCENARIO_MAX_OUTPUT_TOKENS,
            face_phrase_model: DEFAULT_FACE_PHRASE_MODEL.to_string(),
            face_verify_model: None,
            face_nudge_default_cooldown_ms: DEFAULT_FACE_NUDGE_COOLDOWN_MS,
            keep_session_audio: false,
            session_audio_dir: None,
            cors_allowed_origins: DEFAULT_CORS_ALLOWED_ORIGINS.to_string(),
            rate_limit_requests_per_second: DEFAULT_RATE_LIMIT_REQUESTS_PER_SECOND,
            rate_limit_burst_size: DEFAULT_RATE_LIMIT_BURST_SIZE,
        }
    }
}

/// Zeroize the API key when the configuration is dropped.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut key) = self.openai_api_key {
            key.zeroize();
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables (with defaults).
    ///
    /// The .env file is loaded in `main` before this is called, so actual
    /// environment variables take precedence over .env values.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = merge::merge_config(None)?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a YAML file with environment variable base
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let yaml_config = yaml::YamlConfig::from_file(path)?;
        let config = merge::merge_config(Some(yaml_config))?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Get the server address as a string
    ///
    /// Returns the address in the format "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn face_verify_model(&self) -> &str {
        self.face_verify_model
            .as_deref()
            .unwrap_or(&self.face_phrase_model)
    }

    pub fn realtime_settings(&self) -> RealtimeSettings {
        RealtimeSettings {
            model: self.realtime_model.clone(),
            transcription_model: self.realtime_transcription_model.clone(),
        }
    }

    pub fn is_rate_limit_enabled(&self) -> bool {
        self.rate_limit_requests_per_second < RATE_LIMIT_DISABLED_THRESHOLD
    }

    /// Time for one rate-limit slot to refill, per client IP.
    pub fn rate_limit_replenish_period(&self) -> Duration {
        Duration::from_secs(1) / self.rate_limit_requests_per_second.max(1)
    }

    /// Whether every origin is allowed.
    pub fn allows_any_origin(&self) -> bool {
        self.cors_allowed_origins.trim() == "*"
    }

    /// Configured CORS origins, trimmed, blanks dropped.
    pub fn cors_origins(&self) -> Vec<String> {
        parse_origins(&self.cors_allowed_origins)
    }

    /// Directory session audio is spooled to.
    pub fn session_audio_dir(&self) -> PathBuf {
        self.session_audio_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}

pub(crate) fn parse_origins(origins: &str) -> Vec<String> {
    origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a boolean flag the way the deployment scripts set them.
pub(crate) fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}
