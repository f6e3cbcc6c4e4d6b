use std::sync::Arc;

use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::core::openai::OpenAIClient;
use crate::core::session_store::{InMemorySessionStore, SessionStore};
use crate::errors::app_error::{AppError, AppResult};

/// Shared state handed to every handler.
pub struct AppState {
    pub config: ServerConfig,
    pub openai: OpenAIClient,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    /// Build state with the in-memory session store.
    pub async fn new(config: ServerConfig) -> AppResult<Arc<Self>> {
        Self::with_session_store(config, Arc::new(InMemorySessionStore::new())).await
    }

    pub async fn with_session_store(
        config: ServerConfig,
        sessions: Arc<dyn SessionStore>,
    ) -> AppResult<Arc<Self>> {
        let openai = OpenAIClient::new(
            config.openai_base_url.clone(),
            config.openai_api_key.clone(),
        )
        .map_err(|e| AppError::Internal(e.to_string()))?;

        if openai.is_configured() {
            info!(base_url = %openai.base_url(), "OpenAI client configured");
        } else {
            warn!(
                "OPENAI_API_KEY is not set; OpenAI-backed endpoints will return configuration errors"
            );
        }

        let audio_dir = config.session_audio_dir();
        if let Err(e) = tokio::fs::create_dir_all(&audio_dir).await {
            return Err(AppError::Internal(format!(
                "Failed to create session audio directory {}: {e}",
                audio_dir.display()
            )));
        }

        Ok(Arc::new(Self {
            config,
            openai,
            sessions,
        }))
    }
}
