use std::sync::Arc;

use axum::{Json, extract::State};
use bytes::Bytes;
use tracing::info;

use crate::core::prompts::SessionBrief;
use crate::core::realtime::{EphemeralToken, create_ephemeral_token};
use crate::errors::app_error::{AppError, AppResult};
use crate::state::AppState;

/// Parse the optional token request body. An empty body means a default
/// coach session.
fn parse_brief(body: &[u8]) -> AppResult<SessionBrief> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(SessionBrief::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::InvalidInput(format!("Invalid token request body: {e}")))
}

/// Issue an ephemeral client secret for a browser Realtime session.
pub async fn create_token(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> AppResult<Json<EphemeralToken>> {
    state.openai.ensure_configured()?;
    let brief = parse_brief(&body)?;

    let settings = state.config.realtime_settings();
    let token = create_ephemeral_token(&state.openai, &settings, &brief).await?;
    info!(
        model = %token.model,
        expires_at = token.expires_at,
        "Issued realtime ephemeral token"
    );
    Ok(Json(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_body_is_default_brief() {
        let brief = parse_brief(b"  \n").unwrap();
        assert!(brief.mode.is_none());
        assert!(brief.scenario.is_none());
    }

    #[test]
    fn test_malformed_body_is_invalid_input() {
        let err = parse_brief(b"{not json").unwrap_err();
        assert_eq!(err.category(), "invalid_input");
    }

    #[test]
    fn test_scenario_override_alias() {
        let brief = parse_brief(
            br#"{"mode": "journalist", "scenario_override": {"context": "Earnings call", "questions": []}}"#,
        )
        .unwrap();
        assert_eq!(
            brief.scenario.and_then(|s| s.context).as_deref(),
            Some("Earnings call")
        );
    }
}
