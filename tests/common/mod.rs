//! Shared helpers for the HTTP integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use serde_json::{Value, json};
use tower::util::ServiceExt;

use kawkai_gateway::{ServerConfig, routes, state::AppState};

pub const TEST_API_KEY: &str = "sk-test";

/// Configuration pointing the OpenAI client at `base_url`, with rate
/// limiting disabled so requests without a peer address are accepted.
pub fn test_config(base_url: &str, audio_dir: &Path) -> ServerConfig {
    let mut config = ServerConfig::default();
    config.host = "127.0.0.1".to_string();
    config.openai_api_key = Some(TEST_API_KEY.to_string());
    config.openai_base_url = base_url.to_string();
    config.session_audio_dir = Some(audio_dir.to_path_buf());
    config.rate_limit_requests_per_second = 100_000;
    config
}

pub async fn test_state(config: ServerConfig) -> Arc<AppState> {
    AppState::new(config).await.unwrap()
}

pub async fn test_app(config: ServerConfig) -> Router {
    routes::create_app(test_state(config).await)
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// A completed Responses API envelope carrying `payload` as output text.
pub fn completed_envelope(payload: Value) -> Value {
    json!({
        "id": "resp_test",
        "status": "completed",
        "output": [
            {"type": "reasoning", "summary": []},
            {
                "type": "message",
                "role": "assistant",
                "content": [{"type": "output_text", "text": payload.to_string()}],
            },
        ],
    })
}

/// An envelope cut short by the output token ceiling.
pub fn truncated_envelope() -> Value {
    json!({
        "id": "resp_test",
        "status": "incomplete",
        "incomplete_details": {"reason": "max_output_tokens"},
        "output": [],
    })
}
