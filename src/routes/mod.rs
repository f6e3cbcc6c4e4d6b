//! Router assembly
//!
//! `create_app` wires the public routes, the `/api` router and the
//! cross-cutting layers (CORS, rate limiting, security headers) around a
//! shared [`AppState`].

pub mod api;

use std::sync::Arc;

use axum::{Router, routing::get};
use http::{HeaderValue, Method, header::CONTENT_TYPE};
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::handlers::api::{health_check, service_info};
use crate::state::AppState;

const ALLOWED_METHODS: [Method; 4] = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];

/// Build the CORS layer from the configured origins.
pub fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(ALLOWED_METHODS)
            .allow_headers(Any)
            .allow_credentials(false);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins()
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(ALLOWED_METHODS)
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true)
}

/// Assemble the full application router.
pub fn create_app(state: Arc<AppState>) -> Router {
    let config = &state.config;

    // Rate limiting (disabled when rate >= 100000)
    let governor_layer = if config.is_rate_limit_enabled() {
        GovernorConfigBuilder::default()
            .period(config.rate_limit_replenish_period())
            .burst_size(config.rate_limit_burst_size)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .map(|governor_config| GovernorLayer::new(governor_config))
    } else {
        info!("Rate limiting disabled (rate >= 100000/s)");
        None
    };
    if config.is_rate_limit_enabled() && governor_layer.is_none() {
        warn!("Rate limiter configuration rejected; continuing without rate limiting");
    }

    let cors = cors_layer(config);

    // Security headers
    let security_headers = tower::ServiceBuilder::new()
        .layer(SetResponseHeaderLayer::overriding(
            http::header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            http::header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ));

    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health_check))
        .nest("/api", api::create_api_router())
        .with_state(state)
        .layer(cors)
        .layer(tower::util::option_layer(governor_layer))
        .layer(security_headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_cors_layer_builds() {
        let _ = cors_layer(&ServerConfig::default());
    }

    #[test]
    fn test_wildcard_cors_layer_builds() {
        let mut config = ServerConfig::default();
        config.cors_allowed_origins = "*".to_string();
        let _ = cors_layer(&config);
    }
}
