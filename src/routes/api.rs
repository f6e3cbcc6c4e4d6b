use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::sessions::MAX_SESSION_UPLOAD_BYTES;
use crate::handlers::{company_brief, face_nudge, realtime, scenario, sessions};
use crate::state::AppState;
use std::sync::Arc;

/// Create the `/api` router
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/realtime/token", post(realtime::create_token))
        .route("/company_brief", post(company_brief::company_brief))
        .route("/scenario/generate", post(scenario::generate_scenario))
        .route("/face/nudge/phrase", post(face_nudge::phrase_nudge))
        .route("/face/nudge/verify", post(face_nudge::verify_nudge))
        .route(
            "/sessions",
            post(sessions::upload_session).layer(DefaultBodyLimit::max(MAX_SESSION_UPLOAD_BYTES)),
        )
        .route(
            "/sessions/{session_id}/transcript",
            get(sessions::get_transcript),
        )
        .route("/sessions/{session_id}", delete(sessions::delete_session))
        .layer(TraceLayer::new_for_http())
}
