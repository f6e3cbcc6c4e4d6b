use std::sync::Arc;

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use tracing::debug;

use crate::core::generation::run_task;
use crate::core::tasks::{
    FaceNudgePhraseRequest, FaceNudgeVerifyRequest, FacePhraseDecision, FacePhraseTask,
    FaceVerifyDecision, FaceVerifyTask,
};
use crate::errors::app_error::AppResult;
use crate::state::AppState;

/// Rephrase a camera-presence nudge, or abstain.
pub async fn phrase_nudge(
    State(state): State<Arc<AppState>>,
    request: Result<Json<FaceNudgePhraseRequest>, JsonRejection>,
) -> AppResult<Json<FacePhraseDecision>> {
    state.openai.ensure_configured()?;
    let Json(request) = request?;

    let task = FacePhraseTask::new(
        state.config.face_phrase_model.clone(),
        state.config.face_nudge_default_cooldown_ms,
        &request,
    )?;
    let decision = run_task(&state.openai, &task).await?;
    debug!(
        reason = %request.reason,
        abstain = decision.abstain,
        "Face nudge phrased"
    );
    Ok(Json(decision))
}

/// Confirm a camera-presence nudge against a face keyframe.
pub async fn verify_nudge(
    State(state): State<Arc<AppState>>,
    request: Result<Json<FaceNudgeVerifyRequest>, JsonRejection>,
) -> AppResult<Json<FaceVerifyDecision>> {
    state.openai.ensure_configured()?;
    let Json(request) = request?;

    let task = FaceVerifyTask::new(
        state.config.face_verify_model().to_string(),
        state.config.face_nudge_default_cooldown_ms,
        &request,
    )?;
    let decision = run_task(&state.openai, &task).await?;
    debug!(
        reason = %request.reason,
        verified = decision.verified,
        abstain = decision.abstain,
        "Face nudge verified"
    );
    Ok(Json(decision))
}
