use std::sync::Arc;

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::Serialize;
use tracing::info;

use crate::core::generation::run_task;
use crate::core::tasks::{GenerateScenarioRequest, Scenario, ScenarioTask};
use crate::errors::app_error::AppResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct GenerateScenarioResponse {
    pub scenario: Scenario,
}

/// Generate a practice interview scenario from company context.
pub async fn generate_scenario(
    State(state): State<Arc<AppState>>,
    request: Result<Json<GenerateScenarioRequest>, JsonRejection>,
) -> AppResult<Json<GenerateScenarioResponse>> {
    state.openai.ensure_configured()?;
    let Json(request) = request?;

    let task = ScenarioTask::new(
        state.config.scenario_model.clone(),
        state.config.scenario_max_output_tokens,
        &request,
    )?;
    info!(
        question_count = task.question_count(),
        "Generating practice scenario"
    );

    let scenario = run_task(&state.openai, &task).await?;
    Ok(Json(GenerateScenarioResponse { scenario }))
}
