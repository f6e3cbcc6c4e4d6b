use std::sync::Arc;

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::Serialize;
use tracing::info;

use crate::core::generation::run_task;
use crate::core::tasks::{CompanyBriefRequest, CompanyBriefSummary, CompanyBriefTask};
use crate::errors::app_error::AppResult;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CompanyBriefResponse {
    pub company_brief_summary: CompanyBriefSummary,
}

/// Research a company's public website and summarize it for interview prep.
pub async fn company_brief(
    State(state): State<Arc<AppState>>,
    request: Result<Json<CompanyBriefRequest>, JsonRejection>,
) -> AppResult<Json<CompanyBriefResponse>> {
    state.openai.ensure_configured()?;
    let Json(request) = request?;

    let task = CompanyBriefTask::new(state.config.company_brief_model.clone(), &request)?;
    info!(company_url = %task.company_url(), "Generating company brief");

    let summary = run_task(&state.openai, &task).await?;
    Ok(Json(CompanyBriefResponse {
        company_brief_summary: summary,
    }))
}
