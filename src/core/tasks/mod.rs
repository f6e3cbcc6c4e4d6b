//! Structured-generation tasks: one module per call site of the pipeline.

pub mod company_brief;
pub mod face_nudge;
pub mod scenario;

use thiserror::Error;

pub use company_brief::{CompanyBriefRequest, CompanyBriefSummary, CompanyBriefTask};
pub use face_nudge::{
    DEFAULT_FACE_NUDGE_COOLDOWN_MS, FaceNudgeImage, FaceNudgePhraseRequest, FaceNudgeSignals,
    FaceNudgeVerifyRequest, FacePhraseDecision, FacePhraseTask, FaceVerifyDecision, FaceVerifyTask,
};
pub use scenario::{
    DEFAULT_SCENARIO_MAX_OUTPUT_TOKENS, GenerateScenarioRequest, SCENARIO_TOKEN_LIMITS, Scenario,
    ScenarioQuestion, ScenarioTask,
};

/// Caller input a task refused to build a request from.
#[derive(Debug, Error, PartialEq)]
#[error("{0}")]
pub struct InvalidTaskInput(pub String);

impl InvalidTaskInput {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Trim optional free text, treating blank as absent.
pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Neutralize `<user_notes>` delimiters inside user-supplied notes so they
/// cannot close the block they are wrapped in.
pub fn escape_user_notes(notes: &str) -> String {
    notes
        .replace("<user_notes>", "< user_notes>")
        .replace("</user_notes>", "</ user_notes>")
        .replace("<user_notes/>", "< user_notes/>")
}
