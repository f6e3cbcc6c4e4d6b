//! Web-search-backed company research summary.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::core::generation::coerce::{list_field, string_field, tidy_list};
use crate::core::generation::{
    GenerationRequest, LenientDecode, OutputBudget, OutputSchema, Payload, StructuredTask,
    TokenLimits, decode,
};
use crate::utils::normalize_company_url;

use super::{InvalidTaskInput, non_blank};

pub const COMPANY_BRIEF_MAX_OUTPUT_TOKENS: u32 = 900;
pub const COMPANY_BRIEF_TIMEOUT: Duration = Duration::from_secs(30);

const SYSTEM_PROMPT: &str = "You are a concise research assistant. Use web search to gather \
company context from official sources (homepage, about, product, pricing, docs, newsroom) using \
the provided company URL and user notes. Do not invent facts. If information is missing or \
uncertain, place it in `unknowns`. Return ONLY valid JSON matching the required schema.";

/// Body of `POST /api/company_brief`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CompanyBriefRequest {
    #[serde(default)]
    pub company_url: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CompanyBriefSummary {
    pub one_liner: String,
    pub products_services: Vec<String>,
    pub customers_users: Vec<String>,
    pub positioning_claims: Vec<String>,
    pub risk_areas: Vec<String>,
    pub unknowns: Vec<String>,
    pub generated_at: String,
}

impl LenientDecode for CompanyBriefSummary {
    fn lenient(payload: &Payload) -> Self {
        Self {
            one_liner: string_field(payload, "one_liner"),
            products_services: list_field(payload, "products_services"),
            customers_users: list_field(payload, "customers_users"),
            positioning_claims: list_field(payload, "positioning_claims"),
            risk_areas: list_field(payload, "risk_areas"),
            unknowns: list_field(payload, "unknowns"),
            generated_at: string_field(payload, "generated_at"),
        }
    }

    fn normalize(self) -> Self {
        Self {
            one_liner: self.one_liner.trim().to_string(),
            products_services: tidy_list(self.products_services),
            customers_users: tidy_list(self.customers_users),
            positioning_claims: tidy_list(self.positioning_claims),
            risk_areas: tidy_list(self.risk_areas),
            unknowns: tidy_list(self.unknowns),
            generated_at: OffsetDateTime::now_utc()
                .format(&Rfc3339)
                .unwrap_or_default(),
        }
    }
}

/// Summarize a company from its URL and optional notes.
#[derive(Debug, Clone)]
pub struct CompanyBriefTask {
    model: String,
    company_url: String,
    notes: Option<String>,
}

impl CompanyBriefTask {
    pub fn new(
        model: impl Into<String>,
        request: &CompanyBriefRequest,
    ) -> Result<Self, InvalidTaskInput> {
        let company_url = normalize_company_url(&request.company_url)
            .map_err(|e| InvalidTaskInput::new(e.to_string()))?;
        Ok(Self {
            model: model.into(),
            company_url,
            notes: non_blank(request.notes.as_deref()),
        })
    }

    pub fn company_url(&self) -> &str {
        &self.company_url
    }

    fn user_prompt(&self) -> String {
        format!(
            "Company URL: {url}\n\n\
             User notes (optional):\n\
             {notes}\n\n\
             Return JSON with keys:\n\
             - one_liner (string)\n\
             - products_services (string[])\n\
             - customers_users (string[])\n\
             - positioning_claims (string[])\n\
             - risk_areas (string[])\n\
             - unknowns (string[])\n\
             - generated_at (ISO timestamp)\n",
            url = self.company_url,
            notes = self.notes.as_deref().unwrap_or("None"),
        )
    }

    fn schema() -> OutputSchema {
        let list = json!({"type": "array", "items": {"type": "string"}});
        OutputSchema::new(
            "company_brief_summary",
            json!({
                "type": "object",
                "properties": {
                    "one_liner": {"type": "string"},
                    "products_services": list,
                    "customers_users": list,
                    "positioning_claims": list,
                    "risk_areas": list,
                    "unknowns": list,
                    "generated_at": {"type": "string"},
                },
                "required": [
                    "one_liner",
                    "products_services",
                    "customers_users",
                    "positioning_claims",
                    "risk_areas",
                    "unknowns",
                    "generated_at",
                ],
            }),
        )
    }
}

impl StructuredTask for CompanyBriefTask {
    type Output = CompanyBriefSummary;

    fn name(&self) -> &'static str {
        "company brief"
    }

    fn initial_budget(&self) -> OutputBudget {
        OutputBudget::new(COMPANY_BRIEF_MAX_OUTPUT_TOKENS)
    }

    fn token_limits(&self) -> TokenLimits {
        TokenLimits::fixed(COMPANY_BRIEF_MAX_OUTPUT_TOKENS)
    }

    fn build_request(&self, budget: &OutputBudget) -> GenerationRequest {
        GenerationRequest::builder(&self.model, Self::schema())
            .system_prompt(SYSTEM_PROMPT)
            .user_prompt(self.user_prompt())
            .max_output_tokens(budget.max_output_tokens, self.token_limits())
            .web_search()
            .reasoning_effort("low")
            .timeout(COMPANY_BRIEF_TIMEOUT)
            .build()
    }

    fn coerce(&self, payload: Payload) -> CompanyBriefSummary {
        decode(payload)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;
    use crate::core::generation::pipeline::testing::ScriptedBackend;
    use crate::core::generation::run_task;
    use crate::core::openai::UpstreamError;

    fn task(url: &str, notes: Option<&str>) -> CompanyBriefTask {
        CompanyBriefTask::new(
            "gpt-5-mini",
            &CompanyBriefRequest {
                company_url: url.to_string(),
                notes: notes.map(str::to_string),
            },
        )
        .unwrap()
    }

    #[test]
    fn test_blank_url_is_rejected() {
        let err = CompanyBriefTask::new("gpt-5-mini", &CompanyBriefRequest::default()).unwrap_err();
        assert_eq!(err.to_string(), "company_url is required.");
    }

    #[test]
    fn test_request_uses_web_search_and_low_effort() {
        let task = task("acme.com", Some("  B2B anvils "));
        let request = task.build_request(&task.initial_budget());
        let body = request.to_body();

        assert_eq!(body["model"], "gpt-5-mini");
        assert_eq!(body["tools"][0]["type"], "web_search");
        assert_eq!(body["tool_choice"], "auto");
        assert_eq!(body["reasoning"]["effort"], "low");
        assert_eq!(body["max_output_tokens"], 900);
        assert_eq!(body["text"]["format"]["name"], "company_brief_summary");
        assert_eq!(request.timeout(), COMPANY_BRIEF_TIMEOUT);
        assert!(request.user_prompt().contains("Company URL: https://acme.com"));
        assert!(request.user_prompt().contains("B2B anvils"));
    }

    #[test]
    fn test_missing_notes_render_as_none() {
        let task = task("acme.com", Some("   "));
        let request = task.build_request(&task.initial_budget());
        assert!(request.user_prompt().contains("User notes (optional):\nNone"));
    }

    #[test]
    fn test_lenient_coercion_and_fresh_timestamp() {
        let payload = serde_json::json!({
            "one_liner": "  Anvils for everyone ",
            "products_services": "Anvils",
            "customers_users": ["Coyotes", "  ", null],
            "risk_areas": 7,
            "generated_at": "1999-01-01",
        });
        let summary = task("acme.com", None).coerce(payload.as_object().unwrap().clone());

        assert_eq!(summary.one_liner, "Anvils for everyone");
        assert_eq!(summary.products_services, vec!["Anvils"]);
        assert_eq!(summary.customers_users, vec!["Coyotes"]);
        assert!(summary.risk_areas.is_empty());
        assert!(summary.unknowns.is_empty());
        assert_ne!(summary.generated_at, "1999-01-01");
        assert!(summary.generated_at.ends_with('Z'));
        assert!(summary.generated_at.contains('T'));
    }

    #[tokio::test]
    async fn test_incomplete_is_never_retried() {
        let backend = ScriptedBackend::new(vec![Ok(serde_json::json!({
            "status": "incomplete",
            "incomplete_details": {"reason": "max_output_tokens"},
        }))]);

        let err = run_task(&backend, &task("acme.com", None)).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Incomplete { .. }));
        assert_eq!(backend.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_completed_brief_is_returned() {
        let payload: Value = serde_json::json!({
            "one_liner": "Anvils",
            "products_services": ["Anvils"],
            "customers_users": [],
            "positioning_claims": [],
            "risk_areas": [],
            "unknowns": ["Revenue"],
            "generated_at": "",
        });
        let backend = ScriptedBackend::new(vec![Ok(serde_json::json!({
            "status": "completed",
            "output": [
                {"type": "web_search_call", "status": "completed"},
                {"type": "message", "content": [{"type": "output_text", "text": payload.to_string()}]},
            ],
        }))]);

        let summary = run_task(&backend, &task("acme.com", None)).await.unwrap();
        assert_eq!(summary.unknowns, vec!["Revenue"]);
        assert!(!summary.generated_at.is_empty());
    }
}
