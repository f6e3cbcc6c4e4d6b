//! Face-tracking nudge phrasing and keyframe verification.
//!
//! The client decides locally when a presence nudge might be due (face out
//! of frame, poor lighting...) and asks the model either to rephrase the
//! nudge text or to confirm it against a single cropped keyframe.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::core::generation::coerce::{coerce_bool, non_negative_int, string_field};
use crate::core::generation::request::GenerationRequestBuilder;
use crate::core::generation::{
    GenerationRequest, ImageAttachment, LenientDecode, OutputBudget, OutputSchema, Payload,
    StructuredTask, TokenLimits, clamp_phrase, decode,
};

use super::InvalidTaskInput;

pub const FACE_NUDGE_MAX_OUTPUT_TOKENS: u32 = 120;
pub const FACE_NUDGE_TEMPERATURE: f32 = 0.3;
pub const FACE_NUDGE_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_FACE_NUDGE_COOLDOWN_MS: u64 = 12_000;

const PHRASE_MAX_WORDS: usize = 10;
const PHRASE_MAX_CHARS: usize = 80;
const SCHEMA_NAME: &str = "face_nudge_response";

pub const PHRASE_SYSTEM_PROMPT: &str = r#"You are a senior media trainer and executive presence coach for PR spokespeople.
Your product context is "Gong + media trainer + executive presence coach", tuned for high-stakes spokesperson moments.

Task: rewrite the nudge text only. You do NOT decide whether to nudge.
Return JSON only with fields: abstain, text, cooldown_ms.

Rules:
- No mental-state or personality inference. Use observable cues only.
- No identity claims.
- Keep the nudge under 10 words.
- If signals are weak or unclear, set abstain=true and text="".
"#;

pub const VERIFY_SYSTEM_PROMPT: &str = r#"You are a senior media trainer and executive presence coach for PR spokespeople.
Your product context is "Gong + media trainer + executive presence coach", tuned for high-stakes spokesperson moments.

Task: verify whether a locally-triggered face nudge should be shown using a single cropped face keyframe
and minimal signals. Return JSON only with fields: verified, abstain, text, cooldown_ms.

Rules:
- No mental-state or personality inference. Use observable cues only.
- No identity claims.
- If the image is unclear or ambiguous, set verified=false.
- Keep the nudge under 10 words.
"#;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FaceNudgeContext {
    #[serde(default)]
    pub scenario_id: Option<String>,
    #[serde(default)]
    pub user_goal: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
}

/// Local tracker signals, each a confidence in `[0, 1]`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FaceNudgeSignals {
    #[serde(default)]
    pub face_present: Option<f64>,
    #[serde(default)]
    pub framing: Option<f64>,
    #[serde(default)]
    pub lighting: Option<f64>,
    #[serde(default)]
    pub tracking_confidence: Option<f64>,
}

impl FaceNudgeSignals {
    pub fn validate(&self) -> Result<(), InvalidTaskInput> {
        let fields = [
            ("face_present", self.face_present),
            ("framing", self.framing),
            ("lighting", self.lighting),
            ("tracking_confidence", self.tracking_confidence),
        ];
        for (name, value) in fields {
            if let Some(value) = value {
                if !(0.0..=1.0).contains(&value) {
                    return Err(InvalidTaskInput::new(format!(
                        "signals.{name} must be between 0 and 1, got {value}"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FaceNudgeImage {
    pub mime_type: String,
    pub base64: String,
}

impl FaceNudgeImage {
    fn validate(&self) -> Result<ImageAttachment, InvalidTaskInput> {
        let mime_type = self.mime_type.trim();
        if !mime_type.starts_with("image/") {
            return Err(InvalidTaskInput::new(format!(
                "image.mime_type must be an image type, got {mime_type:?}"
            )));
        }
        let data = self.base64.trim();
        if data.is_empty() || BASE64.decode(data).is_err() {
            return Err(InvalidTaskInput::new("image.base64 is not valid base64 data."));
        }
        Ok(ImageAttachment::new(mime_type, data))
    }
}

/// Body of `POST /api/face/nudge/phrase`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FaceNudgePhraseRequest {
    pub t_ms: i64,
    pub reason: String,
    pub severity: String,
    pub fallback_text: String,
    #[serde(default)]
    pub context: Option<FaceNudgeContext>,
    #[serde(default)]
    pub signals: Option<FaceNudgeSignals>,
}

/// Body of `POST /api/face/nudge/verify`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FaceNudgeVerifyRequest {
    pub t_ms: i64,
    pub reason: String,
    pub severity: String,
    pub fallback_text: String,
    #[serde(default)]
    pub signals: Option<FaceNudgeSignals>,
    pub image: FaceNudgeImage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacePhraseDecision {
    pub abstain: bool,
    pub text: String,
    pub cooldown_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceVerifyDecision {
    pub verified: bool,
    pub abstain: bool,
    pub text: String,
    pub cooldown_ms: u64,
}

/// Model output before defaults and clamping are applied.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawNudge {
    verified: bool,
    abstain: bool,
    text: String,
    cooldown_ms: Option<u64>,
}

impl LenientDecode for RawNudge {
    fn lenient(payload: &Payload) -> Self {
        Self {
            verified: coerce_bool(payload.get("verified")).unwrap_or(false),
            abstain: coerce_bool(payload.get("abstain")).unwrap_or(false),
            text: string_field(payload, "text"),
            cooldown_ms: non_negative_int(payload.get("cooldown_ms")),
        }
    }

    fn normalize(mut self) -> Self {
        self.text = clamp_phrase(&self.text, PHRASE_MAX_WORDS, PHRASE_MAX_CHARS);
        self
    }
}

fn nudge_schema(required: &[&str]) -> OutputSchema {
    let mut properties = json!({
        "abstain": {"type": "boolean"},
        "text": {"type": "string"},
        "cooldown_ms": {"type": "integer", "minimum": 0},
    });
    if required.contains(&"verified") {
        properties["verified"] = json!({"type": "boolean"});
    }
    OutputSchema::new(
        SCHEMA_NAME,
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        }),
    )
}

fn nudge_request(
    model: &str,
    system_prompt: &str,
    user_payload: &Value,
    schema: OutputSchema,
    budget: &OutputBudget,
) -> GenerationRequestBuilder {
    GenerationRequest::builder(model, schema)
        .system_prompt(system_prompt)
        .user_prompt(user_payload.to_string())
        .max_output_tokens(
            budget.max_output_tokens,
            TokenLimits::fixed(FACE_NUDGE_MAX_OUTPUT_TOKENS),
        )
        .temperature(FACE_NUDGE_TEMPERATURE)
        .timeout(FACE_NUDGE_TIMEOUT)
}

/// Rephrase a nudge the client already decided to show.
#[derive(Debug, Clone)]
pub struct FacePhraseTask {
    model: String,
    default_cooldown_ms: u64,
    user_payload: Value,
}

impl FacePhraseTask {
    pub fn new(
        model: impl Into<String>,
        default_cooldown_ms: u64,
        request: &FaceNudgePhraseRequest,
    ) -> Result<Self, InvalidTaskInput> {
        if let Some(signals) = &request.signals {
            signals.validate()?;
        }
        Ok(Self {
            model: model.into(),
            default_cooldown_ms,
            user_payload: json!({
                "t_ms": request.t_ms,
                "reason": request.reason,
                "severity": request.severity,
                "fallback_text": request.fallback_text,
                "context": request.context,
                "signals": request.signals,
            }),
        })
    }
}

impl StructuredTask for FacePhraseTask {
    type Output = FacePhraseDecision;

    fn name(&self) -> &'static str {
        "face nudge phrase"
    }

    fn initial_budget(&self) -> OutputBudget {
        OutputBudget::new(FACE_NUDGE_MAX_OUTPUT_TOKENS)
    }

    fn token_limits(&self) -> TokenLimits {
        TokenLimits::fixed(FACE_NUDGE_MAX_OUTPUT_TOKENS)
    }

    fn build_request(&self, budget: &OutputBudget) -> GenerationRequest {
        nudge_request(
            &self.model,
            PHRASE_SYSTEM_PROMPT,
            &self.user_payload,
            nudge_schema(&["abstain", "text"]),
            budget,
        )
        .build()
    }

    fn coerce(&self, payload: Payload) -> FacePhraseDecision {
        let raw: RawNudge = decode(payload);
        FacePhraseDecision {
            abstain: raw.abstain,
            text: if raw.abstain { String::new() } else { raw.text },
            cooldown_ms: raw.cooldown_ms.unwrap_or(self.default_cooldown_ms),
        }
    }
}

/// Confirm a nudge against a cropped face keyframe.
#[derive(Debug, Clone)]
pub struct FaceVerifyTask {
    model: String,
    default_cooldown_ms: u64,
    user_payload: Value,
    image: ImageAttachment,
}

impl FaceVerifyTask {
    pub fn new(
        model: impl Into<String>,
        default_cooldown_ms: u64,
        request: &FaceNudgeVerifyRequest,
    ) -> Result<Self, InvalidTaskInput> {
        if let Some(signals) = &request.signals {
            signals.validate()?;
        }
        let image = request.image.validate()?;
        Ok(Self {
            model: model.into(),
            default_cooldown_ms,
            user_payload: json!({
                "t_ms": request.t_ms,
                "reason": request.reason,
                "severity": request.severity,
                "fallback_text": request.fallback_text,
                "signals": request.signals,
            }),
            image,
        })
    }
}

impl StructuredTask for FaceVerifyTask {
    type Output = FaceVerifyDecision;

    fn name(&self) -> &'static str {
        "face nudge verify"
    }

    fn initial_budget(&self) -> OutputBudget {
        OutputBudget::new(FACE_NUDGE_MAX_OUTPUT_TOKENS)
    }

    fn token_limits(&self) -> TokenLimits {
        TokenLimits::fixed(FACE_NUDGE_MAX_OUTPUT_TOKENS)
    }

    fn build_request(&self, budget: &OutputBudget) -> GenerationRequest {
        nudge_request(
            &self.model,
            VERIFY_SYSTEM_PROMPT,
            &self.user_payload,
            nudge_schema(&["verified", "abstain", "text"]),
            budget,
        )
        .image(self.image.clone())
        .build()
    }

    fn coerce(&self, payload: Payload) -> FaceVerifyDecision {
        let raw: RawNudge = decode(payload);
        let show = raw.verified && !raw.abstain;
        FaceVerifyDecision {
            verified: raw.verified,
            abstain: raw.abstain,
            text: if show { raw.text } else { String::new() },
            cooldown_ms: raw.cooldown_ms.unwrap_or(self.default_cooldown_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::generation::pipeline::testing::ScriptedBackend;
    use crate::core::generation::run_task;
    use crate::core::openai::UpstreamError;

    fn phrase_request() -> FaceNudgePhraseRequest {
        FaceNudgePhraseRequest {
            t_ms: 1500,
            reason: "face_out_of_frame".to_string(),
            severity: "gentle".to_string(),
            fallback_text: "Re-center in frame".to_string(),
            context: Some(FaceNudgeContext {
                mode: Some("coach".to_string()),
                ..Default::default()
            }),
            signals: Some(FaceNudgeSignals {
                face_present: Some(0.4),
                ..Default::default()
            }),
        }
    }

    fn verify_request() -> FaceNudgeVerifyRequest {
        FaceNudgeVerifyRequest {
            t_ms: 1500,
            reason: "low_light".to_string(),
            severity: "firm".to_string(),
            fallback_text: "Find better light".to_string(),
            signals: None,
            image: FaceNudgeImage {
                mime_type: "image/jpeg".to_string(),
                base64: BASE64.encode(b"jpeg bytes"),
            },
        }
    }

    fn phrase_task() -> FacePhraseTask {
        FacePhraseTask::new("gpt-4o-mini", DEFAULT_FACE_NUDGE_COOLDOWN_MS, &phrase_request())
            .unwrap()
    }

    fn verify_task() -> FaceVerifyTask {
        FaceVerifyTask::new("gpt-4o-mini", DEFAULT_FACE_NUDGE_COOLDOWN_MS, &verify_request())
            .unwrap()
    }

    fn payload(value: Value) -> Payload {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_phrase_request_shape() {
        let task = phrase_task();
        let request = task.build_request(&task.initial_budget());
        let body = request.to_body();

        assert_eq!(body["max_output_tokens"], 120);
        assert_eq!(body["text"]["format"]["name"], "face_nudge_response");
        assert_eq!(body["text"]["format"]["strict"], false);
        assert_eq!(
            body["text"]["format"]["schema"]["required"],
            json!(["abstain", "text"])
        );
        assert_eq!(body["input"][1]["content"].as_array().unwrap().len(), 1);
        assert_eq!(request.timeout(), FACE_NUDGE_TIMEOUT);

        let user: Value = serde_json::from_str(request.user_prompt()).unwrap();
        assert_eq!(user["t_ms"], 1500);
        assert_eq!(user["context"]["mode"], "coach");
        assert_eq!(user["signals"]["face_present"], 0.4);
        assert!(user["signals"]["framing"].is_null());
    }

    #[test]
    fn test_verify_request_carries_keyframe() {
        let task = verify_task();
        let body = task.build_request(&task.initial_budget()).to_body();
        let content = &body["input"][1]["content"];

        assert_eq!(content[1]["type"], "input_image");
        assert!(content[1]["image_url"]
            .as_str()
            .unwrap()
            .starts_with("data:image/jpeg;base64,"));
        assert_eq!(
            body["text"]["format"]["schema"]["required"],
            json!(["verified", "abstain", "text"])
        );
        let user: Value = serde_json::from_str(content[0]["text"].as_str().unwrap()).unwrap();
        assert!(user.get("context").is_none());
    }

    #[test]
    fn test_out_of_range_signal_is_rejected() {
        let mut request = phrase_request();
        request.signals = Some(FaceNudgeSignals {
            lighting: Some(1.5),
            ..Default::default()
        });
        let err = FacePhraseTask::new("m", 12_000, &request).unwrap_err();
        assert!(err.to_string().contains("signals.lighting"));
    }

    #[test]
    fn test_non_image_or_bad_base64_is_rejected() {
        let mut request = verify_request();
        request.image.mime_type = "text/plain".to_string();
        assert!(FaceVerifyTask::new("m", 12_000, &request).is_err());

        let mut request = verify_request();
        request.image.base64 = "***".to_string();
        assert!(FaceVerifyTask::new("m", 12_000, &request).is_err());
    }

    #[test]
    fn test_phrase_is_clamped() {
        let decision = phrase_task().coerce(payload(json!({
            "abstain": false,
            "text": "  please   look at the camera and keep your chin up while you answer this question  ",
            "cooldown_ms": 8000,
        })));

        assert!(!decision.abstain);
        assert_eq!(decision.text.split_whitespace().count(), 10);
        assert!(decision.text.chars().count() <= 80);
        assert_eq!(decision.text, decision.text.trim_end());
        assert_eq!(decision.cooldown_ms, 8000);
    }

    #[test]
    fn test_abstain_clears_text_and_defaults_cooldown() {
        let decision = phrase_task().coerce(payload(json!({
            "abstain": "true",
            "text": "Look up",
            "cooldown_ms": -1,
        })));
        assert!(decision.abstain);
        assert!(decision.text.is_empty());
        assert_eq!(decision.cooldown_ms, DEFAULT_FACE_NUDGE_COOLDOWN_MS);
    }

    #[test]
    fn test_unverified_clears_text() {
        let decision = verify_task().coerce(payload(json!({
            "verified": false,
            "abstain": false,
            "text": "Find better light",
        })));
        assert!(!decision.verified);
        assert!(decision.text.is_empty());
        assert_eq!(decision.cooldown_ms, DEFAULT_FACE_NUDGE_COOLDOWN_MS);

        let decision = verify_task().coerce(payload(json!({
            "verified": true,
            "abstain": false,
            "text": "Find better light",
            "cooldown_ms": 5000,
        })));
        assert_eq!(decision.text, "Find better light");
        assert_eq!(decision.cooldown_ms, 5000);
    }

    #[test]
    fn test_configured_default_cooldown() {
        let task = FacePhraseTask::new("m", 3000, &phrase_request()).unwrap();
        let decision = task.coerce(payload(json!({"abstain": false, "text": "Sit up"})));
        assert_eq!(decision.cooldown_ms, 3000);
    }

    #[tokio::test]
    async fn test_incomplete_verify_fails() {
        let backend = ScriptedBackend::new(vec![Ok(json!({
            "status": "incomplete",
            "incomplete_details": {"reason": "max_output_tokens"},
        }))]);
        let err = run_task(&backend, &verify_task()).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Incomplete { .. }));
        assert_eq!(backend.requests().len(), 1);
    }
}
