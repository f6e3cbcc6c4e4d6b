use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::core::openai::{OpenAIClient, UpstreamError};

use super::envelope::{Payload, ResponseEnvelope};
use super::policy::{self, CONDENSED_INSTRUCTION, OutputBudget, RetryPolicy, Verdict};
use super::request::{GenerationRequest, TokenLimits};

/// Path of the Responses API relative to the OpenAI base URL.
pub const RESPONSES_PATH: &str = "responses";

/// Anything that can answer a [`GenerationRequest`] with a raw envelope.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn create_response(
        &self,
        request: &GenerationRequest,
    ) -> Result<ResponseEnvelope, UpstreamError>;
}

#[async_trait]
impl GenerationBackend for OpenAIClient {
    async fn create_response(
        &self,
        request: &GenerationRequest,
    ) -> Result<ResponseEnvelope, UpstreamError> {
        let raw = self
            .post_json(RESPONSES_PATH, &request.to_body(), request.timeout())
            .await?;
        Ok(ResponseEnvelope::new(raw))
    }
}

/// A structured-output task run through [`run_task`].
///
/// Implementations render their prompts from an [`OutputBudget`], so a
/// shrunk retry asks for fewer items by construction.
pub trait StructuredTask: Send + Sync {
    type Output: Send;

    /// Short name used in logs and error messages, e.g. `"scenario"`.
    fn name(&self) -> &'static str;

    fn initial_budget(&self) -> OutputBudget;

    fn token_limits(&self) -> TokenLimits;

    fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::Never
    }

    fn build_request(&self, budget: &OutputBudget) -> GenerationRequest;

    fn coerce(&self, payload: Payload) -> Self::Output;
}

/// Run `task` against `backend`: build, call, check completion, retry at
/// most once, extract and coerce.
pub async fn run_task<T>(
    backend: &dyn GenerationBackend,
    task: &T,
) -> Result<T::Output, UpstreamError>
where
    T: StructuredTask,
{
    let mut budget = task.initial_budget();
    let mut attempt = 0;

    let envelope = loop {
        let mut request = task.build_request(&budget);
        if budget.condensed {
            request = request.with_appended_instruction(CONDENSED_INSTRUCTION);
        }

        info!(
            task = task.name(),
            attempt,
            model = request.model(),
            max_output_tokens = request.max_output_tokens(),
            "Requesting structured generation"
        );
        let envelope = backend.create_response(&request).await?;

        match policy::evaluate(&envelope.status(), attempt, task.retry_policy()) {
            Verdict::Accept => break envelope,
            Verdict::Retry => {
                budget = budget.shrink(task.token_limits());
                warn!(
                    task = task.name(),
                    max_output_tokens = budget.max_output_tokens,
                    max_list_items = ?budget.max_list_items,
                    "Response truncated by token budget, retrying with condensed output"
                );
                attempt += 1;
            }
            Verdict::Fail(err) => {
                error!(task = task.name(), attempt, "{}", err);
                return Err(err);
            }
        }
    };

    let payload = envelope
        .extract_payload()
        .filter(|payload| !payload.is_empty())
        .ok_or_else(|| {
            error!(task = task.name(), "Completed response carried no JSON payload");
            UpstreamError::MalformedPayload(format!(
                "Failed to parse {} response payload.",
                task.name()
            ))
        })?;

    debug!(task = task.name(), fields = payload.len(), "Payload extracted");
    Ok(task.coerce(payload))
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted backend shared by task tests.

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use serde_json::Value;

    use super::*;

    #[derive(Default)]
    pub struct ScriptedBackend {
        responses: Mutex<VecDeque<Result<Value, UpstreamError>>>,
        requests: Mutex<Vec<GenerationRequest>>,
    }

    impl ScriptedBackend {
        pub fn new(responses: Vec<Result<Value, UpstreamError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn requests(&self) -> Vec<GenerationRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GenerationBackend for ScriptedBackend {
        async fn create_response(
            &self,
            request: &GenerationRequest,
        ) -> Result<ResponseEnvelope, UpstreamError> {
            self.requests.lock().unwrap().push(request.clone());
            let next = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("no scripted response left");
            next.map(ResponseEnvelope::new)
        }
    }
}
