//! Schema-constrained request construction for the Responses API.
//!
//! A [`GenerationRequest`] is a complete, self-contained description of one
//! structured-output call. It is built fresh for every attempt and rendered
//! to the wire body by [`GenerationRequest::to_body`].

use std::time::Duration;

use serde_json::{Value, json};

/// Default per-call timeout for structured generation.
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Inclusive bounds on the output token ceiling of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLimits {
    pub min: u32,
    pub max: u32,
}

impl TokenLimits {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Limits that pin the ceiling to a single value.
    pub const fn fixed(tokens: u32) -> Self {
        Self::new(tokens, tokens)
    }

    pub fn clamp(&self, tokens: u32) -> u32 {
        tokens.clamp(self.min, self.max.max(self.min))
    }
}

/// An inline image sent alongside the user prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub mime_type: String,
    pub base64: String,
}

impl ImageAttachment {
    pub fn new(mime_type: impl Into<String>, base64: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            base64: base64.into(),
        }
    }

    /// `data:` URI understood by the `input_image` content block.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64)
    }
}

/// JSON Schema the model output must conform to.
///
/// The root always carries `additionalProperties: false` so the model cannot
/// add fields the caller does not know about.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    name: String,
    schema: Value,
    strict: bool,
}

impl OutputSchema {
    pub fn new(name: impl Into<String>, mut schema: Value) -> Self {
        if let Value::Object(root) = &mut schema {
            root.insert("additionalProperties".to_string(), Value::Bool(false));
        }
        Self {
            name: name.into(),
            schema,
            strict: false,
        }
    }

    /// Ask the API to enforce the schema strictly.
    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Value {
        &self.schema
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }
}

/// One structured-output call against the Responses API.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    model: String,
    system_prompt: String,
    user_prompt: String,
    schema: OutputSchema,
    max_output_tokens: u32,
    image: Option<ImageAttachment>,
    web_search: bool,
    reasoning_effort: Option<String>,
    temperature: Option<f32>,
    timeout: Duration,
}

impl GenerationRequest {
    pub fn builder(model: impl Into<String>, schema: OutputSchema) -> GenerationRequestBuilder {
        GenerationRequestBuilder {
            request: GenerationRequest {
                model: model.into(),
                system_prompt: String::new(),
                user_prompt: String::new(),
                schema,
                max_output_tokens: 0,
                image: None,
                web_search: false,
                reasoning_effort: None,
                temperature: None,
                timeout: DEFAULT_GENERATION_TIMEOUT,
            },
            limits: None,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn user_prompt(&self) -> &str {
        &self.user_prompt
    }

    pub fn schema(&self) -> &OutputSchema {
        &self.schema
    }

    pub fn max_output_tokens(&self) -> u32 {
        self.max_output_tokens
    }

    pub fn image(&self) -> Option<&ImageAttachment> {
        self.image.as_ref()
    }

    pub fn uses_web_search(&self) -> bool {
        self.web_search
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// A copy of this request whose user prompt ends with `instruction`.
    pub fn with_appended_instruction(&self, instruction: &str) -> Self {
        let mut next = self.clone();
        if !next.user_prompt.is_empty() {
            next.user_prompt.push_str("\n\n");
        }
        next.user_prompt.push_str(instruction);
        next
    }

    /// Render the Responses API request body.
    pub fn to_body(&self) -> Value {
        let mut user_content = vec![json!({"type": "input_text", "text": self.user_prompt})];
        if let Some(image) = &self.image {
            user_content.push(json!({"type": "input_image", "image_url": image.data_url()}));
        }

        let mut body = json!({
            "model": self.model,
            "input": [
                {
                    "role": "system",
                    "content": [{"type": "input_text", "text": self.system_prompt}],
                },
                {
                    "role": "user",
                    "content": user_content,
                },
            ],
            "text": {
                "format": {
                    "type": "json_schema",
                    "name": self.schema.name,
                    "schema": self.schema.schema,
                    "strict": self.schema.strict,
                }
            },
            "max_output_tokens": self.max_output_tokens,
            "store": false,
        });

        if self.web_search {
            body["tools"] = json!([{"type": "web_search"}]);
            body["tool_choice"] = json!("auto");
        }
        if let Some(effort) = &self.reasoning_effort {
            body["reasoning"] = json!({"effort": effort});
        }
        if let Some(temperature) = self.temperature {
            body["temperature"] = json!(temperature);
        }

        body
    }
}

/// Builder for [`GenerationRequest`].
#[derive(Debug, Clone)]
pub struct GenerationRequestBuilder {
    request: GenerationRequest,
    limits: Option<TokenLimits>,
}

impl GenerationRequestBuilder {
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.request.system_prompt = prompt.into();
        self
    }

    pub fn user_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.request.user_prompt = prompt.into();
        self
    }

    /// Output token ceiling, clamped to `limits`.
    pub fn max_output_tokens(mut self, tokens: u32, limits: TokenLimits) -> Self {
        self.request.max_output_tokens = tokens;
        self.limits = Some(limits);
        self
    }

    pub fn image(mut self, image: ImageAttachment) -> Self {
        self.request.image = Some(image);
        self
    }

    /// Let the model call the hosted web search tool.
    pub fn web_search(mut self) -> Self {
        self.request.web_search = true;
        self
    }

    pub fn reasoning_effort(mut self, effort: impl Into<String>) -> Self {
        self.request.reasoning_effort = Some(effort.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.request.temperature = Some(temperature);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.request.timeout = timeout;
        self
    }

    pub fn build(mut self) -> GenerationRequest {
        if let Some(limits) = self.limits {
            self.request.max_output_tokens = limits.clamp(self.request.max_output_tokens);
        }
        self.request
    }
}
