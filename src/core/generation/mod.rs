//! Structured-generation pipeline shared by every Responses API task.
//!
//! Request builder → upstream call → envelope extraction → completion and
//! shrink-retry policy → lenient coercion → typed result.

pub mod coerce;
pub mod envelope;
pub mod pipeline;
pub mod policy;
pub mod request;

pub use coerce::{LenientDecode, clamp_phrase, decode, listify};
pub use envelope::{CompletionStatus, Payload, ResponseEnvelope};
pub use pipeline::{GenerationBackend, RESPONSES_PATH, StructuredTask, run_task};
pub use policy::{CONDENSED_INSTRUCTION, OutputBudget, RetryPolicy};
pub use request::{GenerationRequest, ImageAttachment, OutputSchema, TokenLimits};
