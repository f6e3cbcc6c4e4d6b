pub mod generation;
pub mod openai;
pub mod prompts;
pub mod realtime;
pub mod session_store;
pub mod tasks;
pub mod transcription;

pub use openai::{OpenAIClient, UpstreamError};
pub use session_store::{InMemorySessionStore, Session, SessionStore};
