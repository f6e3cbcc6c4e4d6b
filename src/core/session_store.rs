//! Practice session bookkeeping.
//!
//! Sessions live behind [`SessionStore`] so the in-memory map can be swapped
//! for an external key-value store. Writes are last-write-wins per id.

use std::path::PathBuf;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::core::transcription::WordTiming;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Pending,
    Processing,
    Complete,
    Error,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Ai,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    Coach,
    Journalist,
}

/// One line of the live transcript captured by the client. Times are in
/// milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptSegment {
    pub text: String,
    pub speaker: Speaker,
    pub start_time: f64,
    pub end_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMetadata {
    pub session_id: String,
    #[serde(default)]
    pub scenario_id: Option<String>,
    pub mode: SessionMode,
    pub transcript: Vec<TranscriptSegment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub metadata: SessionMetadata,
    pub audio_path: Option<PathBuf>,
    pub transcript_text: Option<String>,
    pub word_timings: Option<Vec<WordTiming>>,
    pub status: SessionStatus,
    pub error: Option<String>,
}

impl Session {
    pub fn new(metadata: SessionMetadata) -> Self {
        Self {
            id: metadata.session_id.clone(),
            metadata,
            audio_path: None,
            transcript_text: None,
            word_timings: None,
            status: SessionStatus::Pending,
            error: None,
        }
    }
}

/// Get/save/delete access to sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, session_id: &str) -> Option<Session>;

    async fn save(&self, session: Session);

    /// Returns whether a session was removed.
    async fn delete(&self, session_id: &str) -> bool;
}

#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<String, Session>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, session_id: &str) -> Option<Session> {
        self.sessions.get(session_id).map(|entry| entry.value().clone())
    }

    async fn save(&self, session: Session) {
        self.sessions.insert(session.id.clone(), session);
    }

    async fn delete(&self, session_id: &str) -> bool {
        self.sessions.remove(session_id).is_some()
    }
}
