//! Recorded practice sessions: upload, transcript lookup, delete.

use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;

use axum::{
    Json,
    extract::multipart::{Field, MultipartRejection},
    extract::{Multipart, Path, State},
    http::StatusCode,
};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::core::session_store::{Session, SessionMetadata, SessionStatus};
use crate::core::transcription::{AudioUpload, WordTiming, transcribe_file};
use crate::errors::app_error::{AppError, AppResult};
use crate::state::AppState;

/// Upper bound on a multipart session upload.
pub const MAX_SESSION_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

const DEFAULT_AUDIO_FILE_NAME: &str = "session.webm";
const DEFAULT_AUDIO_SUFFIX: &str = "webm";

#[derive(Debug, Serialize)]
pub struct SessionTranscriptResponse {
    pub session_id: String,
    pub status: SessionStatus,
    pub transcript_text: Option<String>,
    pub word_timings: Option<Vec<WordTiming>>,
}

impl From<&Session> for SessionTranscriptResponse {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.id.clone(),
            status: session.status,
            transcript_text: session.transcript_text.clone(),
            word_timings: session.word_timings.clone(),
        }
    }
}

/// Audio written to the spool directory.
struct SpooledAudio {
    upload: AudioUpload,
}

impl SpooledAudio {
    async fn remove(&self) {
        match tokio::fs::remove_file(&self.upload.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %self.upload.path.display(),
                "Failed to remove session audio: {e}"
            ),
        }
    }
}

/// Extension for the spooled file, from the uploaded name when it is plain.
fn audio_suffix(file_name: &str) -> &str {
    FsPath::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or(DEFAULT_AUDIO_SUFFIX)
}

async fn spool_audio(dir: &FsPath, mut field: Field<'_>) -> AppResult<SpooledAudio> {
    let file_name = field
        .file_name()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_AUDIO_FILE_NAME)
        .to_string();
    let mime_type = field.content_type().map(str::to_string);
    let path: PathBuf = dir.join(format!("{}.{}", Uuid::new_v4(), audio_suffix(&file_name)));

    let persist_error =
        |e: std::io::Error| AppError::Internal(format!("Failed to persist audio: {e}"));
    let mut file = tokio::fs::File::create(&path).await.map_err(persist_error)?;
    let spooled = SpooledAudio {
        upload: AudioUpload {
            path,
            file_name,
            mime_type,
        },
    };

    let mut written: u64 = 0;
    loop {
        let chunk = match field.chunk().await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(e) => {
                drop(file);
                spooled.remove().await;
                return Err(e.into());
            }
        };
        if let Err(e) = file.write_all(&chunk).await {
            drop(file);
            spooled.remove().await;
            return Err(persist_error(e));
        }
        written += chunk.len() as u64;
    }
    if let Err(e) = file.flush().await {
        drop(file);
        spooled.remove().await;
        return Err(persist_error(e));
    }

    info!(
        path = %spooled.upload.path.display(),
        bytes = written,
        "Spooled session audio"
    );
    Ok(spooled)
}

/// Upload a finished session recording with its metadata, transcribe it and
/// return the transcript with word timings.
pub async fn upload_session(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<SessionTranscriptResponse>> {
    state.openai.ensure_configured()?;
    let mut multipart = multipart?;

    let mut metadata_json: Option<String> = None;
    let mut audio: Option<SpooledAudio> = None;
    let audio_dir = state.config.session_audio_dir();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                if let Some(audio) = &audio {
                    audio.remove().await;
                }
                return Err(e.into());
            }
        };
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("metadata") => match field.text().await {
                Ok(text) => metadata_json = Some(text),
                Err(e) => {
                    if let Some(audio) = &audio {
                        audio.remove().await;
                    }
                    return Err(e.into());
                }
            },
            Some("audio") if audio.is_none() => audio = Some(spool_audio(&audio_dir, field).await?),
            _ => {}
        }
    }

    let metadata = metadata_json
        .as_deref()
        .and_then(|raw| serde_json::from_str::<SessionMetadata>(raw).ok());
    let (metadata, audio) = match (metadata, audio) {
        (Some(metadata), Some(audio)) => (metadata, audio),
        (None, audio) => {
            if let Some(audio) = audio {
                audio.remove().await;
            }
            return Err(AppError::InvalidInput("Invalid metadata JSON".to_string()));
        }
        (Some(_), None) => {
            return Err(AppError::InvalidInput("audio file is required.".to_string()));
        }
    };

    let mut session = Session::new(metadata);
    session.audio_path = Some(audio.upload.path.clone());
    session.status = SessionStatus::Processing;
    state.sessions.save(session.clone()).await;
    info!(
        session_id = %session.id,
        mode = ?session.metadata.mode,
        segments = session.metadata.transcript.len(),
        "Transcribing uploaded session"
    );

    let result = transcribe_file(
        &state.openai,
        &state.config.session_transcription_model,
        &audio.upload,
    )
    .await;

    let outcome = match result {
        Ok(transcription) => {
            session.transcript_text = Some(transcription.text);
            session.word_timings = Some(transcription.words);
            session.status = SessionStatus::Complete;
            Ok(())
        }
        Err(e) => {
            error!(session_id = %session.id, "Session transcription failed: {e}");
            session.status = SessionStatus::Error;
            session.error = Some(e.to_string());
            Err(AppError::from(e))
        }
    };

    if !state.config.keep_session_audio {
        audio.remove().await;
        session.audio_path = None;
    }
    state.sessions.save(session.clone()).await;
    info!(
        session_id = %session.id,
        status = session.status.as_str(),
        audio_kept = session.audio_path.is_some(),
        "Session processed"
    );

    outcome.map(|()| Json(SessionTranscriptResponse::from(&session)))
}

/// Stored transcript for a session.
pub async fn get_transcript(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> AppResult<Json<SessionTranscriptResponse>> {
    let session = state
        .sessions
        .get(&session_id)
        .await
        .ok_or_else(|| AppError::NotFound("Session not found".to_string()))?;
    Ok(Json(SessionTranscriptResponse::from(&session)))
}

/// Drop a session and any audio kept for it. Unknown ids are a no-op.
pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> StatusCode {
    let audio_path = state
        .sessions
        .get(&session_id)
        .await
        .and_then(|session| session.audio_path);

    if let Some(path) = audio_path {
        if let Err(e) = tokio::fs::remove_file(&path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(session_id = %session_id, "Failed to remove session audio: {e}");
            }
        }
    }
    if state.sessions.delete(&session_id).await {
        info!(session_id = %session_id, "Deleted session");
    }
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_suffix() {
        assert_eq!(audio_suffix("take-1.wav"), "wav");
        assert_eq!(audio_suffix("recording"), "webm");
        assert_eq!(audio_suffix("../../etc/passwd"), "webm");
        assert_eq!(audio_suffix("clip.we bm"), "webm");
    }
}
