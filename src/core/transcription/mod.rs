//! Recorded-session transcription through the OpenAI Audio API.
//!
//! Uploaded audio is spooled to disk by the HTTP layer and streamed from
//! there to `audio/transcriptions`, so a long recording is never held in
//! memory twice.

pub mod messages;

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use thiserror::Error;
use tokio_util::io::ReaderStream;
use tracing::info;

use crate::core::openai::{OpenAIClient, UpstreamError};

pub use messages::{TranscriptionResponse, WordTiming};

pub const TRANSCRIPTIONS_PATH: &str = "audio/transcriptions";
pub const TRANSCRIPTION_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_SESSION_TRANSCRIPTION_MODEL: &str = "whisper-1";
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("Failed to read session audio: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// An audio file on disk plus what the client said about it.
#[derive(Debug, Clone)]
pub struct AudioUpload {
    pub path: PathBuf,
    pub file_name: String,
    pub mime_type: Option<String>,
}

impl AudioUpload {
    /// Declared MIME type without parameters, else a guess from the file
    /// extension, else `application/octet-stream`.
    pub fn content_type(&self) -> String {
        normalize_mime_type(self.mime_type.as_deref())
            .or_else(|| guess_mime_type(&self.path).map(str::to_string))
            .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string())
    }
}

/// Strip parameters such as `;codecs=opus`. Blank input yields `None`.
pub fn normalize_mime_type(mime_type: Option<&str>) -> Option<String> {
    let base = mime_type?.split(';').next()?.trim();
    (!base.is_empty()).then(|| base.to_ascii_lowercase())
}

pub fn guess_mime_type(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match extension.as_str() {
        "webm" => "audio/webm",
        "wav" => "audio/wav",
        "mp3" | "mpeg" | "mpga" => "audio/mpeg",
        "mp4" | "m4a" => "audio/mp4",
        "ogg" | "oga" => "audio/ogg",
        "flac" => "audio/flac",
        _ => return None,
    };
    Some(mime)
}

/// Transcribe `upload` with word-level timestamps.
pub async fn transcribe_file(
    client: &OpenAIClient,
    model: &str,
    upload: &AudioUpload,
) -> Result<TranscriptionResponse, TranscriptionError> {
    client.ensure_configured()?;

    let file = tokio::fs::File::open(&upload.path).await?;
    let length = file.metadata().await?.len();
    let content_type = upload.content_type();

    let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
    let file_part = Part::stream_with_length(body, length)
        .file_name(upload.file_name.clone())
        .mime_str(&content_type)
        .map_err(|e| UpstreamError::InvalidRequest(format!("Invalid MIME type: {e}")))?;

    let form = Form::new()
        .part("file", file_part)
        .text("model", model.to_string())
        .text("response_format", "verbose_json")
        .text("timestamp_granularities[]", "word");

    info!(
        model,
        bytes = length,
        content_type = %content_type,
        file_name = %upload.file_name,
        "Transcribing session audio"
    );
    let raw = client
        .post_multipart(TRANSCRIPTIONS_PATH, form, TRANSCRIPTION_TIMEOUT)
        .await?;

    let response = serde_json::from_value(raw).map_err(|e| {
        UpstreamError::MalformedPayload(format!("Failed to parse transcription response: {e}"))
    })?;
    Ok(response)
}
