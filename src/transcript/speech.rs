//! Speech-to-text for videos without captions.

use crate::config::AppContext;
use crate::error::{Result, TubecastError};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Transcribes an audio file.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Whether the provider is configured right now.
    fn is_enabled(&self) -> bool;

    async fn transcribe(&self, audio_path: &Path) -> Result<String>;
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Groq hosted Whisper.
pub struct GroqWhisper {
    ctx: Arc<AppContext>,
}

impl GroqWhisper {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl SpeechToText for GroqWhisper {
    fn is_enabled(&self) -> bool {
        !self.ctx.snapshot().groq.api_key.trim().is_empty()
    }

    async fn transcribe(&self, audio_path: &Path) -> Result<String> {
        let settings = self.ctx.snapshot().groq;
        let client = crate::http::build_client(Duration::from_secs(settings.transcription_timeout_seconds))?;

        let bytes = tokio::fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio.m4a".to_string());
        tracing::info!(file = %file_name, size_bytes = bytes.len(), model = %settings.transcription_model, "Transcribing audio");

        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name))
            .text("model", settings.transcription_model.clone())
            .text("response_format", "json");

        let response = client
            .post(format!(
                "{}/audio/transcriptions",
                settings.base_url.trim_end_matches('/')
            ))
            .bearer_auth(&settings.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(TubecastError::Transcription(format!(
                "HTTP {}: {}",
                status,
                crate::http::truncate_chars(&body, 300)
            )));
        }

        let parsed: TranscriptionResponse = serde_json::from_str(&body)
            .map_err(|e| TubecastError::Transcription(format!("Unexpected response: {}", e)))?;
        Ok(parsed.text.trim().to_string())
    }
}
