//! OpenAI text-to-speech.

use super::SpeechEngine;
use crate::config::{AppContext, TtsEngine};
use crate::error::{Result, TubecastError};
use crate::openai::create_client;
use async_openai::types::{CreateSpeechRequestArgs, SpeechModel, SpeechResponseFormat, Voice};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

fn voice_from_name(name: &str) -> Voice {
    match name.to_lowercase().as_str() {
        "alloy" => Voice::Alloy,
        "echo" => Voice::Echo,
        "fable" => Voice::Fable,
        "onyx" => Voice::Onyx,
        "shimmer" => Voice::Shimmer,
        "nova" => Voice::Nova,
        other => {
            warn!(voice = other, "Unknown OpenAI voice, using nova");
            Voice::Nova
        }
    }
}

fn model_from_name(name: &str) -> SpeechModel {
    match name {
        "tts-1-hd" => SpeechModel::Tts1Hd,
        _ => SpeechModel::Tts1,
    }
}

/// Paid engine backed by the OpenAI `/audio/speech` endpoint.
pub struct OpenAiSpeech {
    ctx: Arc<AppContext>,
}

impl OpenAiSpeech {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl SpeechEngine for OpenAiSpeech {
    fn engine(&self) -> TtsEngine {
        TtsEngine::OpenAi
    }

    async fn synthesize(&self, text: &str, output: &Path) -> Result<()> {
        let settings = self.ctx.snapshot();
        let client = create_client(
            &settings.openai,
            Duration::from_secs(settings.tts.openai_timeout_seconds),
        )?;

        let request = CreateSpeechRequestArgs::default()
            .input(text)
            .voice(voice_from_name(&settings.tts.openai_voice))
            .model(model_from_name(&settings.tts.openai_model))
            .response_format(SpeechResponseFormat::Mp3)
            .build()
            .map_err(|e| TubecastError::Narration(format!("Failed to build request: {}", e)))?;

        debug!(chars = text.chars().count(), voice = %settings.tts.openai_voice, "Requesting OpenAI speech");
        let response = client
            .audio()
            .speech(request)
            .await
            .map_err(|e| TubecastError::OpenAI(format!("TTS API error: {}", e)))?;

        tokio::fs::write(output, &response.bytes).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_mapping() {
        assert!(matches!(voice_from_name("Onyx"), Voice::Onyx));
        assert!(matches!(voice_from_name("zh-CN-XiaoxiaoNeural"), Voice::Nova));
        assert!(matches!(model_from_name("tts-1-hd"), SpeechModel::Tts1Hd));
        assert!(matches!(model_from_name("tts-1"), SpeechModel::Tts1));
    }
}
