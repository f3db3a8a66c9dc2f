//! Narration synthesis.
//!
//! Cleans markdown and hands it to a TTS engine. The paid OpenAI engine is
//! used when selected and configured; anything it cannot handle falls back to
//! the free Edge engine.

mod clean;
mod edge;
mod openai_tts;

pub use clean::clean_markdown;
pub use edge::EdgeSpeech;
pub use openai_tts::OpenAiSpeech;

use crate::capability::tts_enabled;
use crate::config::{AppContext, TtsEngine};
use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// A TTS backend writing audio to a file.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    fn engine(&self) -> TtsEngine;

    /// Write narration of already cleaned `text` to `output`.
    async fn synthesize(&self, text: &str, output: &Path) -> Result<()>;
}

/// A selectable voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceOption {
    pub id: &'static str,
    pub description: &'static str,
}

const EDGE_VOICES: &[VoiceOption] = &[
    VoiceOption { id: "zh-CN-XiaoxiaoNeural", description: "Xiaoxiao (Chinese, female)" },
    VoiceOption { id: "zh-CN-YunxiNeural", description: "Yunxi (Chinese, male)" },
    VoiceOption { id: "zh-CN-XiaoyiNeural", description: "Xiaoyi (Chinese, female)" },
    VoiceOption { id: "zh-CN-YunjianNeural", description: "Yunjian (Chinese, male)" },
    VoiceOption { id: "en-US-JennyNeural", description: "Jenny (English, female)" },
    VoiceOption { id: "en-US-GuyNeural", description: "Guy (English, male)" },
];

const OPENAI_VOICES: &[VoiceOption] = &[
    VoiceOption { id: "alloy", description: "Alloy (neutral)" },
    VoiceOption { id: "echo", description: "Echo (male)" },
    VoiceOption { id: "fable", description: "Fable (male)" },
    VoiceOption { id: "onyx", description: "Onyx (male)" },
    VoiceOption { id: "nova", description: "Nova (female)" },
    VoiceOption { id: "shimmer", description: "Shimmer (female)" },
];

/// Voices offered by each engine.
pub fn available_voices() -> Vec<(TtsEngine, &'static [VoiceOption])> {
    vec![(TtsEngine::Edge, EDGE_VOICES), (TtsEngine::OpenAi, OPENAI_VOICES)]
}

fn has_content(path: &Path) -> bool {
    std::fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false)
}

fn remove_partial(path: &Path) {
    if path.exists() {
        if let Err(e) = std::fs::remove_file(path) {
            warn!(error = %e, path = %path.display(), "Failed to remove partial audio");
        }
    }
}

/// Chooses an engine and produces the audio file.
pub struct Narrator {
    ctx: Arc<AppContext>,
    openai: Box<dyn SpeechEngine>,
    edge: Box<dyn SpeechEngine>,
}

impl Narrator {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self::with_engines(
            ctx.clone(),
            Box::new(OpenAiSpeech::new(ctx.clone())),
            Box::new(EdgeSpeech::new(ctx)),
        )
    }

    pub fn with_engines(ctx: Arc<AppContext>, openai: Box<dyn SpeechEngine>, edge: Box<dyn SpeechEngine>) -> Self {
        Self { ctx, openai, edge }
    }

    /// Narrate markdown `text` into `output`. Returns `true` only if a
    /// non-empty audio file was written.
    #[instrument(skip(self, text), fields(output = %output.display()))]
    pub async fn synthesize_audio(&self, text: &str, output: &Path, engine: Option<TtsEngine>) -> bool {
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(error = %e, "Cannot create output directory");
                return false;
            }
        }

        let cleaned = clean_markdown(text);
        if cleaned.is_empty() {
            warn!("Nothing to narrate after cleaning");
            return false;
        }

        let settings = self.ctx.snapshot();
        let engine = engine.unwrap_or(settings.tts.engine);

        if engine == TtsEngine::OpenAi && tts_enabled(&settings, TtsEngine::OpenAi) {
            let chars = cleaned.chars().count();
            if chars > settings.tts.openai_max_chars {
                info!(chars, limit = settings.tts.openai_max_chars, "Text too long for OpenAI TTS, using Edge");
            } else {
                match self.openai.synthesize(&cleaned, output).await {
                    Ok(()) if has_content(output) => {
                        info!(engine = %self.openai.engine(), "Narration written");
                        return true;
                    }
                    Ok(()) => warn!("OpenAI TTS produced no audio, falling back to Edge"),
                    Err(e) => warn!(error = %e, "OpenAI TTS failed, falling back to Edge"),
                }
                remove_partial(output);
            }
        }

        match self.edge.synthesize(&cleaned, output).await {
            Ok(()) if has_content(output) => {
                info!(engine = %self.edge.engine(), "Narration written");
                true
            }
            Ok(()) => {
                warn!("Edge TTS produced no audio");
                remove_partial(output);
                false
            }
            Err(e) => {
                warn!(error = %e, "Edge TTS failed");
                remove_partial(output);
                false
            }
        }
    }
}
