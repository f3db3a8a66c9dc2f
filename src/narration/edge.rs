//! Free Edge neural voices through the `edge-tts` command.

use super::SpeechEngine;
use crate::config::{AppContext, TtsEngine};
use crate::error::{Result, TubecastError};
use async_trait::async_trait;
use std::io::Write;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::debug;

pub struct EdgeSpeech {
    ctx: Arc<AppContext>,
}

impl EdgeSpeech {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl SpeechEngine for EdgeSpeech {
    fn engine(&self) -> TtsEngine {
        TtsEngine::Edge
    }

    async fn synthesize(&self, text: &str, output: &Path) -> Result<()> {
        let settings = self.ctx.snapshot().tts;

        // Long posts exceed argv limits, so the text goes through a file.
        let mut text_file = tempfile::Builder::new()
            .prefix("tubecast-tts-")
            .suffix(".txt")
            .tempfile()?;
        text_file.write_all(text.as_bytes())?;
        text_file.flush()?;

        debug!(voice = %settings.voice, chars = text.chars().count(), "Running edge-tts");
        let result = Command::new(&settings.edge_command)
            .arg("--voice")
            .arg(&settings.voice)
            .arg("--file")
            .arg(text_file.path())
            .arg("--write-media")
            .arg(output)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        match result {
            Ok(out) if out.status.success() => Ok(()),
            Ok(out) => {
                let err = String::from_utf8_lossy(&out.stderr);
                Err(TubecastError::Narration(format!("edge-tts failed: {}", err.trim())))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(TubecastError::ToolNotFound(settings.edge_command.clone()))
            }
            Err(e) => Err(TubecastError::Narration(format!("edge-tts error: {e}"))),
        }
    }
}
