//! Speak command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{AppContext, TtsEngine};
use crate::narration::Narrator;
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

/// Run the speak command.
pub async fn run_speak(file: &str, output: &str, engine: Option<String>, ctx: Arc<AppContext>) -> Result<()> {
    let engine = engine
        .map(|e| e.parse::<TtsEngine>())
        .transpose()
        .map_err(|e| anyhow::anyhow!(e))?;

    if let Err(e) = preflight::check(Operation::Narrate, &ctx.snapshot()) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let text = std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file))?;
    let narrator = Narrator::new(ctx);

    let spinner = Output::spinner("Synthesizing narration...");
    let ok = narrator.synthesize_audio(&text, Path::new(output), engine).await;
    spinner.finish_and_clear();

    if ok {
        Output::success(&format!("Narration written to {}", output));
        Ok(())
    } else {
        Output::error("Narration failed. Run with -v for details.");
        Err(anyhow::anyhow!("narration failed"))
    }
}
