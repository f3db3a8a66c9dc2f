//! Voices command implementation.

use crate::cli::Output;
use crate::config::AppContext;
use crate::narration::available_voices;
use anyhow::Result;
use std::sync::Arc;

/// Run the voices command.
pub fn run_voices(ctx: Arc<AppContext>) -> Result<()> {
    let tts = ctx.snapshot().tts;

    for (engine, voices) in available_voices() {
        Output::header(&format!("{} voices", engine));
        for voice in voices {
            let current = voice.id == tts.voice || voice.id == tts.openai_voice;
            let marker = if current { " (current)" } else { "" };
            Output::list_item(&format!("{} - {}{}", voice.id, voice.description, marker));
        }
    }
    println!();
    Output::info("Change with: tubecast config set tts.voice <id> (or tts.openai_voice)");

    Ok(())
}
