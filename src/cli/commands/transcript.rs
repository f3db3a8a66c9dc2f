//! Transcript command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::AppContext;
use crate::transcript::TranscriptPipeline;
use crate::video::VideoReference;
use anyhow::Result;
use std::sync::Arc;

/// Run the transcript command.
pub async fn run_transcript(
    input: &str,
    lang: Option<String>,
    output: Option<String>,
    ctx: Arc<AppContext>,
) -> Result<()> {
    let video = VideoReference::parse(input)?;
    if let Err(e) = preflight::check(Operation::FetchVideo, &ctx.snapshot()) {
        // The captions API works without yt-dlp, only the fallbacks need it.
        Output::warning(&format!("{}. Only the captions API will be tried.", e));
    }

    let language = lang.unwrap_or_else(|| ctx.snapshot().transcript.preferred_language);
    let pipeline = TranscriptPipeline::new(ctx)?;

    let spinner = Output::spinner("Fetching transcript...");
    let result = pipeline.get_transcript(&video, &language).await;
    spinner.finish_and_clear();

    let Some(transcript) = result else {
        Output::warning(&format!("No transcript, captions or description available for {}", video.id));
        return Ok(());
    };

    Output::info(&format!(
        "Source: {:?}, language: {}",
        transcript.provenance,
        transcript.language.as_deref().unwrap_or("unknown")
    ));

    match output {
        Some(path) => {
            std::fs::write(&path, &transcript.text)?;
            Output::success(&format!(
                "Transcript written to {} ({} chars)",
                path,
                transcript.text.chars().count()
            ));
        }
        None => println!("{}", transcript.text),
    }

    Ok(())
}
