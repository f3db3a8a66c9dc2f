//! Generate command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::AppContext;
use crate::pipeline::{BlogRecord, Pipeline};
use anyhow::Result;
use std::sync::Arc;

/// Run the generate command.
pub async fn run_generate(input: &str, no_audio: bool, ctx: Arc<AppContext>) -> Result<()> {
    let settings = ctx.snapshot();
    if let Err(e) = preflight::check(Operation::FetchVideo, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'tubecast doctor' for detailed diagnostics.");
        return Err(e.into());
    }
    if !no_audio {
        if let Err(e) = preflight::check(Operation::Narrate, &settings) {
            Output::warning(&format!("{}. Narration will likely fail.", e));
        }
    }

    Output::info(&format!("Processing: {}", input));
    let pipeline = Pipeline::new(ctx)?;

    let spinner = Output::spinner("Fetching transcript and writing post...");
    let result = pipeline.process_video(input, !no_audio).await;
    spinner.finish_and_clear();

    let record = match result {
        Ok(record) => record,
        Err(e) => {
            Output::error(&format!("Failed to process '{}': {}", input, e));
            return Err(e.into());
        }
    };

    Output::success(&format!("Generated '{}'", record.title));
    Output::kv("ID", &record.id);
    Output::kv("Model", &record.model_used);
    Output::kv("Transcript", &format!("{} chars", record.transcript_length));
    Output::kv(
        "Markdown",
        &BlogRecord::markdown_path(&settings.blogs_dir(), &record.id).display().to_string(),
    );
    if record.has_audio {
        Output::kv(
            "Audio",
            &BlogRecord::audio_path(&settings.audio_dir(), &record.id).display().to_string(),
        );
    } else if !no_audio {
        Output::warning("No narration was produced.");
    }

    Ok(())
}
