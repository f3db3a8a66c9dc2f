//! List command implementation.

use crate::cli::Output;
use crate::config::AppContext;
use crate::pipeline::BlogRecord;
use anyhow::Result;
use std::sync::Arc;

/// Run the list command.
pub fn run_list(ctx: Arc<AppContext>) -> Result<()> {
    let blogs_dir = ctx.snapshot().blogs_dir();

    match BlogRecord::load_all(&blogs_dir) {
        Ok(records) => {
            if records.is_empty() {
                Output::info("No posts generated yet. Use 'tubecast generate <url>' to create one.");
            } else {
                Output::header(&format!("Generated Posts ({})", records.len()));

                for record in &records {
                    Output::blog_item(
                        &record.title,
                        &record.id,
                        &record.model_used,
                        record.has_audio,
                        &record.content,
                    );
                }

                let with_audio = records.iter().filter(|r| r.has_audio).count();
                println!();
                Output::kv("Total posts", &records.len().to_string());
                Output::kv("With audio", &with_audio.to_string());
                Output::kv("Directory", &blogs_dir.display().to_string());
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to list posts: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
