//! Info command implementation.

use crate::cli::output::format_duration;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::AppContext;
use crate::http::truncate_chars;
use crate::video::{VideoReference, VideoSource, YtDlp};
use anyhow::Result;
use std::sync::Arc;

/// Run the info command.
pub async fn run_info(input: &str, ctx: Arc<AppContext>) -> Result<()> {
    let video = VideoReference::parse(input)?;
    preflight::check(Operation::FetchVideo, &ctx.snapshot())?;

    let metadata = YtDlp::new().fetch_metadata(&video).await?;

    Output::header(&metadata.title);
    Output::kv("ID", &metadata.id);
    Output::kv("Channel", &metadata.channel);
    if let Some(duration) = metadata.duration_seconds {
        Output::kv("Duration", &format_duration(duration));
    }
    if let Some(date) = metadata.upload_date {
        Output::kv("Uploaded", &date.to_string());
    }
    if let Some(thumbnail) = &metadata.thumbnail_url {
        Output::kv("Thumbnail", thumbnail);
    }
    Output::kv("URL", &metadata.url);
    if !metadata.description.is_empty() {
        println!();
        println!("{}", truncate_chars(&metadata.description, 500));
    }

    Ok(())
}
