//! Channel command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::AppContext;
use crate::video::{VideoSource, YtDlp};
use anyhow::Result;
use std::sync::Arc;

/// Run the channel command.
pub async fn run_channel(url: &str, count: usize, ctx: Arc<AppContext>) -> Result<()> {
    preflight::check(Operation::FetchVideo, &ctx.snapshot())?;

    let spinner = Output::spinner("Listing channel videos...");
    let result = YtDlp::new().list_channel_videos(url, count).await;
    spinner.finish_and_clear();

    let videos = result?;
    if videos.is_empty() {
        Output::warning("No videos found. Check that the channel URL is correct.");
        return Ok(());
    }

    Output::header(&format!("Latest videos ({})", videos.len()));
    println!();
    for video in &videos {
        Output::video_item(&video.title, &video.id, video.duration_seconds);
    }
    println!();
    Output::info("Generate a post with: tubecast generate <id>");

    Ok(())
}
