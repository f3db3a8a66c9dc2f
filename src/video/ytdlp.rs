//! yt-dlp backed metadata and channel listing.

use super::{channel_videos_url, extract_video_id, ChannelVideo, VideoMetadata, VideoReference, VideoSource};
use crate::error::{Result, TubecastError};
use async_trait::async_trait;
use serde::Deserialize;
use std::process::Output;

/// Fields read from `yt-dlp --dump-json`.
#[derive(Debug, Deserialize)]
struct YtDlpInfo {
    id: Option<String>,
    title: Option<String>,
    description: Option<String>,
    channel: Option<String>,
    uploader: Option<String>,
    duration: Option<f64>,
    thumbnail: Option<String>,
    upload_date: Option<String>,
    url: Option<String>,
}

fn parse_upload_date(raw: &str) -> Option<chrono::NaiveDate> {
    // yt-dlp returns date as YYYYMMDD
    if raw.len() == 8 {
        chrono::NaiveDate::parse_from_str(raw, "%Y%m%d").ok()
    } else {
        None
    }
}

/// Runs the `yt-dlp` binary.
#[derive(Debug, Clone)]
pub struct YtDlp {
    command: String,
}

impl YtDlp {
    pub fn new() -> Self {
        Self::with_command("yt-dlp")
    }

    pub fn with_command(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Run yt-dlp with the given arguments.
    pub async fn run(&self, args: &[&str]) -> Result<Output> {
        tokio::process::Command::new(&self.command)
            .args(args)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TubecastError::ToolNotFound(self.command.clone())
                } else {
                    TubecastError::VideoSource(format!("Failed to run yt-dlp: {}", e))
                }
            })
    }

    /// Full JSON metadata of a single video, including caption track listings.
    pub async fn dump_json(&self, url: &str) -> Result<serde_json::Value> {
        let output = self
            .run(&["--dump-json", "--no-download", "--no-warnings", "--no-playlist", url])
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TubecastError::VideoNotFound(format!(
                "Video {} not found or unavailable: {}",
                url,
                stderr.trim()
            )));
        }

        serde_json::from_slice(&output.stdout).map_err(|e| {
            TubecastError::VideoSource(format!("Failed to parse yt-dlp output: {}", e))
        })
    }
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert yt-dlp JSON into metadata.
pub(crate) fn metadata_from_json(video: &VideoReference, json: serde_json::Value) -> Result<VideoMetadata> {
    let info: YtDlpInfo = serde_json::from_value(json)?;

    Ok(VideoMetadata {
        id: info.id.unwrap_or_else(|| video.id.clone()),
        title: info.title.unwrap_or_else(|| "Unknown Title".to_string()),
        description: info
            .description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_default(),
        channel: info.channel.or(info.uploader).unwrap_or_default(),
        duration_seconds: info.duration.map(|d| d as u64),
        thumbnail_url: info.thumbnail,
        upload_date: info.upload_date.as_deref().and_then(parse_upload_date),
        url: video.url.clone(),
    })
}

/// Parse `--flat-playlist --dump-json` output, one JSON object per line.
pub(crate) fn channel_videos_from_lines(stdout: &str, count: usize) -> Vec<ChannelVideo> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str::<YtDlpInfo>(line).ok())
        .filter_map(|info| {
            let id = info
                .id
                .as_deref()
                .or(info.url.as_deref())
                .and_then(extract_video_id)?;
            Some(ChannelVideo {
                url: format!("https://www.youtube.com/watch?v={}", id),
                id,
                title: info.title.unwrap_or_else(|| "Unknown".to_string()),
                thumbnail_url: info.thumbnail,
                duration_seconds: info.duration.map(|d| d as u64),
            })
        })
        .take(count)
        .collect()
}

#[async_trait]
impl VideoSource for YtDlp {
    async fn fetch_metadata(&self, video: &VideoReference) -> Result<VideoMetadata> {
        let json = self.dump_json(&video.url).await?;
        metadata_from_json(video, json)
    }

    async fn list_channel_videos(&self, channel_url: &str, count: usize) -> Result<Vec<ChannelVideo>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let url = channel_videos_url(channel_url);
        let end = count.to_string();

        let output = self
            .run(&[
                "--dump-json",
                "--no-download",
                "--no-warnings",
                "--flat-playlist",
                "--playlist-end",
                &end,
                &url,
            ])
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TubecastError::VideoSource(format!(
                "Failed to list videos: {}",
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let videos = channel_videos_from_lines(&stdout, count);
        tracing::debug!(channel = %url, found = videos.len(), "Listed channel videos");
        Ok(videos)
    }
}
