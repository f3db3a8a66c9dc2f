//! Video references and metadata.

mod ytdlp;

pub use ytdlp::YtDlp;

use crate::error::{Result, TubecastError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

/// A resolved YouTube video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoReference {
    pub id: String,
    pub url: String,
}

impl VideoReference {
    /// Resolve a watch/short/embed URL or a bare 11-character id.
    pub fn parse(input: &str) -> Result<Self> {
        let id = extract_video_id(input).ok_or_else(|| {
            TubecastError::InvalidInput(format!("Invalid YouTube video ID or URL: {}", input))
        })?;
        Ok(Self::from_id(id))
    }

    pub fn from_id(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            url: format!("https://www.youtube.com/watch?v={}", id),
            id,
        }
    }
}

impl std::fmt::Display for VideoReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url)
    }
}

/// Metadata for a single video.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VideoMetadata {
    pub id: String,
    pub title: String,
    /// Empty when the video has none.
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub channel: String,
    pub duration_seconds: Option<u64>,
    pub thumbnail_url: Option<String>,
    pub upload_date: Option<chrono::NaiveDate>,
    pub url: String,
}

/// A single entry of a channel listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelVideo {
    pub id: String,
    pub title: String,
    pub url: String,
    pub thumbnail_url: Option<String>,
    pub duration_seconds: Option<u64>,
}

/// Source of video metadata.
#[async_trait]
pub trait VideoSource: Send + Sync {
    async fn fetch_metadata(&self, video: &VideoReference) -> Result<VideoMetadata>;

    /// List the newest `count` videos of a channel.
    async fn list_channel_videos(&self, channel_url: &str, count: usize) -> Result<Vec<ChannelVideo>>;
}

fn is_video_id(s: &str) -> bool {
    s.len() == 11
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn parse_youtube_url(input: &str) -> Option<Url> {
    let input = input.trim();
    let candidate = if input.contains("://") {
        input.to_string()
    } else {
        format!("https://{}", input)
    };
    let url = Url::parse(&candidate).ok()?;
    let host = url.host_str()?.trim_start_matches("www.").trim_start_matches("m.");
    if host == "youtube.com" || host == "youtu.be" || host == "music.youtube.com" {
        Some(url)
    } else {
        None
    }
}

/// Extract the video id from a YouTube URL or a bare id.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if is_video_id(input) {
        return Some(input.to_string());
    }

    let url = parse_youtube_url(input)?;
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());

    let candidate = if url.host_str()?.ends_with("youtu.be") {
        segments.next().map(str::to_string)
    } else {
        match segments.next() {
            Some("watch") | None => url
                .query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.into_owned()),
            Some("embed") | Some("v") | Some("shorts") | Some("live") => {
                segments.next().map(str::to_string)
            }
            Some(_) => None,
        }
    }?;

    is_video_id(&candidate).then_some(candidate)
}

/// Extract the channel identifier from `/channel/`, `/c/`, `/@handle` or `/user/` URLs.
pub fn extract_channel_id(input: &str) -> Option<String> {
    let url = parse_youtube_url(input)?;
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
    let first = segments.next()?;

    let id = if let Some(handle) = first.strip_prefix('@') {
        handle.to_string()
    } else if matches!(first, "channel" | "c" | "user") {
        segments.next()?.to_string()
    } else {
        return None;
    };

    (!id.is_empty()).then_some(id)
}

/// `@handle` URLs list their uploads under `/videos`.
pub fn channel_videos_url(channel_url: &str) -> String {
    let trimmed = channel_url.trim();
    if trimmed.contains('@') && !trimmed.contains("/videos") {
        format!("{}/videos", trimmed.trim_end_matches('/'))
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_video_id() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?feature=share&v=dQw4w9WgXcQ&t=10"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ?si=abc"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("youtube.com/shorts/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(extract_video_id("dQw4w9WgXcQ"), Some("dQw4w9WgXcQ".to_string()));

        assert_eq!(extract_video_id("not-a-video-id"), None);
        assert_eq!(extract_video_id(""), None);
        assert_eq!(extract_video_id("https://example.com/watch?v=dQw4w9WgXcQ"), None);
        assert_eq!(extract_video_id("https://www.youtube.com/@somechannel"), None);
    }

    #[test]
    fn test_extract_channel_id() {
        assert_eq!(
            extract_channel_id("https://www.youtube.com/channel/UC123abc"),
            Some("UC123abc".to_string())
        );
        assert_eq!(
            extract_channel_id("https://www.youtube.com/@veritasium/videos"),
            Some("veritasium".to_string())
        );
        assert_eq!(
            extract_channel_id("https://www.youtube.com/c/SomeName?view=0"),
            Some("SomeName".to_string())
        );
        assert_eq!(
            extract_channel_id("https://www.youtube.com/user/legacy"),
            Some("legacy".to_string())
        );
        assert_eq!(extract_channel_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), None);
    }

    #[test]
    fn test_channel_videos_url() {
        assert_eq!(
            channel_videos_url("https://www.youtube.com/@veritasium/"),
            "https://www.youtube.com/@veritasium/videos"
        );
        assert_eq!(
            channel_videos_url("https://www.youtube.com/@veritasium/videos"),
            "https://www.youtube.com/@veritasium/videos"
        );
        assert_eq!(
            channel_videos_url("https://www.youtube.com/channel/UC123"),
            "https://www.youtube.com/channel/UC123"
        );
    }

    #[test]
    fn test_reference_parse() {
        let video = VideoReference::parse("https://youtu.be/dQw4w9WgXcQ").unwrap();
        assert_eq!(video.id, "dQw4w9WgXcQ");
        assert_eq!(video.url, "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
        assert!(VideoReference::parse("nope").is_err());
    }
}
