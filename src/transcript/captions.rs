//! Caption listing and download through the YouTube player API.

use super::formats::parse_json3_lines;
use crate::error::{Result, TubecastError};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::debug;

static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""INNERTUBE_API_KEY":\s*"([a-zA-Z0-9_-]+)""#).expect("valid api key regex")
});

const CLIENT_NAME: &str = "ANDROID";
const CLIENT_VERSION: &str = "20.10.38";

/// One caption track offered for a video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionTrack {
    pub language_code: String,
    pub language: String,
    pub base_url: String,
    /// Automatic speech recognition track.
    pub is_generated: bool,
    pub is_translatable: bool,
}

/// All caption tracks of a video, in the order the API listed them.
#[derive(Debug, Clone, Default)]
pub struct CaptionTrackList {
    pub tracks: Vec<CaptionTrack>,
}

impl CaptionTrackList {
    /// First track matching any of `language_codes`, trying manual before
    /// generated for each code in turn.
    pub fn find<S: AsRef<str>>(&self, language_codes: &[S]) -> Option<&CaptionTrack> {
        language_codes.iter().find_map(|code| {
            let code = code.as_ref();
            self.tracks
                .iter()
                .find(|t| !t.is_generated && t.language_code == code)
                .or_else(|| {
                    self.tracks
                        .iter()
                        .find(|t| t.is_generated && t.language_code == code)
                })
        })
    }

    pub fn first(&self) -> Option<&CaptionTrack> {
        self.tracks.first()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Lists and fetches caption tracks.
#[async_trait]
pub trait CaptionTrackSource: Send + Sync {
    async fn list_tracks(&self, video_id: &str) -> Result<CaptionTrackList>;

    /// Fetch a track as plain text, one line per caption event, optionally
    /// machine translated to `translate_to`.
    async fn fetch_track(&self, track: &CaptionTrack, translate_to: Option<&str>) -> Result<String>;
}

#[derive(Deserialize)]
struct PlayerResponse {
    captions: Option<PlayerCaptions>,
}

#[derive(Deserialize)]
struct PlayerCaptions {
    #[serde(rename = "playerCaptionsTracklistRenderer")]
    renderer: Option<TracklistRenderer>,
}

#[derive(Deserialize)]
struct TracklistRenderer {
    #[serde(rename = "captionTracks", default)]
    caption_tracks: Vec<RawCaptionTrack>,
}

#[derive(Deserialize)]
struct RawCaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: Option<String>,
    #[serde(rename = "languageCode")]
    language_code: Option<String>,
    name: Option<RawName>,
    kind: Option<String>,
    #[serde(rename = "isTranslatable", default)]
    is_translatable: bool,
}

#[derive(Deserialize)]
struct RawName {
    #[serde(default)]
    runs: Vec<RawRun>,
    #[serde(rename = "simpleText")]
    simple_text: Option<String>,
}

#[derive(Deserialize)]
struct RawRun {
    text: String,
}

/// Decode the caption tracks of a player response. Malformed entries are skipped.
pub(crate) fn decode_tracks(body: &str) -> Result<CaptionTrackList> {
    let response: PlayerResponse = serde_json::from_str(body)?;
    let raw = response
        .captions
        .and_then(|c| c.renderer)
        .map(|r| r.caption_tracks)
        .unwrap_or_default();

    let tracks = raw
        .into_iter()
        .filter_map(|t| {
            let language_code = t.language_code?;
            let base_url = t.base_url?.replace("&fmt=srv3", "");
            let language = t
                .name
                .and_then(|n| n.runs.into_iter().next().map(|r| r.text).or(n.simple_text))
                .unwrap_or_else(|| language_code.clone());
            Some(CaptionTrack {
                is_generated: t.kind.as_deref() == Some("asr"),
                is_translatable: t.is_translatable,
                language_code,
                language,
                base_url,
            })
        })
        .collect();

    Ok(CaptionTrackList { tracks })
}

/// Caption source backed by the public YouTube player endpoint.
pub struct InnertubeCaptions {
    client: reqwest::Client,
    watch_url: String,
    player_url: String,
}

impl InnertubeCaptions {
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_base_url("https://www.youtube.com", timeout)
    }

    /// Point at a different host, used to exercise the client against a stub.
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        let base = base_url.trim_end_matches('/');
        Ok(Self {
            client: crate::http::build_client(timeout)?,
            watch_url: format!("{}/watch", base),
            player_url: format!("{}/youtubei/v1/player", base),
        })
    }

    async fn api_key(&self, video_id: &str) -> Result<String> {
        let html = self
            .client
            .get(&self.watch_url)
            .query(&[("v", video_id)])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        if html.contains("g-recaptcha") {
            return Err(TubecastError::Captions(format!(
                "Request for {} was blocked",
                video_id
            )));
        }

        API_KEY_RE
            .captures(&html)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| TubecastError::Captions(format!("No player API key found for {}", video_id)))
    }
}

#[async_trait]
impl CaptionTrackSource for InnertubeCaptions {
    async fn list_tracks(&self, video_id: &str) -> Result<CaptionTrackList> {
        let api_key = self.api_key(video_id).await?;
        let payload = serde_json::json!({
            "context": {
                "client": {
                    "clientName": CLIENT_NAME,
                    "clientVersion": CLIENT_VERSION
                }
            },
            "videoId": video_id
        });

        let body = self
            .client
            .post(&self.player_url)
            .query(&[("key", api_key.as_str())])
            .json(&payload)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let list = decode_tracks(&body)?;
        debug!(video_id, tracks = list.tracks.len(), "Listed caption tracks");
        Ok(list)
    }

    async fn fetch_track(&self, track: &CaptionTrack, translate_to: Option<&str>) -> Result<String> {
        let mut url = format!("{}&fmt=json3", track.base_url);
        if let Some(target) = translate_to {
            url = format!("{}&tlang={}", url, target);
        }
        if url.contains("&exp=xpe") {
            return Err(TubecastError::Captions(
                "Caption track requires a proof-of-origin token".to_string(),
            ));
        }

        let body = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_json3_lines(&body)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| TubecastError::Captions(format!("Empty or unreadable track {}", track.language_code)))
    }
}
