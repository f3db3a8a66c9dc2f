//! Raw subtitle fallback through yt-dlp metadata.

use super::formats::{parse_subtitles, SubtitleFormat};
use crate::error::{Result, TubecastError};
use crate::video::{VideoReference, YtDlp};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// One downloadable subtitle rendition as listed by yt-dlp.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubtitleTrack {
    pub ext: Option<String>,
    pub url: Option<String>,
}

/// Caption listings and description of a video.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoCaptionInfo {
    pub subtitles: Option<HashMap<String, Vec<SubtitleTrack>>>,
    pub automatic_captions: Option<HashMap<String, Vec<SubtitleTrack>>>,
    pub description: Option<String>,
}

/// A subtitle URL chosen for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedSubtitle {
    pub language: String,
    pub format: SubtitleFormat,
    pub url: String,
}

impl VideoCaptionInfo {
    /// Automatic captions overlaid by manual subtitles; manual wins per language.
    pub fn merged_tracks(&self) -> HashMap<String, Vec<SubtitleTrack>> {
        let mut merged = self.automatic_captions.clone().unwrap_or_default();
        if let Some(manual) = &self.subtitles {
            for (lang, tracks) in manual {
                merged.insert(lang.clone(), tracks.clone());
            }
        }
        merged
    }

    /// First language of `languages` that has a rendition in an accepted
    /// format, with that rendition.
    pub fn select<S: AsRef<str>>(&self, languages: &[S]) -> Option<SelectedSubtitle> {
        let merged = self.merged_tracks();
        languages.iter().find_map(|language| {
            let language = language.as_ref();
            merged.get(language)?.iter().find_map(|track| {
                let format = SubtitleFormat::from_ext(track.ext.as_deref()?)?;
                let url = track.url.clone().filter(|u| !u.is_empty())?;
                Some(SelectedSubtitle {
                    language: language.to_string(),
                    format,
                    url,
                })
            })
        })
    }

    /// Non-empty description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.trim().is_empty())
    }
}

/// Provides caption listings and subtitle downloads.
#[async_trait]
pub trait SubtitleSource: Send + Sync {
    async fn caption_info(&self, video: &VideoReference) -> Result<VideoCaptionInfo>;

    /// Download a subtitle payload and parse it to plain text.
    async fn download(&self, subtitle: &SelectedSubtitle) -> Result<String>;
}

/// yt-dlp metadata plus a plain HTTP download.
pub struct YtDlpSubtitles {
    ytdlp: YtDlp,
    client: reqwest::Client,
}

impl YtDlpSubtitles {
    pub fn new(ytdlp: YtDlp, timeout: Duration) -> Result<Self> {
        Ok(Self {
            ytdlp,
            client: crate::http::build_client(timeout)?,
        })
    }
}

#[async_trait]
impl SubtitleSource for YtDlpSubtitles {
    async fn caption_info(&self, video: &VideoReference) -> Result<VideoCaptionInfo> {
        let json = self.ytdlp.dump_json(&video.url).await?;
        Ok(serde_json::from_value(json)?)
    }

    async fn download(&self, subtitle: &SelectedSubtitle) -> Result<String> {
        let content = self
            .client
            .get(&subtitle.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_subtitles(&content, subtitle.format).ok_or_else(|| {
            TubecastError::Captions(format!(
                "Subtitle payload for {} could not be parsed",
                subtitle.language
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn info() -> VideoCaptionInfo {
        serde_json::from_value(json!({
            "description": "A video",
            "subtitles": {
                "en": [{"ext": "srt", "url": "https://s/en.srt"}, {"ext": "vtt", "url": "https://s/en.vtt"}]
            },
            "automatic_captions": {
                "en": [{"ext": "json3", "url": "https://a/en.json3"}],
                "zh-Hans": [{"ext": "ttml", "url": "https://a/zh.ttml"}],
                "de": [{"ext": "json3", "url": "https://a/de.json3"}]
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_manual_wins_over_automatic() {
        let merged = info().merged_tracks();
        assert_eq!(merged["en"][1].url.as_deref(), Some("https://s/en.vtt"));
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_select_first_present_language_and_format() {
        let selected = info().select(&["zh", "en"]).unwrap();
        assert_eq!(selected.language, "en");
        assert_eq!(selected.format, SubtitleFormat::Vtt);
        assert_eq!(selected.url, "https://s/en.vtt");
    }

    #[test]
    fn test_select_skips_language_without_accepted_format() {
        // zh-Hans is only offered as ttml.
        let selected = info().select(&["zh", "zh-Hans", "zh-Hant", "de"]).unwrap();
        assert_eq!(selected.language, "de");
        assert_eq!(selected.format, SubtitleFormat::Json3);
        assert_eq!(selected.url, "https://a/de.json3");

        assert_eq!(info().select(&["zh-Hans", "fr"]), None);
    }

    #[test]
    fn test_nulls_are_tolerated() {
        let info: VideoCaptionInfo =
            serde_json::from_value(json!({"subtitles": null, "automatic_captions": null, "description": ""}))
                .unwrap();
        assert!(info.merged_tracks().is_empty());
        assert_eq!(info.description(), None);
        assert_eq!(info.select(&["en"]), None);
    }
}
