//! Transcript acquisition.
//!
//! [`TranscriptPipeline`] tries, in order: the captions API with language
//! preference and optional machine translation, raw subtitles listed by
//! yt-dlp, speech-to-text on downloaded audio, and finally the video
//! description. Every step absorbs its own failures.

mod captions;
mod formats;
mod speech;
mod subtitles;

pub use captions::{CaptionTrack, CaptionTrackList, CaptionTrackSource, InnertubeCaptions};
pub use formats::{parse_json3, parse_json3_lines, parse_subtitles, parse_vtt, strip_tags, SubtitleFormat};
pub use speech::{GroqWhisper, SpeechToText};
pub use subtitles::{SelectedSubtitle, SubtitleSource, SubtitleTrack, VideoCaptionInfo, YtDlpSubtitles};

use crate::audio::{AudioFetcher, YtDlpAudio};
use crate::config::{AppContext, TranscriptSettings};
use crate::error::Result;
use crate::video::{VideoReference, YtDlp};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Prefix marking description text used in place of a transcript.
pub const DESCRIPTION_PREFIX: &str = "[Video description]";

/// Where transcript text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    ManualCaptions,
    AutoCaptions,
    AudioTranscription,
    DescriptionFallback,
}

/// Plain transcript text of a video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptResult {
    pub text: String,
    pub language: Option<String>,
    pub provenance: Provenance,
}

/// Language family, the part before the first `-` (`zh-Hans` -> `zh`).
pub fn language_family(code: &str) -> &str {
    code.split(['-', '_']).next().unwrap_or(code)
}

/// Lookup order for the captions API: preferred, regional variants, alternates.
pub fn caption_language_order(preferred: &str, settings: &TranscriptSettings) -> Vec<Vec<String>> {
    vec![
        vec![preferred.to_string()],
        settings.regional_variants.clone(),
        settings.alternate_languages.clone(),
    ]
}

/// Translation target for a track, or `None` when the track already matches.
pub fn translation_target(
    track: &CaptionTrack,
    preferred: &str,
    settings: &TranscriptSettings,
) -> Option<String> {
    if !track.is_translatable || language_family(&track.language_code) == language_family(preferred) {
        return None;
    }
    let configured = settings.translation_target.trim();
    if !configured.is_empty() && language_family(configured) == language_family(preferred) {
        Some(configured.to_string())
    } else {
        Some(preferred.to_string())
    }
}

/// Subtitle fallback language order: preferred first, then the configured list.
pub fn subtitle_language_order(preferred: &str, settings: &TranscriptSettings) -> Vec<String> {
    let mut order = vec![preferred.to_string()];
    for lang in &settings.subtitle_languages {
        if !order.contains(lang) {
            order.push(lang.clone());
        }
    }
    order
}

/// Ordered transcript strategies over injectable sources.
pub struct TranscriptPipeline {
    ctx: Arc<AppContext>,
    captions: Box<dyn CaptionTrackSource>,
    subtitles: Box<dyn SubtitleSource>,
    audio: Box<dyn AudioFetcher>,
    speech: Box<dyn SpeechToText>,
}

impl TranscriptPipeline {
    /// Production sources: YouTube player API, yt-dlp and Groq Whisper.
    pub fn new(ctx: Arc<AppContext>) -> Result<Self> {
        let timeout = Duration::from_secs(ctx.snapshot().transcript.request_timeout_seconds);
        Ok(Self::with_sources(
            ctx.clone(),
            Box::new(InnertubeCaptions::new(timeout)?),
            Box::new(YtDlpSubtitles::new(YtDlp::new(), timeout)?),
            Box::new(YtDlpAudio::new()),
            Box::new(GroqWhisper::new(ctx)),
        ))
    }

    pub fn with_sources(
        ctx: Arc<AppContext>,
        captions: Box<dyn CaptionTrackSource>,
        subtitles: Box<dyn SubtitleSource>,
        audio: Box<dyn AudioFetcher>,
        speech: Box<dyn SpeechToText>,
    ) -> Self {
        Self {
            ctx,
            captions,
            subtitles,
            audio,
            speech,
        }
    }

    /// Obtain plain transcript text. `None` means no content could be found.
    #[instrument(skip(self), fields(video_id = %video.id))]
    pub async fn get_transcript(&self, video: &VideoReference, preferred_language: &str) -> Option<TranscriptResult> {
        let settings = self.ctx.snapshot().transcript;
        let preferred = if preferred_language.trim().is_empty() {
            settings.preferred_language.clone()
        } else {
            preferred_language.trim().to_string()
        };

        if let Some(result) = self.from_captions_api(video, &preferred, &settings).await {
            return Some(result);
        }

        let info = match self.subtitles.caption_info(video).await {
            Ok(info) => info,
            Err(e) => {
                warn!(error = %e, "Failed to read caption listing");
                VideoCaptionInfo::default()
            }
        };

        if let Some(result) = self.from_subtitles(&info, &preferred, &settings).await {
            return Some(result);
        }

        if settings.transcribe_audio {
            if let Some(result) = self.from_audio(video).await {
                return Some(result);
            }
        }

        if let Some(description) = info.description() {
            warn!("No transcript available, falling back to video description");
            return Some(TranscriptResult {
                text: format!("{}\n{}", DESCRIPTION_PREFIX, description),
                language: None,
                provenance: Provenance::DescriptionFallback,
            });
        }

        info!("No transcript, captions or description available");
        None
    }

    async fn from_captions_api(
        &self,
        video: &VideoReference,
        preferred: &str,
        settings: &TranscriptSettings,
    ) -> Option<TranscriptResult> {
        let list = match self.captions.list_tracks(&video.id).await {
            Ok(list) => list,
            Err(e) => {
                warn!(error = %e, "Captions API unavailable");
                return None;
            }
        };

        let track = caption_language_order(preferred, settings)
            .iter()
            .find_map(|codes| list.find(codes))
            .or_else(|| list.first())?;

        let target = translation_target(track, preferred, settings);
        if let Some(target) = &target {
            match self.captions.fetch_track(track, Some(target)).await {
                Ok(text) => {
                    info!(from = %track.language_code, to = %target, "Using translated captions");
                    return Some(Self::caption_result(text, target, track));
                }
                Err(e) => warn!(error = %e, target = %target, "Caption translation failed, keeping original"),
            }
        }

        match self.captions.fetch_track(track, None).await {
            Ok(text) => {
                info!(language = %track.language_code, generated = track.is_generated, "Using captions");
                Some(Self::caption_result(text, &track.language_code, track))
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch caption track");
                None
            }
        }
    }

    fn caption_result(text: String, language: &str, track: &CaptionTrack) -> TranscriptResult {
        TranscriptResult {
            text,
            language: Some(language.to_string()),
            provenance: if track.is_generated {
                Provenance::AutoCaptions
            } else {
                Provenance::ManualCaptions
            },
        }
    }

    async fn from_subtitles(
        &self,
        info: &VideoCaptionInfo,
        preferred: &str,
        settings: &TranscriptSettings,
    ) -> Option<TranscriptResult> {
        let selected = info.select(&subtitle_language_order(preferred, settings))?;
        let manual = info
            .subtitles
            .as_ref()
            .is_some_and(|s| s.contains_key(&selected.language));

        match self.subtitles.download(&selected).await {
            Ok(text) => {
                info!(language = %selected.language, format = ?selected.format, "Using subtitle fallback");
                Some(TranscriptResult {
                    text,
                    language: Some(selected.language),
                    provenance: if manual {
                        Provenance::ManualCaptions
                    } else {
                        Provenance::AutoCaptions
                    },
                })
            }
            Err(e) => {
                warn!(error = %e, language = %selected.language, "Subtitle download failed");
                None
            }
        }
    }

    async fn from_audio(&self, video: &VideoReference) -> Option<TranscriptResult> {
        if !self.speech.is_enabled() {
            info!("Speech-to-text not configured, skipping audio transcription");
            return None;
        }

        let temp_root = self.ctx.snapshot().temp_dir();
        if let Err(e) = std::fs::create_dir_all(&temp_root) {
            warn!(error = %e, dir = %temp_root.display(), "Cannot create temp directory");
            return None;
        }
        let temp = match tempfile::Builder::new().prefix("audio-").tempdir_in(&temp_root) {
            Ok(t) => t,
            Err(e) => {
                warn!(error = %e, "Cannot create temp directory");
                return None;
            }
        };

        let text = match self.audio.download(video, temp.path()).await {
            Ok(path) => match self.speech.transcribe(&path).await {
                Ok(text) if !text.trim().is_empty() => Some(text),
                Ok(_) => {
                    warn!("Transcription returned empty text");
                    None
                }
                Err(e) => {
                    warn!(error = %e, "Audio transcription failed");
                    None
                }
            },
            Err(e) => {
                warn!(error = %e, "Audio download failed");
                None
            }
        };

        if let Err(e) = temp.close() {
            warn!(error = %e, "Failed to remove temporary audio");
        }

        text.map(|text| {
            info!(chars = text.chars().count(), "Audio transcription succeeded");
            TranscriptResult {
                text,
                language: None,
                provenance: Provenance::AudioTranscription,
            }
        })
    }
}
