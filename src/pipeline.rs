//! Pipeline orchestrator for Tubecast.
//!
//! Coordinates the whole process for one video: metadata, transcript, blog
//! post and narration, ending in a [`BlogRecord`] written next to its files.

use crate::config::AppContext;
use crate::error::{Result, TubecastError};
use crate::narration::Narrator;
use crate::summarize::{Summarizer, NO_PROVIDER_LABEL};
use crate::transcript::{TranscriptPipeline, TranscriptResult};
use crate::video::{VideoMetadata, VideoReference, VideoSource, YtDlp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// A generated post and where its files live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogRecord {
    pub id: String,
    pub title: String,
    pub channel: String,
    pub video_url: String,
    pub thumbnail: String,
    pub content: String,
    pub has_audio: bool,
    pub model_used: String,
    pub transcript_length: usize,
    pub created_at: DateTime<Utc>,
}

impl BlogRecord {
    /// Short random id used for file names.
    pub fn new_id() -> String {
        uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
    }

    pub fn markdown_path(blogs_dir: &Path, id: &str) -> PathBuf {
        blogs_dir.join(format!("{}.md", id))
    }

    pub fn record_path(blogs_dir: &Path, id: &str) -> PathBuf {
        blogs_dir.join(format!("{}.json", id))
    }

    pub fn audio_path(audio_dir: &Path, id: &str) -> PathBuf {
        audio_dir.join(format!("{}.mp3", id))
    }

    /// Write the record as pretty JSON into `blogs_dir`.
    pub fn save(&self, blogs_dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(blogs_dir)?;
        let path = Self::record_path(blogs_dir, &self.id);
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(path)
    }

    /// All records in `blogs_dir`, newest first. Unreadable files are skipped.
    pub fn load_all(blogs_dir: &Path) -> Result<Vec<BlogRecord>> {
        if !blogs_dir.exists() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for entry in std::fs::read_dir(blogs_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match std::fs::read_to_string(&path)
                .map_err(TubecastError::from)
                .and_then(|raw| serde_json::from_str::<BlogRecord>(&raw).map_err(TubecastError::from))
            {
                Ok(record) => records.push(record),
                Err(e) => warn!(error = %e, path = %path.display(), "Skipping unreadable record"),
            }
        }
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }
}

/// The main orchestrator for the Tubecast pipeline.
pub struct Pipeline {
    ctx: Arc<AppContext>,
    video: Box<dyn VideoSource>,
    transcripts: TranscriptPipeline,
    summarizer: Summarizer,
    narrator: Narrator,
}

impl Pipeline {
    /// Create a pipeline with the production components.
    pub fn new(ctx: Arc<AppContext>) -> Result<Self> {
        Ok(Self::with_components(
            ctx.clone(),
            Box::new(YtDlp::new()),
            TranscriptPipeline::new(ctx.clone())?,
            Summarizer::new(ctx.clone()),
            Narrator::new(ctx),
        ))
    }

    /// Create a pipeline with custom components (useful for testing).
    pub fn with_components(
        ctx: Arc<AppContext>,
        video: Box<dyn VideoSource>,
        transcripts: TranscriptPipeline,
        summarizer: Summarizer,
        narrator: Narrator,
    ) -> Self {
        Self {
            ctx,
            video,
            transcripts,
            summarizer,
            narrator,
        }
    }

    pub fn transcripts(&self) -> &TranscriptPipeline {
        &self.transcripts
    }

    pub fn summarizer(&self) -> &Summarizer {
        &self.summarizer
    }

    pub fn narrator(&self) -> &Narrator {
        &self.narrator
    }

    pub fn video_source(&self) -> &dyn VideoSource {
        self.video.as_ref()
    }

    /// Language used for caption lookup: the post language when set,
    /// otherwise the configured transcript language.
    fn transcript_language(&self) -> String {
        let settings = self.ctx.snapshot();
        let language = settings.summarizer.language.trim();
        if language.is_empty() {
            settings.transcript.preferred_language
        } else {
            language.to_string()
        }
    }

    /// Fetch metadata and the transcript of a video.
    #[instrument(skip(self), fields(video_id = %video.id))]
    pub async fn fetch(&self, video: &VideoReference) -> Result<(VideoMetadata, Option<TranscriptResult>)> {
        let metadata = self.video.fetch_metadata(video).await?;
        info!(title = %metadata.title, channel = %metadata.channel, "Fetched video metadata");

        let transcript = self
            .transcripts
            .get_transcript(video, &self.transcript_language())
            .await;
        match &transcript {
            Some(t) => info!(chars = t.text.chars().count(), provenance = ?t.provenance, "Transcript ready"),
            None => warn!("No transcript available"),
        }
        Ok((metadata, transcript))
    }

    /// Process a video end to end and write its files under the output
    /// directory. Narration is skipped when `with_audio` is false or no
    /// post could be written.
    #[instrument(skip(self), fields(input = %input))]
    pub async fn process_video(&self, input: &str, with_audio: bool) -> Result<BlogRecord> {
        let video = VideoReference::parse(input)?;
        let (metadata, transcript) = self.fetch(&video).await?;
        let transcript_text = transcript.map(|t| t.text).unwrap_or_default();

        let post = self
            .summarizer
            .generate_blog(&metadata.title, &transcript_text, &metadata.channel)
            .await;

        let settings = self.ctx.snapshot();
        let blogs_dir = settings.blogs_dir();
        std::fs::create_dir_all(&blogs_dir)?;

        let id = BlogRecord::new_id();
        let markdown_path = BlogRecord::markdown_path(&blogs_dir, &id);
        std::fs::write(&markdown_path, &post.markdown)?;
        info!(path = %markdown_path.display(), "Blog post written");

        let audio_path = BlogRecord::audio_path(&settings.audio_dir(), &id);
        let has_audio = if !with_audio {
            false
        } else if post.provider_label == NO_PROVIDER_LABEL {
            info!("No post content, skipping narration");
            false
        } else {
            self.narrator.synthesize_audio(&post.markdown, &audio_path, None).await
        };

        let record = BlogRecord {
            id,
            title: metadata.title,
            channel: metadata.channel,
            video_url: video.url,
            thumbnail: metadata.thumbnail_url.unwrap_or_default(),
            content: post.markdown,
            has_audio,
            model_used: post.provider_label,
            transcript_length: transcript_text.chars().count(),
            created_at: Utc::now(),
        };
        let mut written = vec![markdown_path];
        if has_audio {
            written.push(audio_path);
        }
        let record_path = save_or_discard(&record, &blogs_dir, &written)?;

        info!(
            id = %record.id,
            model = %record.model_used,
            has_audio = record.has_audio,
            path = %record_path.display(),
            "Video processed"
        );
        Ok(record)
    }
}

/// Save `record`, removing the already written `files` if that fails.
fn save_or_discard(record: &BlogRecord, blogs_dir: &Path, files: &[PathBuf]) -> Result<PathBuf> {
    record.save(blogs_dir).inspect_err(|e| {
        warn!(error = %e, id = %record.id, "Failed to save blog record, removing its files");
        for file in files {
            if let Err(e) = std::fs::remove_file(file) {
                warn!(error = %e, path = %file.display(), "Failed to remove file");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioFetcher;
    use crate::config::TtsEngine;
    use crate::narration::SpeechEngine;
    use crate::summarize::{SummarizationResult, SummaryProvider, SummaryRequest};
    use crate::capability::ProviderName;
    use crate::transcript::{
        CaptionTrack, CaptionTrackList, CaptionTrackSource, SelectedSubtitle, SpeechToText, SubtitleSource,
        VideoCaptionInfo,
    };
    use crate::video::ChannelVideo;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeVideo;

    #[async_trait]
    impl VideoSource for FakeVideo {
        async fn fetch_metadata(&self, video: &VideoReference) -> Result<VideoMetadata> {
            Ok(VideoMetadata {
                id: video.id.clone(),
                title: "Rust in Production".to_string(),
                description: String::new(),
                channel: "Systems Weekly".to_string(),
                duration_seconds: Some(600),
                thumbnail_url: Some("https://i.ytimg.com/vi/x/hq.jpg".to_string()),
                upload_date: None,
                url: video.url.clone(),
            })
        }

        async fn list_channel_videos(&self, _channel_url: &str, _count: usize) -> Result<Vec<ChannelVideo>> {
            Ok(Vec::new())
        }
    }

    struct FixedCaptions(Option<&'static str>);

    #[async_trait]
    impl CaptionTrackSource for FixedCaptions {
        async fn list_tracks(&self, _video_id: &str) -> Result<CaptionTrackList> {
            match self.0 {
                Some(_) => Ok(CaptionTrackList {
                    tracks: vec![CaptionTrack {
                        language_code: "zh-Hans".to_string(),
                        language: "Chinese".to_string(),
                        base_url: "https://captions.test/zh".to_string(),
                        is_generated: false,
                        is_translatable: true,
                    }],
                }),
                None => Err(TubecastError::Captions("disabled".into())),
            }
        }

        async fn fetch_track(&self, _track: &CaptionTrack, _translate_to: Option<&str>) -> Result<String> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| TubecastError::Captions("disabled".into()))
        }
    }

    struct NoSubtitles;

    #[async_trait]
    impl SubtitleSource for NoSubtitles {
        async fn caption_info(&self, _video: &VideoReference) -> Result<VideoCaptionInfo> {
            Ok(VideoCaptionInfo::default())
        }

        async fn download(&self, _subtitle: &SelectedSubtitle) -> Result<String> {
            Err(TubecastError::Captions("none".into()))
        }
    }

    struct NoAudio;

    #[async_trait]
    impl AudioFetcher for NoAudio {
        async fn download(&self, _video: &VideoReference, _dir: &Path) -> Result<PathBuf> {
            Err(TubecastError::AudioDownload("offline".into()))
        }
    }

    struct NoSpeech;

    #[async_trait]
    impl SpeechToText for NoSpeech {
        fn is_enabled(&self) -> bool {
            false
        }

        async fn transcribe(&self, _audio_path: &Path) -> Result<String> {
            Err(TubecastError::Transcription("disabled".into()))
        }
    }

    struct CountingProvider(Arc<AtomicUsize>);

    #[async_trait]
    impl SummaryProvider for CountingProvider {
        fn name(&self) -> ProviderName {
            ProviderName::Groq
        }

        async fn attempt(&self, request: &SummaryRequest) -> Option<SummarizationResult> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Some(SummarizationResult::new(
                format!("# {}\n\nA post.", request.title),
                "Groq (test-model)",
            ))
        }
    }

    struct FakeTts {
        kind: TtsEngine,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SpeechEngine for FakeTts {
        fn engine(&self) -> TtsEngine {
            self.kind
        }

        async fn synthesize(&self, _text: &str, output: &Path) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::fs::write(output, b"ID3")?;
            Ok(())
        }
    }

    struct Harness {
        pipeline: Pipeline,
        _dir: tempfile::TempDir,
        provider_calls: Arc<AtomicUsize>,
        tts_calls: Arc<AtomicUsize>,
    }

    fn harness(captions: Option<&'static str>) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let ctx = Arc::new(AppContext::default());
        ctx.set("general.output_dir", dir.path().join("out").to_str().unwrap()).unwrap();
        ctx.set("general.data_dir", dir.path().join("data").to_str().unwrap()).unwrap();
        ctx.set("groq.api_key", "gsk-test").unwrap();

        let provider_calls = Arc::new(AtomicUsize::new(0));
        let tts_calls = Arc::new(AtomicUsize::new(0));

        let transcripts = TranscriptPipeline::with_sources(
            ctx.clone(),
            Box::new(FixedCaptions(captions)),
            Box::new(NoSubtitles),
            Box::new(NoAudio),
            Box::new(NoSpeech),
        );
        let summarizer = Summarizer::with_providers(
            ctx.clone(),
            vec![Box::new(CountingProvider(provider_calls.clone()))],
        );
        let narrator = Narrator::with_engines(
            ctx.clone(),
            Box::new(FakeTts {
                kind: TtsEngine::OpenAi,
                calls: Arc::new(AtomicUsize::new(0)),
            }),
            Box::new(FakeTts {
                kind: TtsEngine::Edge,
                calls: tts_calls.clone(),
            }),
        );

        Harness {
            pipeline: Pipeline::with_components(ctx, Box::new(FakeVideo), transcripts, summarizer, narrator),
            _dir: dir,
            provider_calls,
            tts_calls,
        }
    }

    #[tokio::test]
    async fn test_process_video_writes_files() {
        let h = harness(Some("first line of the talk\nsecond line of the talk"));
        let record = tokio_test::assert_ok!(
            h.pipeline
                .process_video("https://youtu.be/dQw4w9WgXcQ", true)
                .await
        );

        assert_eq!(record.id.len(), 8);
        assert_eq!(record.title, "Rust in Production");
        assert_eq!(record.model_used, "Groq (test-model)");
        assert!(record.has_audio);
        assert_eq!(record.transcript_length, 46);
        assert_eq!(record.video_url, "https://www.youtube.com/watch?v=dQw4w9WgXcQ");

        let settings = h.pipeline.ctx.snapshot();
        let md = std::fs::read_to_string(BlogRecord::markdown_path(&settings.blogs_dir(), &record.id)).unwrap();
        assert!(md.starts_with("# Rust in Production"));
        assert!(BlogRecord::audio_path(&settings.audio_dir(), &record.id).exists());

        let saved = BlogRecord::load_all(&settings.blogs_dir()).unwrap();
        assert_eq!(saved, vec![record]);
    }

    #[tokio::test]
    async fn test_no_transcript_yields_unavailable_post_without_audio() {
        let h = harness(None);
        let record = h.pipeline.process_video("dQw4w9WgXcQ", true).await.unwrap();

        assert_eq!(record.model_used, NO_PROVIDER_LABEL);
        assert!(record.content.contains("Content unavailable"));
        assert!(!record.has_audio);
        assert_eq!(record.transcript_length, 0);
        assert_eq!(h.provider_calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.tts_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_audio_can_be_skipped() {
        let h = harness(Some("some transcript text that is long enough"));
        let record = h.pipeline.process_video("dQw4w9WgXcQ", false).await.unwrap();
        assert!(!record.has_audio);
        assert_eq!(h.tts_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected() {
        let h = harness(None);
        let err = h.pipeline.process_video("https://example.com/video", true).await;
        assert!(matches!(err, Err(TubecastError::InvalidInput(_))));
    }

    #[test]
    fn test_load_all_skips_garbage_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        let older = BlogRecord {
            id: "aaaa1111".into(),
            title: "old".into(),
            channel: "c".into(),
            video_url: "u".into(),
            thumbnail: String::new(),
            content: "x".into(),
            has_audio: false,
            model_used: "none".into(),
            transcript_length: 0,
            created_at: DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z").unwrap().with_timezone(&Utc),
        };
        let newer = BlogRecord {
            id: "bbbb2222".into(),
            title: "new".into(),
            created_at: DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z").unwrap().with_timezone(&Utc),
            ..older.clone()
        };
        older.save(dir.path()).unwrap();
        newer.save(dir.path()).unwrap();
        std::fs::write(dir.path().join("broken.json"), "{").unwrap();
        std::fs::write(dir.path().join("aaaa1111.md"), "# md").unwrap();

        let records = BlogRecord::load_all(dir.path()).unwrap();
        assert_eq!(records.iter().map(|r| r.title.as_str()).collect::<Vec<_>>(), vec!["new", "old"]);
        assert!(BlogRecord::load_all(&dir.path().join("missing")).unwrap().is_empty());
    }

    #[test]
    fn test_failed_save_removes_written_files() {
        let dir = tempfile::tempdir().unwrap();
        let record = BlogRecord {
            id: "cccc3333".into(),
            title: "t".into(),
            channel: "c".into(),
            video_url: "u".into(),
            thumbnail: String::new(),
            content: "# post".into(),
            has_audio: true,
            model_used: "Groq (test-model)".into(),
            transcript_length: 6,
            created_at: Utc::now(),
        };
        let markdown = BlogRecord::markdown_path(dir.path(), &record.id);
        let audio = BlogRecord::audio_path(&dir.path().join("audio"), &record.id);
        std::fs::create_dir_all(audio.parent().unwrap()).unwrap();
        std::fs::write(&markdown, "# post").unwrap();
        std::fs::write(&audio, b"ID3").unwrap();
        // A directory in place of the record file makes the write fail.
        std::fs::create_dir(BlogRecord::record_path(dir.path(), &record.id)).unwrap();

        let files = [markdown.clone(), audio.clone()];
        assert!(save_or_discard(&record, dir.path(), &files).is_err());
        assert!(!markdown.exists());
        assert!(!audio.exists());

        let saved = save_or_discard(&record, &dir.path().join("ok"), &[]).unwrap();
        assert!(saved.exists());
    }
}
