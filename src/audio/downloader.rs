//! Compact audio download for speech-to-text.
//!
//! Fetches the smallest useful audio stream with yt-dlp, without re-encoding,
//! so no ffmpeg is needed.

use crate::error::{Result, TubecastError};
use crate::video::VideoReference;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{info, instrument};

/// Format selector preferring m4a, which speech APIs accept directly.
pub const AUDIO_FORMAT: &str = "bestaudio[ext=m4a]/bestaudio/best";

/// Extensions speech APIs recognise.
const KNOWN_EXTENSIONS: &[&str] = &["m4a", "mp3", "webm", "opus", "ogg"];

/// Downloads the audio track of a video.
#[async_trait]
pub trait AudioFetcher: Send + Sync {
    /// Download into `dir` and return the file path. The caller owns `dir`
    /// and is responsible for removing it.
    async fn download(&self, video: &VideoReference, dir: &Path) -> Result<PathBuf>;
}

/// yt-dlp audio downloader.
#[derive(Debug, Clone)]
pub struct YtDlpAudio {
    command: String,
}

impl YtDlpAudio {
    pub fn new() -> Self {
        Self {
            command: "yt-dlp".to_string(),
        }
    }
}

impl Default for YtDlpAudio {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioFetcher for YtDlpAudio {
    #[instrument(skip(self, dir), fields(video_id = %video.id))]
    async fn download(&self, video: &VideoReference, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        info!("Downloading audio for transcription");

        let template = dir.join(format!("{}.%(ext)s", video.id));

        let result = Command::new(&self.command)
            .arg("--format")
            .arg(AUDIO_FORMAT)
            .arg("--extractor-args")
            .arg("youtube:player_client=android")
            .arg("--output")
            .arg(&template)
            .arg("--no-playlist")
            .arg("--quiet")
            .arg("--no-warnings")
            .arg(&video.url)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(TubecastError::ToolNotFound(self.command.clone()));
            }
            Err(e) => {
                return Err(TubecastError::AudioDownload(format!("yt-dlp execution failed: {e}")));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TubecastError::AudioDownload(format!("yt-dlp failed: {}", stderr.trim())));
        }

        let downloaded = find_audio_file(dir, &video.id)?;
        ensure_extension(&downloaded)
    }
}

/// Locates a downloaded audio file by video ID.
pub(crate) fn find_audio_file(dir: &Path, video_id: &str) -> Result<PathBuf> {
    for ext in KNOWN_EXTENSIONS {
        let candidate = dir.join(format!("{}.{}", video_id, ext));
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    // Fallback: scan directory for matching prefix
    let entries = std::fs::read_dir(dir)
        .map_err(|e| TubecastError::AudioDownload(format!("Cannot read directory: {e}")))?;

    for entry in entries.flatten() {
        let name = entry.file_name();
        if name.to_string_lossy().starts_with(video_id) {
            return Ok(entry.path());
        }
    }

    Err(TubecastError::AudioDownload("Audio file not found after download".into()))
}

/// Give the file an `.m4a` extension if it has no recognised one.
pub(crate) fn ensure_extension(path: &Path) -> Result<PathBuf> {
    let known = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| KNOWN_EXTENSIONS.contains(&e));
    if known {
        return Ok(path.to_path_buf());
    }

    let mut renamed = path.as_os_str().to_owned();
    renamed.push(".m4a");
    let renamed = PathBuf::from(renamed);
    std::fs::rename(path, &renamed)?;
    Ok(renamed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_audio_file_prefers_known_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("abc.webm"), b"x").unwrap();
        std::fs::write(dir.path().join("abc.m4a"), b"x").unwrap();
        assert_eq!(find_audio_file(dir.path(), "abc").unwrap(), dir.path().join("abc.m4a"));
    }

    #[test]
    fn test_find_audio_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_audio_file(dir.path(), "abc").is_err());
    }

    #[test]
    fn test_ensure_extension_renames_bare_file() {
        let dir = tempfile::tempdir().unwrap();
        let bare = dir.path().join("abc");
        std::fs::write(&bare, b"x").unwrap();

        let fixed = ensure_extension(&bare).unwrap();
        assert_eq!(fixed, dir.path().join("abc.m4a"));
        assert!(fixed.exists());
        assert!(!bare.exists());

        assert_eq!(ensure_extension(&fixed).unwrap(), fixed);
    }
}
