//! Audio retrieval for the speech-to-text fallback.

mod downloader;

pub use downloader::{AudioFetcher, YtDlpAudio, AUDIO_FORMAT};
