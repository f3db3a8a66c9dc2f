//! Error types for Tubecast.

use thiserror::Error;

/// Library-level error type for Tubecast operations.
///
/// Only hard failures are represented here. Missing captions, a provider that
/// rejected a request, or a TTS engine that could not run are absorbed by the
/// pipelines and never surface as `TubecastError`.
#[derive(Error, Debug)]
pub enum TubecastError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Video source error: {0}")]
    VideoSource(String),

    #[error("Audio download failed: {0}")]
    AudioDownload(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("Caption lookup failed: {0}")]
    Captions(String),

    #[error("Narration failed: {0}")]
    Narration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Video not found: {0}")]
    VideoNotFound(String),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Tubecast operations.
pub type Result<T> = std::result::Result<T, TubecastError>;
