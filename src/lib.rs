//! Tubecast - YouTube videos to blog posts and narration
//!
//! A CLI tool and library that fetches a video's transcript, writes a blog
//! post with the first available AI provider and narrates it.
//!
//! # Overview
//!
//! Tubecast allows you to:
//! - Fetch transcripts from captions, subtitles, audio transcription or the
//!   video description, whichever is available first
//! - Write a blog post with a custom endpoint, OpenAI, Gemini or Groq, with a
//!   local extraction fallback that never fails
//! - Narrate the post with OpenAI TTS or the free Edge voices
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Settings, prompts and the shared [`config::AppContext`]
//! - `capability` - Which providers are usable right now
//! - `video` - Video ids, metadata and channel listings via yt-dlp
//! - `transcript` - Ordered transcript strategies
//! - `audio` - Audio download for speech-to-text
//! - `summarize` - The summarization provider chain
//! - `narration` - Markdown cleaning and text-to-speech
//! - `pipeline` - End-to-end processing of one video
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tubecast::config::AppContext;
//! use tubecast::pipeline::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let ctx = Arc::new(AppContext::load(None)?);
//!     let pipeline = Pipeline::new(ctx)?;
//!
//!     let record = pipeline.process_video("dQw4w9WgXcQ", true).await?;
//!     println!("{} written by {}", record.title, record.model_used);
//!
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod capability;
pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod narration;
pub mod openai;
pub mod pipeline;
pub mod summarize;
pub mod transcript;
pub mod video;

pub use error::{Result, TubecastError};
