//! Configuration module for Tubecast.
//!
//! Handles loading and managing application settings, prompt templates and
//! the shared configuration context.

mod context;
mod prompts;
mod settings;

pub use context::{AppContext, OAuthToken};
pub use prompts::{BlogPrompts, Prompts};
pub use settings::{
    mask_key, CustomApiSettings, GeminiSettings, GeneralSettings, GoogleSettings,
    GroqSettings, OpenAiSettings, PromptSettings, RetrySettings, Settings,
    SummarizerSettings, TranscriptSettings, TtsEngine, TtsSettings, ENV_OVERRIDES,
};
