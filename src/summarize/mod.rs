//! Blog generation from transcripts.
//!
//! A [`Summarizer`] walks an ordered list of [`SummaryProvider`]s and returns
//! the first non-empty post. Provider failures are logged and absorbed, and the
//! local extraction provider guarantees a result.

mod chat;
mod custom;
mod gemini;
mod groq;
mod local;
mod openai;
mod retry;

pub use chat::ChatCompletion;
pub use custom::CustomProvider;
pub use gemini::GeminiProvider;
pub use groq::GroqProvider;
pub use local::{local_summary, LocalProvider, LOCAL_LABEL};
pub use openai::OpenAiProvider;
pub use retry::RetryPolicy;

use crate::capability::{CapabilityResolver, ProviderName};
use crate::config::{AppContext, Prompts};
use crate::http::truncate_chars;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Label used when no content could be summarized.
pub const NO_PROVIDER_LABEL: &str = "none";

/// Input to a single summarization attempt.
#[derive(Debug, Clone)]
pub struct SummaryRequest {
    pub title: String,
    pub channel: String,
    pub transcript: String,
    /// Rendered system prompt.
    pub system_prompt: String,
    /// Rendered user prompt with the transcript embedded.
    pub user_prompt: String,
    /// Sampling temperature.
    pub temperature: f32,
}

/// A generated post and the provider that wrote it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummarizationResult {
    pub markdown: String,
    pub provider_label: String,
}

impl SummarizationResult {
    pub fn new(markdown: impl Into<String>, provider_label: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
            provider_label: provider_label.into(),
        }
    }
}

/// One summarization backend.
#[async_trait]
pub trait SummaryProvider: Send + Sync {
    fn name(&self) -> ProviderName;

    /// Whether the provider should be tried, evaluated right before the attempt.
    fn is_enabled(&self, resolver: &CapabilityResolver) -> bool {
        resolver.is_enabled(self.name())
    }

    /// Try to produce a post. `None` is a soft failure and the next provider runs.
    async fn attempt(&self, request: &SummaryRequest) -> Option<SummarizationResult>;
}

/// Build the default provider chain in priority order.
pub fn default_providers(ctx: Arc<AppContext>) -> Vec<Box<dyn SummaryProvider>> {
    vec![
        Box::new(CustomProvider::new(ctx.clone())),
        Box::new(OpenAiProvider::new(ctx.clone())),
        Box::new(GeminiProvider::new(ctx.clone())),
        Box::new(GroqProvider::new(ctx.clone())),
        Box::new(LocalProvider::new(ctx)),
    ]
}

/// Orchestrates the provider chain.
pub struct Summarizer {
    ctx: Arc<AppContext>,
    resolver: CapabilityResolver,
    providers: Vec<Box<dyn SummaryProvider>>,
}

impl Summarizer {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        let providers = default_providers(ctx.clone());
        Self::with_providers(ctx, providers)
    }

    /// Use a custom provider list. Providers are tried in priority order
    /// regardless of the order given.
    pub fn with_providers(ctx: Arc<AppContext>, mut providers: Vec<Box<dyn SummaryProvider>>) -> Self {
        providers.sort_by_key(|p| p.name().priority());
        Self {
            resolver: CapabilityResolver::new(ctx.clone()),
            ctx,
            providers,
        }
    }

    /// Render the blog prompt for a transcript using the current settings.
    pub fn build_request(&self, title: &str, transcript: &str, channel: &str) -> SummaryRequest {
        let settings = self.ctx.snapshot();
        let prompts = Prompts::from_settings(&settings.prompts);

        let mut vars = HashMap::new();
        vars.insert("title".to_string(), title.to_string());
        vars.insert("channel".to_string(), channel.to_string());
        vars.insert("transcript".to_string(), transcript.to_string());
        vars.insert("language".to_string(), settings.summarizer.language.clone());

        SummaryRequest {
            title: title.to_string(),
            channel: channel.to_string(),
            transcript: transcript.to_string(),
            system_prompt: prompts.render_with_custom(&prompts.blog.system, &vars),
            user_prompt: prompts.render_with_custom(&prompts.blog.user, &vars),
            temperature: settings.summarizer.temperature,
        }
    }

    /// Generate a blog post. Never fails and never returns an empty post.
    #[instrument(skip(self, transcript), fields(transcript_len = transcript.chars().count()))]
    pub async fn generate_blog(&self, title: &str, transcript: &str, channel: &str) -> SummarizationResult {
        let start = Instant::now();
        info!(
            preview = %truncate_chars(transcript, 200),
            "Summarization requested"
        );

        let result = if transcript.trim().is_empty() {
            warn!("No transcript provided, returning unavailable notice");
            self.unavailable(title)
        } else {
            self.run_chain(title, transcript, channel).await
        };

        info!(
            provider = %result.provider_label,
            elapsed_ms = start.elapsed().as_millis() as u64,
            output_len = result.markdown.chars().count(),
            output_preview = %truncate_chars(&result.markdown, 300),
            "Summarization finished"
        );
        result
    }

    async fn run_chain(&self, title: &str, transcript: &str, channel: &str) -> SummarizationResult {
        let request = self.build_request(title, transcript, channel);

        for provider in &self.providers {
            if !provider.is_enabled(&self.resolver) {
                continue;
            }
            info!(provider = %provider.name(), "Attempting summarization");
            match provider.attempt(&request).await {
                Some(result) if !result.markdown.trim().is_empty() => return result,
                Some(_) => warn!(provider = %provider.name(), "Provider returned an empty post"),
                None => warn!(provider = %provider.name(), "Provider failed, falling through"),
            }
        }

        info!("Using local extraction fallback");
        local_summary(&Prompts::from_settings(&self.ctx.snapshot().prompts), title, transcript, channel)
    }

    fn unavailable(&self, title: &str) -> SummarizationResult {
        let prompts = Prompts::from_settings(&self.ctx.snapshot().prompts);
        let mut vars = HashMap::new();
        vars.insert("title".to_string(), title.to_string());
        let markdown = prompts.render_with_custom(&prompts.blog.unavailable, &vars);
        SummarizationResult::new(markdown, NO_PROVIDER_LABEL)
    }
}
