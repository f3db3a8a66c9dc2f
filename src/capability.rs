//! Provider capability resolution.
//!
//! Decides which summarization and TTS providers can be used right now. Every
//! query reads the current settings and OAuth slot, nothing is cached.

use crate::config::{AppContext, Settings, TtsEngine};
use serde::Serialize;
use std::sync::Arc;

/// Summarization providers, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderName {
    Custom,
    OpenAi,
    Gemini,
    Groq,
    Local,
}

impl ProviderName {
    /// The fixed summarization order.
    pub const SUMMARIZATION_ORDER: [ProviderName; 5] = [
        ProviderName::Custom,
        ProviderName::OpenAi,
        ProviderName::Gemini,
        ProviderName::Groq,
        ProviderName::Local,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderName::Custom => "custom",
            ProviderName::OpenAi => "openai",
            ProviderName::Gemini => "gemini",
            ProviderName::Groq => "groq",
            ProviderName::Local => "local",
        }
    }

    /// Lower is tried first.
    pub fn priority(&self) -> u8 {
        match self {
            ProviderName::Custom => 0,
            ProviderName::OpenAi => 1,
            ProviderName::Gemini => 2,
            ProviderName::Groq => 3,
            ProviderName::Local => 4,
        }
    }
}

impl std::str::FromStr for ProviderName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "custom" => Ok(ProviderName::Custom),
            "openai" => Ok(ProviderName::OpenAi),
            "gemini" => Ok(ProviderName::Gemini),
            "groq" => Ok(ProviderName::Groq),
            "local" => Ok(ProviderName::Local),
            _ => Err(format!("Unknown provider: {}", s)),
        }
    }
}

impl std::fmt::Display for ProviderName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a provider is usable and where it sits in the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderCapability<N> {
    pub name: N,
    pub enabled: bool,
    pub priority: u8,
}

fn non_empty(s: &str) -> bool {
    !s.trim().is_empty()
}

/// Pure enablement rule for a summarization provider.
pub fn provider_enabled(settings: &Settings, oauth_present: bool, name: ProviderName) -> bool {
    match name {
        ProviderName::Custom => {
            non_empty(&settings.custom.api_url)
                && non_empty(&settings.custom.api_key)
                && non_empty(&settings.custom.model)
        }
        ProviderName::OpenAi => non_empty(&settings.openai.api_key),
        ProviderName::Gemini => non_empty(&settings.gemini.api_key) || oauth_present,
        ProviderName::Groq => non_empty(&settings.groq.api_key),
        ProviderName::Local => true,
    }
}

/// Pure enablement rule for a TTS engine.
pub fn tts_enabled(settings: &Settings, engine: TtsEngine) -> bool {
    match engine {
        TtsEngine::OpenAi => non_empty(&settings.openai.api_key),
        TtsEngine::Edge => true,
    }
}

/// Answers capability questions against a shared [`AppContext`].
#[derive(Debug, Clone)]
pub struct CapabilityResolver {
    ctx: Arc<AppContext>,
}

impl CapabilityResolver {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &Arc<AppContext> {
        &self.ctx
    }

    pub fn is_enabled(&self, name: ProviderName) -> bool {
        provider_enabled(&self.ctx.snapshot(), self.is_oauth_logged_in(), name)
    }

    pub fn is_tts_enabled(&self, engine: TtsEngine) -> bool {
        tts_enabled(&self.ctx.snapshot(), engine)
    }

    /// All summarization providers with their current state.
    pub fn summarizer_capabilities(&self) -> Vec<ProviderCapability<ProviderName>> {
        let settings = self.ctx.snapshot();
        let oauth = self.is_oauth_logged_in();
        ProviderName::SUMMARIZATION_ORDER
            .iter()
            .map(|&name| ProviderCapability {
                name,
                enabled: provider_enabled(&settings, oauth, name),
                priority: name.priority(),
            })
            .collect()
    }

    /// All TTS engines with their current state.
    pub fn tts_capabilities(&self) -> Vec<ProviderCapability<TtsEngine>> {
        let settings = self.ctx.snapshot();
        [(TtsEngine::OpenAi, 0), (TtsEngine::Edge, 1)]
            .into_iter()
            .map(|(engine, priority)| ProviderCapability {
                name: engine,
                enabled: tts_enabled(&settings, engine),
                priority,
            })
            .collect()
    }

    /// True when any remote AI summarizer is configured.
    pub fn has_ai(&self) -> bool {
        self.summarizer_capabilities()
            .iter()
            .any(|c| c.name != ProviderName::Local && c.enabled)
    }

    /// True when Google OAuth client credentials are configured.
    pub fn has_google_oauth(&self) -> bool {
        let settings = self.ctx.snapshot();
        non_empty(&settings.google.client_id) && non_empty(&settings.google.client_secret)
    }

    pub fn is_oauth_logged_in(&self) -> bool {
        self.ctx.oauth_token().is_some()
    }

    /// Speech-to-text is backed by Groq Whisper.
    pub fn has_speech_to_text(&self) -> bool {
        non_empty(&self.ctx.snapshot().groq.api_key)
    }

    /// The provider reported as preferred.
    ///
    /// `summarizer.preferred` wins when it names an enabled provider,
    /// otherwise the first enabled provider in priority order.
    pub fn preferred_summarizer(&self) -> ProviderName {
        let caps = self.summarizer_capabilities();
        let preferred = self.ctx.snapshot().summarizer.preferred;
        if let Ok(name) = preferred.parse::<ProviderName>() {
            if caps.iter().any(|c| c.name == name && c.enabled) {
                return name;
            }
        }
        caps.iter()
            .find(|c| c.enabled)
            .map(|c| c.name)
            .unwrap_or(ProviderName::Local)
    }
}
