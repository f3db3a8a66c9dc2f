//! Status command implementation.

use crate::capability::{CapabilityResolver, ProviderName};
use crate::cli::Output;
use crate::config::{mask_key, AppContext, Settings, TtsEngine};
use anyhow::Result;
use std::sync::Arc;

/// Describe how a summarization provider is configured.
fn provider_detail(settings: &Settings, name: ProviderName, oauth: bool) -> String {
    match name {
        ProviderName::Custom => format!(
            "{} {} key {}",
            settings.custom.api_url,
            settings.custom.model,
            mask_key(&settings.custom.api_key)
        ),
        ProviderName::OpenAi => format!("{} key {}", settings.openai.model, mask_key(&settings.openai.api_key)),
        ProviderName::Gemini => {
            let auth = if oauth { "oauth" } else { "key" };
            format!("{} {} {}", settings.gemini.model, auth, mask_key(&settings.gemini.api_key))
        }
        ProviderName::Groq => format!("{} key {}", settings.groq.model, mask_key(&settings.groq.api_key)),
        ProviderName::Local => "simple extraction".to_string(),
    }
}

/// Run the status command.
pub fn run_status(ctx: Arc<AppContext>) -> Result<()> {
    let settings = ctx.snapshot();
    let resolver = CapabilityResolver::new(ctx);
    let oauth = resolver.is_oauth_logged_in();

    Output::header("Summarization");
    for cap in resolver.summarizer_capabilities() {
        Output::capability(cap.name.as_str(), cap.enabled, &provider_detail(&settings, cap.name, oauth));
    }
    Output::kv("Preferred", resolver.preferred_summarizer().as_str());

    Output::header("Narration");
    for cap in resolver.tts_capabilities() {
        let detail = match cap.name {
            TtsEngine::OpenAi => format!("{} voice {}", settings.tts.openai_model, settings.tts.openai_voice),
            TtsEngine::Edge => format!("voice {}", settings.tts.voice),
        };
        Output::capability(&cap.name.to_string(), cap.enabled, &detail);
    }
    Output::kv("Engine", &settings.tts.engine.to_string());

    Output::header("Transcripts");
    Output::capability("speech-to-text", resolver.has_speech_to_text(), &settings.groq.transcription_model);
    Output::kv("Language", &settings.transcript.preferred_language);

    Output::header("Google");
    Output::capability("oauth client", resolver.has_google_oauth(), &mask_key(&settings.google.client_id));
    Output::capability("logged in", oauth, "");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_detail_masks_keys() {
        let mut settings = Settings::default();
        settings.groq.api_key = "gsk_abcdefghijklmnop".to_string();
        let detail = provider_detail(&settings, ProviderName::Groq, false);
        assert!(detail.contains("gsk_****mnop"));
        assert!(!detail.contains("abcdefghijkl"));

        let detail = provider_detail(&settings, ProviderName::Gemini, true);
        assert!(detail.contains("oauth"));
    }
}
