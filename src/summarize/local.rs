//! Offline extraction fallback. Deterministic and network free.

use super::{SummarizationResult, SummaryProvider, SummaryRequest};
use crate::capability::ProviderName;
use crate::config::{AppContext, Prompts};
use crate::http::truncate_chars;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

pub const LOCAL_LABEL: &str = "Local (simple extraction)";

const PREVIEW_LINES: usize = 5;
const MIN_LINE_CHARS: usize = 20;
const PREVIEW_CHARS: usize = 500;
const TRANSCRIPT_CHARS: usize = 3000;

/// Build the fallback post from the first significant transcript lines.
pub fn local_summary(prompts: &Prompts, title: &str, transcript: &str, channel: &str) -> SummarizationResult {
    let preview = transcript
        .split('\n')
        .map(str::trim)
        .filter(|line| line.chars().count() > MIN_LINE_CHARS)
        .take(PREVIEW_LINES)
        .collect::<Vec<_>>()
        .join("\n");

    let channel = if channel.trim().is_empty() {
        "Unknown channel"
    } else {
        channel
    };

    let mut vars = HashMap::new();
    vars.insert("title".to_string(), title.to_string());
    vars.insert("channel".to_string(), channel.to_string());
    vars.insert("preview".to_string(), truncate_chars(&preview, PREVIEW_CHARS).to_string());
    vars.insert(
        "transcript".to_string(),
        truncate_chars(transcript, TRANSCRIPT_CHARS).to_string(),
    );

    SummarizationResult::new(
        prompts.render_with_custom(&prompts.blog.local_fallback, &vars),
        LOCAL_LABEL,
    )
}

pub struct LocalProvider {
    ctx: Arc<AppContext>,
}

impl LocalProvider {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl SummaryProvider for LocalProvider {
    fn name(&self) -> ProviderName {
        ProviderName::Local
    }

    async fn attempt(&self, request: &SummaryRequest) -> Option<SummarizationResult> {
        let prompts = Prompts::from_settings(&self.ctx.snapshot().prompts);
        Some(local_summary(
            &prompts,
            &request.title,
            &request.transcript,
            &request.channel,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_takes_first_five_long_lines() {
        let transcript = (1..=8)
            .map(|i| format!("line number {} has plenty of characters", i))
            .collect::<Vec<_>>()
            .join("\nshort\n");
        let result = local_summary(&Prompts::default(), "T", &transcript, "C");

        assert_eq!(result.provider_label, LOCAL_LABEL);
        assert!(result.markdown.contains("line number 5 has"));
        let preview = result.markdown.split("<details>").next().unwrap();
        assert!(!preview.contains("line number 6 has"));
        assert!(!preview.contains("short"));
    }

    #[test]
    fn test_transcript_truncated_on_char_boundary() {
        let transcript = "字".repeat(4000);
        let result = local_summary(&Prompts::default(), "T", &transcript, "");
        assert!(result.markdown.contains(&"字".repeat(3000)));
        assert!(!result.markdown.contains(&"字".repeat(3001)));
        assert!(result.markdown.contains("Unknown channel"));
    }

    #[test]
    fn test_deterministic() {
        let a = local_summary(&Prompts::default(), "T", "some words here that are long enough", "C");
        let b = local_summary(&Prompts::default(), "T", "some words here that are long enough", "C");
        assert_eq!(a, b);
    }

    #[test]
    fn test_placeholders_in_transcript_stay_verbatim() {
        let transcript = "the host said {{channel}} and {{title}} twice on stage";
        let first = local_summary(&Prompts::default(), "Keynote", transcript, "Conf");
        assert!(first.markdown.contains(transcript));
        for _ in 0..20 {
            assert_eq!(local_summary(&Prompts::default(), "Keynote", transcript, "Conf"), first);
        }
    }
}
