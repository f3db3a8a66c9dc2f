//! Google Gemini summarization.
//!
//! Authenticates with the OAuth token when one is stored, otherwise with the
//! API key. Rate limits and transport errors are retried per [`RetryPolicy`].

use super::{RetryPolicy, SummarizationResult, SummaryProvider, SummaryRequest};
use crate::capability::ProviderName;
use crate::config::AppContext;
use crate::http::{self, Outcome};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Serialize)]
struct GeminiRequest<'a> {
    #[serde(rename = "systemInstruction")]
    system_instruction: GeminiContent<'a>,
    contents: Vec<GeminiContent<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiContentResponse,
}

#[derive(Deserialize)]
struct GeminiContentResponse {
    parts: Vec<GeminiPartResponse>,
}

#[derive(Deserialize)]
struct GeminiPartResponse {
    text: Option<String>,
}

/// Extract `candidates[0].content.parts[0].text`, non-empty.
fn decode_gemini_text(body: &str) -> Option<String> {
    let response: GeminiResponse = serde_json::from_str(body).ok()?;
    response
        .candidates?
        .into_iter()
        .next()?
        .content
        .parts
        .into_iter()
        .next()?
        .text
        .filter(|t| !t.trim().is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Auth {
    OAuth(String),
    ApiKey(String),
}

impl Auth {
    fn method(&self) -> &'static str {
        match self {
            Auth::OAuth(_) => "oauth",
            Auth::ApiKey(_) => "api_key",
        }
    }
}

pub struct GeminiProvider {
    ctx: Arc<AppContext>,
}

impl GeminiProvider {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl SummaryProvider for GeminiProvider {
    fn name(&self) -> ProviderName {
        ProviderName::Gemini
    }

    async fn attempt(&self, request: &SummaryRequest) -> Option<SummarizationResult> {
        let settings = self.ctx.snapshot().gemini;
        let policy = RetryPolicy::from(&settings.retry);
        let api_key = settings.api_key.trim().to_string();

        let mut auth = match self.ctx.oauth_token() {
            Some(token) => Auth::OAuth(token.access_token),
            None if !api_key.is_empty() => Auth::ApiKey(api_key.clone()),
            None => return None,
        };

        let client = match http::build_client(Duration::from_secs(settings.timeout_seconds)) {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, "Failed to build HTTP client");
                return None;
            }
        };

        let url = format!(
            "{}/models/{}:generateContent",
            settings.base_url.trim_end_matches('/'),
            settings.model
        );
        let body = GeminiRequest {
            system_instruction: GeminiContent {
                parts: vec![GeminiPart {
                    text: &request.system_prompt,
                }],
            },
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: &request.user_prompt,
                }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature,
            },
        };

        let mut attempt = 0u32;
        loop {
            let builder = client.post(&url).json(&body);
            let builder = match &auth {
                Auth::OAuth(token) => builder.bearer_auth(token),
                Auth::ApiKey(key) => builder.query(&[("key", key)]),
            };

            match http::send(builder).await {
                Outcome::Success(text) => {
                    let Some(markdown) = decode_gemini_text(&text) else {
                        warn!(auth = auth.method(), body = %http::truncate_chars(&text, 300), "Unexpected Gemini response shape");
                        return None;
                    };
                    info!(auth = auth.method(), "Gemini succeeded");
                    return Some(SummarizationResult::new(
                        markdown,
                        format!("Gemini ({})", settings.model),
                    ));
                }
                Outcome::RateLimited { retry_after, detail } => {
                    if !policy.has_next(attempt) {
                        warn!(attempts = attempt + 1, %detail, "Gemini still rate limited, giving up");
                        return None;
                    }
                    let delay = policy.rate_limit_delay(attempt, retry_after);
                    warn!(
                        auth = auth.method(),
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        %detail,
                        "Gemini rate limited (429), backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Outcome::Unauthorized { detail } if matches!(auth, Auth::OAuth(_)) => {
                    warn!(%detail, "OAuth token rejected, clearing it");
                    if let Err(e) = self.ctx.discard_oauth_token() {
                        warn!(error = %e, "Failed to remove stored OAuth token");
                    }
                    if api_key.is_empty() {
                        return None;
                    }
                    info!("Retrying Gemini with API key");
                    auth = Auth::ApiKey(api_key.clone());
                }
                Outcome::Unauthorized { detail } => {
                    warn!(auth = auth.method(), status = 401, %detail, "Gemini request rejected");
                    return None;
                }
                Outcome::Status { status, detail } => {
                    warn!(auth = auth.method(), status = status.as_u16(), %detail, "Gemini request rejected");
                    return None;
                }
                Outcome::Transport(error) => {
                    if !policy.has_next(attempt) {
                        warn!(auth = auth.method(), %error, "Gemini failed on every attempt");
                        return None;
                    }
                    warn!(auth = auth.method(), attempt = attempt + 1, %error, "Gemini request failed, retrying");
                    tokio::time::sleep(policy.error_delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_gemini_text() {
        let body = r##"{"candidates":[{"content":{"parts":[{"text":"# Blog"}],"role":"model"}}]}"##;
        assert_eq!(decode_gemini_text(body).as_deref(), Some("# Blog"));
    }

    #[test]
    fn test_decode_gemini_fails_closed() {
        assert_eq!(decode_gemini_text(r#"{"candidates":[]}"#), None);
        assert_eq!(decode_gemini_text(r#"{"promptFeedback":{}}"#), None);
        assert_eq!(decode_gemini_text(r#"{"candidates":[{"content":{"parts":[{}]}}]}"#), None);
        assert_eq!(decode_gemini_text("not json"), None);
    }

    #[tokio::test]
    async fn test_no_credentials_no_attempt() {
        let provider = GeminiProvider::new(Arc::new(AppContext::default()));
        let request = SummaryRequest {
            title: "t".into(),
            channel: "c".into(),
            transcript: "x".into(),
            system_prompt: "s".into(),
            user_prompt: "u".into(),
            temperature: 0.7,
        };
        assert!(provider.attempt(&request).await.is_none());
    }
}
