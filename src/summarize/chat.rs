//! OpenAI-compatible `/chat/completions` calls.
//!
//! Used by the custom, OpenAI and Groq providers. A 429 is a soft failure here,
//! only Gemini retries.

use super::SummaryRequest;
use crate::http::{self, Outcome};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

/// One configured chat endpoint.
#[derive(Debug, Clone)]
pub struct ChatCompletion<'a> {
    /// Provider name for logs.
    pub provider: &'a str,
    /// Base URL, `/chat/completions` is appended.
    pub base_url: &'a str,
    pub api_key: &'a str,
    pub model: &'a str,
    pub max_tokens: Option<u32>,
    pub timeout: Duration,
}

impl ChatCompletion<'_> {
    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Send the request once. Returns the first choice's content, or `None` on
    /// any failure or shape mismatch.
    pub async fn complete(&self, request: &SummaryRequest) -> Option<String> {
        let client = match http::build_client(self.timeout) {
            Ok(c) => c,
            Err(e) => {
                warn!(provider = self.provider, error = %e, "Failed to build HTTP client");
                return None;
            }
        };

        let body = ChatRequest {
            model: self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: self.max_tokens,
            stream: false,
        };

        debug!(provider = self.provider, model = self.model, url = %self.endpoint(), "Sending chat completion");
        let outcome = http::send(
            client
                .post(self.endpoint())
                .bearer_auth(self.api_key)
                .json(&body),
        )
        .await;

        match outcome {
            Outcome::Success(text) => {
                let content = decode_chat_content(&text);
                if content.is_none() {
                    warn!(provider = self.provider, body = %http::truncate_chars(&text, 300), "Unexpected chat response shape");
                }
                content
            }
            Outcome::RateLimited { detail, .. } => {
                warn!(provider = self.provider, %detail, "Rate limited (429)");
                None
            }
            Outcome::Unauthorized { detail } => {
                warn!(provider = self.provider, status = 401, %detail, "Request rejected");
                None
            }
            Outcome::Status { status, detail } => {
                warn!(provider = self.provider, status = status.as_u16(), %detail, "Request rejected");
                None
            }
            Outcome::Transport(error) => {
                warn!(provider = self.provider, %error, "Request failed");
                None
            }
        }
    }
}

/// Extract `choices[0].message.content`, non-empty.
pub(crate) fn decode_chat_content(body: &str) -> Option<String> {
    let response: ChatResponse = serde_json::from_str(body).ok()?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .filter(|c| !c.trim().is_empty())
}
