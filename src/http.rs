//! Shared HTTP helpers for provider calls.

use crate::error::Result;
use reqwest::header::RETRY_AFTER;
use reqwest::{RequestBuilder, StatusCode};
use std::time::Duration;

/// Characters of an error body kept in logs.
const DETAIL_CHARS: usize = 300;

/// Build a reqwest client with a request timeout.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// Truncate to at most `max_chars` characters, on a char boundary.
pub fn truncate_chars(input: &str, max_chars: usize) -> &str {
    match input.char_indices().nth(max_chars) {
        Some((idx, _)) => &input[..idx],
        None => input,
    }
}

/// Classified result of a single HTTP call.
#[derive(Debug)]
pub enum Outcome {
    /// 2xx with the raw body.
    Success(String),
    /// 429, with the server's `Retry-After` if it sent one in seconds.
    RateLimited {
        retry_after: Option<Duration>,
        detail: String,
    },
    /// 401.
    Unauthorized { detail: String },
    /// Any other non-2xx status.
    Status { status: StatusCode, detail: String },
    /// Connection, timeout or body read failure.
    Transport(String),
}

/// Send a request and classify the response.
pub async fn send(request: RequestBuilder) -> Outcome {
    let response = match request.send().await {
        Ok(r) => r,
        Err(e) => return Outcome::Transport(e.to_string()),
    };

    let status = response.status();
    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs);

    let body = match response.text().await {
        Ok(b) => b,
        Err(e) => return Outcome::Transport(e.to_string()),
    };

    if status.is_success() {
        return Outcome::Success(body);
    }

    let detail = truncate_chars(&body, DETAIL_CHARS).to_string();
    match status {
        StatusCode::TOO_MANY_REQUESTS => Outcome::RateLimited {
            retry_after,
            detail,
        },
        StatusCode::UNAUTHORIZED => Outcome::Unauthorized { detail },
        _ => Outcome::Status { status, detail },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_multibyte() {
        assert_eq!(truncate_chars("你好世界", 2), "你好");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }
}
