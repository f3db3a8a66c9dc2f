//! Provider chain behavior against a stub HTTP server.

mod common;

use common::{chat_reply, gemini_reply, Reply, Stub};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tubecast::config::{AppContext, OAuthToken};
use tubecast::summarize::{Summarizer, LOCAL_LABEL};

const GEMINI_PATH: &str = "/gemini/models/gemini-test:generateContent";
const GROQ_PATH: &str = "/groq/chat/completions";
const CUSTOM_PATH: &str = "/custom/chat/completions";
const OPENAI_PATH: &str = "/openai/chat/completions";

const TRANSCRIPT: &str = "Today we look at how the borrow checker reasons about lifetimes.\nThen we refactor a small parser.";

fn context(stub: &Stub) -> Arc<AppContext> {
    let ctx = Arc::new(AppContext::default());
    configure(&ctx, stub);
    ctx
}

fn configure(ctx: &AppContext, stub: &Stub) {
    ctx.set("gemini.base_url", &stub.url("/gemini")).unwrap();
    ctx.set("gemini.model", "gemini-test").unwrap();
    ctx.set("gemini.retry.base_delay_ms", "60").unwrap();
    ctx.set("gemini.retry.error_delay_ms", "10").unwrap();
    ctx.set("groq.base_url", &stub.url("/groq")).unwrap();
    ctx.set("groq.model", "llama-test").unwrap();
    ctx.set("openai.base_url", &stub.url("/openai")).unwrap();
    ctx.set("openai.model", "gpt-test").unwrap();
    ctx.set("custom.api_url", &stub.url("/custom")).unwrap();
    ctx.set("custom.model", "qwen-test").unwrap();
}

#[tokio::test]
async fn test_gemini_backs_off_on_rate_limit_then_succeeds() {
    let stub = Stub::start().await;
    stub.script(
        GEMINI_PATH,
        [
            Reply::status(429, "slow down"),
            Reply::status(429, "slow down"),
            gemini_reply("# Lifetimes\n\nA post."),
        ],
    );
    let ctx = context(&stub);
    ctx.set("gemini.api_key", "AIza-test-key").unwrap();

    let started = Instant::now();
    let result = Summarizer::new(ctx).generate_blog("Lifetimes", TRANSCRIPT, "Rust Weekly").await;

    assert_eq!(result.provider_label, "Gemini (gemini-test)");
    assert_eq!(result.markdown, "# Lifetimes\n\nA post.");

    let hits = stub.hits(GEMINI_PATH);
    assert_eq!(hits.len(), 3);
    assert!(hits.iter().all(|h| h.query.contains("key=AIza-test-key")));
    // 60ms after the first 429, 120ms after the second.
    assert!(hits[1].at - hits[0].at >= Duration::from_millis(60));
    assert!(hits[2].at - hits[1].at >= Duration::from_millis(120));
    assert!(started.elapsed() >= Duration::from_millis(180));
}

#[tokio::test]
async fn test_retry_after_header_overrides_backoff() {
    let stub = Stub::start().await;
    stub.script(
        GEMINI_PATH,
        [
            Reply::status(429, "quota").with_header("retry-after", "0"),
            gemini_reply("post"),
        ],
    );
    let ctx = context(&stub);
    ctx.set("gemini.api_key", "AIza-test-key").unwrap();
    ctx.set("gemini.retry.base_delay_ms", "30000").unwrap();

    let started = Instant::now();
    let result = Summarizer::new(ctx).generate_blog("T", TRANSCRIPT, "C").await;

    assert_eq!(result.provider_label, "Gemini (gemini-test)");
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_exhausted_gemini_falls_through_to_groq() {
    let stub = Stub::start().await;
    stub.script(GEMINI_PATH, (0..3).map(|_| Reply::status(429, "quota")));
    stub.script(GROQ_PATH, [chat_reply("# From Groq")]);
    let ctx = context(&stub);
    ctx.set("gemini.api_key", "AIza-test-key").unwrap();
    ctx.set("groq.api_key", "gsk-test").unwrap();
    ctx.set("gemini.retry.base_delay_ms", "5").unwrap();

    let result = Summarizer::new(ctx).generate_blog("T", TRANSCRIPT, "C").await;

    assert_eq!(result.provider_label, "Groq (llama-test)");
    assert_eq!(result.markdown, "# From Groq");
    assert_eq!(stub.hits(GEMINI_PATH).len(), 3);
    let groq = stub.hits(GROQ_PATH);
    assert_eq!(groq.len(), 1);
    assert_eq!(groq[0].authorization.as_deref(), Some("Bearer gsk-test"));
}

#[tokio::test]
async fn test_rejected_oauth_token_is_cleared_and_key_used() {
    let stub = Stub::start().await;
    stub.script(
        GEMINI_PATH,
        [Reply::status(401, "invalid token"), gemini_reply("# Via key")],
    );
    let data_dir = tempfile::tempdir().unwrap();
    let ctx = context(&stub);
    ctx.set("general.data_dir", data_dir.path().to_str().unwrap()).unwrap();
    ctx.set("gemini.api_key", "AIza-test-key").unwrap();
    ctx.set_oauth_token(OAuthToken::new("ya29.expired"));

    let result = Summarizer::new(ctx.clone()).generate_blog("T", TRANSCRIPT, "C").await;

    assert_eq!(result.provider_label, "Gemini (gemini-test)");
    assert!(ctx.oauth_token().is_none());

    let hits = stub.hits(GEMINI_PATH);
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].authorization.as_deref(), Some("Bearer ya29.expired"));
    assert!(!hits[0].query.contains("key="));
    assert_eq!(hits[1].authorization, None);
    assert!(hits[1].query.contains("key=AIza-test-key"));
}

#[tokio::test]
async fn test_rejected_oauth_without_key_falls_to_local() {
    let stub = Stub::start().await;
    stub.script(GEMINI_PATH, [Reply::status(401, "invalid token")]);
    let data_dir = tempfile::tempdir().unwrap();
    let ctx = context(&stub);
    ctx.set("general.data_dir", data_dir.path().to_str().unwrap()).unwrap();
    ctx.set_oauth_token(OAuthToken::new("ya29.expired"));

    let result = Summarizer::new(ctx.clone()).generate_blog("T", TRANSCRIPT, "C").await;

    assert_eq!(result.provider_label, LOCAL_LABEL);
    assert!(ctx.oauth_token().is_none());
    assert_eq!(stub.hits(GEMINI_PATH).len(), 1);
}

#[tokio::test]
async fn test_rejected_stored_token_is_not_restored() {
    let stub = Stub::start().await;
    stub.script(GEMINI_PATH, [Reply::status(401, "invalid token")]);
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    let config_path = dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        format!("[general]\ndata_dir = {:?}\n", data_dir.to_str().unwrap()),
    )
    .unwrap();

    let ctx = Arc::new(AppContext::load(Some(&config_path)).unwrap());
    ctx.set_oauth_token(OAuthToken::new("ya29.stale"));
    ctx.persist_oauth_token().unwrap();
    assert!(data_dir.join("oauth.token").exists());

    let ctx = Arc::new(AppContext::load(Some(&config_path)).unwrap());
    assert!(ctx.oauth_token().is_some());
    configure(&ctx, &stub);

    let result = Summarizer::new(ctx.clone()).generate_blog("T", TRANSCRIPT, "C").await;

    assert_eq!(result.provider_label, LOCAL_LABEL);
    assert!(!data_dir.join("oauth.token").exists());
    let reloaded = AppContext::load(Some(&config_path)).unwrap();
    assert!(reloaded.oauth_token().is_none());
}

#[tokio::test]
async fn test_chat_rate_limit_fails_over_immediately() {
    let stub = Stub::start().await;
    stub.script(CUSTOM_PATH, [Reply::status(429, "busy"), chat_reply("never used")]);
    stub.script(OPENAI_PATH, [chat_reply("# From OpenAI")]);
    let ctx = context(&stub);
    ctx.set("custom.api_key", "custom-key").unwrap();
    ctx.set("openai.api_key", "sk-test").unwrap();

    let result = Summarizer::new(ctx).generate_blog("T", TRANSCRIPT, "C").await;

    assert_eq!(result.provider_label, "OpenAI (gpt-test)");
    assert_eq!(stub.hits(CUSTOM_PATH).len(), 1);
    assert_eq!(stub.hits(OPENAI_PATH).len(), 1);
}

#[tokio::test]
async fn test_malformed_reply_falls_through() {
    let stub = Stub::start().await;
    stub.script(OPENAI_PATH, [Reply::json(r#"{"choices":[]}"#)]);
    stub.script(GROQ_PATH, [chat_reply("# Groq")]);
    let ctx = context(&stub);
    ctx.set("openai.api_key", "sk-test").unwrap();
    ctx.set("groq.api_key", "gsk-test").unwrap();

    let result = Summarizer::new(ctx).generate_blog("T", TRANSCRIPT, "C").await;
    assert_eq!(result.provider_label, "Groq (llama-test)");
}

#[tokio::test]
async fn test_unreachable_gemini_retries_then_uses_local() {
    let ctx = Arc::new(AppContext::default());
    ctx.set("gemini.api_key", "AIza-test-key").unwrap();
    // Nothing listens on port 9 locally.
    ctx.set("gemini.base_url", "http://127.0.0.1:9").unwrap();
    ctx.set("gemini.retry.error_delay_ms", "10").unwrap();
    ctx.set("gemini.timeout_seconds", "5").unwrap();

    let result = Summarizer::new(ctx).generate_blog("Offline", TRANSCRIPT, "C").await;

    assert_eq!(result.provider_label, LOCAL_LABEL);
    assert!(result.markdown.contains("borrow checker"));
}

#[tokio::test]
async fn test_empty_transcript_sends_nothing() {
    let stub = Stub::start().await;
    let ctx = context(&stub);
    ctx.set("gemini.api_key", "AIza-test-key").unwrap();
    ctx.set("groq.api_key", "gsk-test").unwrap();

    let result = Summarizer::new(ctx).generate_blog("Silent", "", "C").await;

    assert_eq!(result.provider_label, "none");
    assert!(stub.hits(GEMINI_PATH).is_empty());
    assert!(stub.hits(GROQ_PATH).is_empty());
}
