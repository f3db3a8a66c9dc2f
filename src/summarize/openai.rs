//! OpenAI chat summarization.

use super::{ChatCompletion, SummarizationResult, SummaryProvider, SummaryRequest};
use crate::capability::ProviderName;
use crate::config::AppContext;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub struct OpenAiProvider {
    ctx: Arc<AppContext>,
}

impl OpenAiProvider {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl SummaryProvider for OpenAiProvider {
    fn name(&self) -> ProviderName {
        ProviderName::OpenAi
    }

    async fn attempt(&self, request: &SummaryRequest) -> Option<SummarizationResult> {
        let settings = self.ctx.snapshot().openai;

        let markdown = ChatCompletion {
            provider: "openai",
            base_url: &settings.base_url,
            api_key: &settings.api_key,
            model: &settings.model,
            max_tokens: Some(settings.max_tokens),
            timeout: Duration::from_secs(settings.timeout_seconds),
        }
        .complete(request)
        .await?;

        Some(SummarizationResult::new(
            markdown,
            format!("OpenAI ({})", settings.model),
        ))
    }
}
