//! Custom OpenAI-compatible endpoint.

use super::{ChatCompletion, SummarizationResult, SummaryProvider, SummaryRequest};
use crate::capability::ProviderName;
use crate::config::AppContext;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub struct CustomProvider {
    ctx: Arc<AppContext>,
}

impl CustomProvider {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl SummaryProvider for CustomProvider {
    fn name(&self) -> ProviderName {
        ProviderName::Custom
    }

    async fn attempt(&self, request: &SummaryRequest) -> Option<SummarizationResult> {
        let settings = self.ctx.snapshot().custom;
        tracing::info!(url = %settings.api_url, model = %settings.model, "Using custom API");

        let markdown = ChatCompletion {
            provider: "custom",
            base_url: &settings.api_url,
            api_key: &settings.api_key,
            model: &settings.model,
            max_tokens: None,
            timeout: Duration::from_secs(settings.timeout_seconds),
        }
        .complete(request)
        .await?;

        Some(SummarizationResult::new(
            markdown,
            format!("Custom ({})", settings.model),
        ))
    }
}
