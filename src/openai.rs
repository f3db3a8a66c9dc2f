//! OpenAI client configuration.

use crate::config::OpenAiSettings;
use crate::error::Result;
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Create an OpenAI client from settings with the given timeout.
///
/// Key and base URL come from the settings snapshot, not the process environment.
pub fn create_client(settings: &OpenAiSettings, timeout: Duration) -> Result<Client<OpenAIConfig>> {
    let http_client = crate::http::build_client(timeout)?;

    let config = OpenAIConfig::new()
        .with_api_key(settings.api_key.clone())
        .with_api_base(settings.base_url.trim_end_matches('/').to_string());

    Ok(Client::with_config(config).with_http_client(http_client))
}
