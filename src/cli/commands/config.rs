//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::{mask_key, AppContext, OAuthToken, Settings};
use anyhow::Result;
use std::sync::Arc;

/// Copy of the settings with every secret masked.
pub fn masked(settings: &Settings) -> Settings {
    let mut masked = settings.clone();
    for secret in [
        &mut masked.custom.api_key,
        &mut masked.openai.api_key,
        &mut masked.gemini.api_key,
        &mut masked.groq.api_key,
        &mut masked.google.client_secret,
    ] {
        *secret = mask_key(&*secret);
    }
    masked
}

/// Run the config command.
pub fn run_config(action: &ConfigAction, ctx: Arc<AppContext>) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&masked(&ctx.snapshot()))
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Set { key, value } => {
            ctx.set_persistent(key, value)?;
            let shown = if key.ends_with("api_key") || key.ends_with("secret") {
                mask_key(value)
            } else {
                value.clone()
            };
            Output::success(&format!("{} = {}", key, shown));
        }

        ConfigAction::Path => {
            let config_path = ctx
                .config_path()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(Settings::default_config_path);
            println!("{}", config_path.display());
        }

        ConfigAction::OauthToken { token, refresh, persist } => {
            ctx.set_oauth_token(OAuthToken {
                access_token: token.clone(),
                refresh_token: refresh.clone(),
            });
            if *persist {
                ctx.persist_oauth_token()?;
                Output::success("OAuth token stored for future runs.");
            } else {
                Output::success("OAuth token set for this run.");
            }
        }

        ConfigAction::OauthClear => {
            ctx.discard_oauth_token()?;
            Output::success("OAuth token cleared.");
        }
    }

    Ok(())
}
