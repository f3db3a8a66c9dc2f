//! Summarize command implementation.

use crate::cli::Output;
use crate::config::AppContext;
use crate::summarize::Summarizer;
use anyhow::{Context, Result};
use std::io::Read;
use std::sync::Arc;

fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read transcript from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(file).with_context(|| format!("Failed to read transcript from {}", file))
    }
}

/// Run the summarize command.
pub async fn run_summarize(
    file: &str,
    title: &str,
    channel: &str,
    output: Option<String>,
    ctx: Arc<AppContext>,
) -> Result<()> {
    let transcript = read_input(file)?;
    let summarizer = Summarizer::new(ctx);

    let spinner = Output::spinner("Writing post...");
    let result = summarizer.generate_blog(title, &transcript, channel).await;
    spinner.finish_and_clear();

    Output::info(&format!("Written by {}", result.provider_label));
    match output {
        Some(path) => {
            std::fs::write(&path, &result.markdown)?;
            Output::success(&format!("Post written to {}", path));
        }
        None => println!("{}", result.markdown),
    }

    Ok(())
}
