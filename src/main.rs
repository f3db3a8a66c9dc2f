//! Tubecast CLI entry point.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tubecast::cli::{commands, Cli, Commands};
use tubecast::config::AppContext;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("tubecast={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let config_path = cli.config.as_deref().map(PathBuf::from);
    let ctx = Arc::new(AppContext::load(config_path.as_deref())?);

    // Ensure data directories exist
    let settings = ctx.snapshot();
    std::fs::create_dir_all(settings.data_dir())?;
    std::fs::create_dir_all(settings.temp_dir())?;

    // Execute command
    match &cli.command {
        Commands::Generate { input, no_audio } => {
            commands::run_generate(input, *no_audio, ctx).await?;
        }

        Commands::Transcript { input, lang, output } => {
            commands::run_transcript(input, lang.clone(), output.clone(), ctx).await?;
        }

        Commands::Summarize {
            file,
            title,
            channel,
            output,
        } => {
            commands::run_summarize(file, title, channel, output.clone(), ctx).await?;
        }

        Commands::Speak { file, output, engine } => {
            commands::run_speak(file, output, engine.clone(), ctx).await?;
        }

        Commands::Channel { url, count } => {
            commands::run_channel(url, *count, ctx).await?;
        }

        Commands::Info { input } => {
            commands::run_info(input, ctx).await?;
        }

        Commands::List => {
            commands::run_list(ctx)?;
        }

        Commands::Status => {
            commands::run_status(ctx)?;
        }

        Commands::Voices => {
            commands::run_voices(ctx)?;
        }

        Commands::Doctor => {
            commands::run_doctor(ctx)?;
        }

        Commands::Config { action } => {
            commands::run_config(action, ctx)?;
        }
    }

    Ok(())
}
