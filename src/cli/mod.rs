//! CLI module for Tubecast.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Tubecast - YouTube videos to blog posts and narration
///
/// Fetches a video's transcript, writes a blog post with the first available
/// AI provider and narrates it with a text-to-speech engine.
#[derive(Parser, Debug)]
#[command(name = "tubecast")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a blog post (and narration) for a video
    Generate {
        /// YouTube URL or video ID
        input: String,

        /// Skip narration
        #[arg(long)]
        no_audio: bool,
    },

    /// Print or save the transcript of a video
    Transcript {
        /// YouTube URL or video ID
        input: String,

        /// Preferred transcript language (defaults to transcript.preferred_language)
        #[arg(short, long)]
        lang: Option<String>,

        /// Write the transcript to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Write a blog post from a transcript file
    Summarize {
        /// Transcript text file ("-" for stdin)
        file: String,

        /// Video title used in the prompt
        #[arg(short, long, default_value = "Untitled")]
        title: String,

        /// Channel name used in the prompt
        #[arg(long, default_value = "")]
        channel: String,

        /// Write the post to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Narrate a markdown file
    Speak {
        /// Markdown file to narrate
        file: String,

        /// Output audio file
        #[arg(short, long, default_value = "narration.mp3")]
        output: String,

        /// TTS engine (edge, openai)
        #[arg(short, long)]
        engine: Option<String>,
    },

    /// List the newest videos of a channel
    Channel {
        /// Channel URL (@handle, /channel/, /c/ or /user/ form)
        url: String,

        /// Number of videos to list
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,
    },

    /// Show video metadata
    Info {
        /// YouTube URL or video ID
        input: String,
    },

    /// List generated blog posts
    List,

    /// Show configured providers and their state
    Status,

    /// List available narration voices
    Voices,

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration (keys masked)
    Show,

    /// Set a configuration value and save it
    Set {
        /// Configuration key (e.g., "gemini.api_key")
        key: String,
        /// Configuration value
        value: String,
    },

    /// Show configuration file path
    Path,

    /// Store a Google OAuth access token for Gemini
    OauthToken {
        /// Access token
        token: String,

        /// Refresh token
        #[arg(long)]
        refresh: Option<String>,

        /// Also write the token to the data directory
        #[arg(long)]
        persist: bool,
    },

    /// Forget the stored OAuth token
    OauthClear,
}
