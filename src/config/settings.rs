//! Configuration settings for Tubecast.

use crate::error::{Result, TubecastError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub custom: CustomApiSettings,
    pub openai: OpenAiSettings,
    pub gemini: GeminiSettings,
    pub groq: GroqSettings,
    pub google: GoogleSettings,
    pub summarizer: SummarizerSettings,
    pub transcript: TranscriptSettings,
    pub tts: TtsSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Directory for temporary files.
    pub temp_dir: String,
    /// Directory where generated blogs and audio are written.
    pub output_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.tubecast".to_string(),
            temp_dir: "/tmp/tubecast".to_string(),
            output_dir: "~/.tubecast/output".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Custom OpenAI-compatible endpoint (highest summarization priority).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomApiSettings {
    /// Base URL, `/chat/completions` is appended.
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_seconds: u64,
}

impl Default for CustomApiSettings {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            api_key: String::new(),
            model: String::new(),
            timeout_seconds: 120,
        }
    }
}

/// OpenAI settings, shared by summarization and TTS.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 4000,
            timeout_seconds: 60,
        }
    }
}

/// Retry settings for providers that retry on rate limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Wait after a 429 without `Retry-After`, multiplied by the attempt number.
    pub base_delay_ms: u64,
    /// Wait after a network error.
    pub error_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 5000,
            error_delay_ms: 3000,
        }
    }
}

/// Google Gemini settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
    pub retry: RetrySettings,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.0-flash".to_string(),
            timeout_seconds: 60,
            retry: RetrySettings::default(),
        }
    }
}

/// Groq settings (chat summarization and Whisper transcription).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroqSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
    pub transcription_model: String,
    pub transcription_timeout_seconds: u64,
}

impl Default for GroqSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            max_tokens: 4000,
            timeout_seconds: 60,
            transcription_model: "whisper-large-v3".to_string(),
            transcription_timeout_seconds: 300,
        }
    }
}

/// Google OAuth client credentials.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GoogleSettings {
    pub client_id: String,
    pub client_secret: String,
}

/// Summarization behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerSettings {
    /// Provider reported as preferred by `status`. Empty means "first enabled".
    pub preferred: String,
    /// Language the blog post is written in.
    pub language: String,
    pub temperature: f32,
}

impl Default for SummarizerSettings {
    fn default() -> Self {
        Self {
            preferred: String::new(),
            language: "zh".to_string(),
            temperature: 0.7,
        }
    }
}

/// Transcript acquisition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptSettings {
    pub preferred_language: String,
    /// Tried after the preferred language.
    pub regional_variants: Vec<String>,
    /// Tried after the regional variants.
    pub alternate_languages: Vec<String>,
    /// Language order for the raw subtitle fallback.
    pub subtitle_languages: Vec<String>,
    /// Target code for machine translation. Empty means the preferred language.
    pub translation_target: String,
    pub request_timeout_seconds: u64,
    /// Download and transcribe audio when a video has no captions.
    pub transcribe_audio: bool,
}

impl Default for TranscriptSettings {
    fn default() -> Self {
        Self {
            preferred_language: "zh".to_string(),
            regional_variants: ["zh-Hans", "zh-Hant", "zh-CN", "zh-TW"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            alternate_languages: ["en", "en-US", "en-GB"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            subtitle_languages: ["zh-Hans", "zh-Hant", "en"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            translation_target: "zh-Hans".to_string(),
            request_timeout_seconds: 30,
            transcribe_audio: true,
        }
    }
}

/// Text-to-speech engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TtsEngine {
    /// OpenAI TTS (paid, 4096 character ceiling per request).
    OpenAi,
    /// Microsoft Edge neural voices via the `edge-tts` tool (free).
    #[default]
    Edge,
}

impl std::str::FromStr for TtsEngine {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(TtsEngine::OpenAi),
            "edge" => Ok(TtsEngine::Edge),
            _ => Err(format!("Unknown TTS engine: {}", s)),
        }
    }
}

impl std::fmt::Display for TtsEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TtsEngine::OpenAi => write!(f, "openai"),
            TtsEngine::Edge => write!(f, "edge"),
        }
    }
}

/// Narration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsSettings {
    pub engine: TtsEngine,
    /// Edge voice.
    pub voice: String,
    pub openai_voice: String,
    pub openai_model: String,
    pub openai_max_chars: usize,
    pub openai_timeout_seconds: u64,
    /// Command used to run Edge TTS.
    pub edge_command: String,
}

impl Default for TtsSettings {
    fn default() -> Self {
        Self {
            engine: TtsEngine::Edge,
            voice: "zh-CN-XiaoxiaoNeural".to_string(),
            openai_voice: "nova".to_string(),
            openai_model: "tts-1".to_string(),
            openai_max_chars: 4096,
            openai_timeout_seconds: 120,
            edge_command: "edge-tts".to_string(),
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults). Empty disables it.
    pub custom_dir: String,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

/// Environment variables that override file settings, mapped to flat keys.
pub const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("OPENAI_API_KEY", "openai.api_key"),
    ("GEMINI_API_KEY", "gemini.api_key"),
    ("GROQ_API_KEY", "groq.api_key"),
    ("CUSTOM_API_URL", "custom.api_url"),
    ("CUSTOM_API_KEY", "custom.api_key"),
    ("CUSTOM_API_MODEL", "custom.model"),
    ("GOOGLE_CLIENT_ID", "google.client_id"),
    ("GOOGLE_CLIENT_SECRET", "google.client_secret"),
    ("TTS_ENGINE", "tts.engine"),
    ("TTS_VOICE", "tts.voice"),
    ("SUMMARIZER", "summarizer.preferred"),
];

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    ///
    /// Environment overrides are applied on top of the file.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path(),
        };

        let mut settings = Self::from_file(&config_path)?;
        settings.apply_env_overrides();
        Ok(settings)
    }

    /// Read a configuration file without environment overrides. A missing
    /// file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Settings::default())
        }
    }

    /// Apply non-empty environment variables from [`ENV_OVERRIDES`].
    pub fn apply_env_overrides(&mut self) {
        for (var, key) in ENV_OVERRIDES {
            let Ok(value) = std::env::var(var) else {
                continue;
            };
            if value.trim().is_empty() {
                continue;
            }
            if let Err(e) = self.set(key, value.trim()) {
                tracing::warn!(variable = %var, error = %e, "Ignoring environment override");
            }
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| TubecastError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tubecast")
            .join("config.toml")
    }

    /// Read a value by flat dotted key, e.g. `gemini.retry.max_attempts`.
    ///
    /// Strings are returned verbatim, other scalars in TOML notation.
    pub fn get(&self, key: &str) -> Option<String> {
        let root = toml::Value::try_from(self).ok()?;
        let mut current = &root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        match current {
            toml::Value::String(s) => Some(s.clone()),
            toml::Value::Table(_) => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a value by flat dotted key. The key must already exist and the
    /// value must parse as the existing value's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut root = toml::Value::try_from(&*self)
            .map_err(|e| TubecastError::Config(e.to_string()))?;

        let (parent_path, leaf) = key
            .rsplit_once('.')
            .ok_or_else(|| TubecastError::Config(format!("Unknown configuration key: {}", key)))?;

        let mut table = &mut root;
        for part in parent_path.split('.') {
            table = table
                .get_mut(part)
                .ok_or_else(|| TubecastError::Config(format!("Unknown configuration key: {}", key)))?;
        }
        let table = table
            .as_table_mut()
            .ok_or_else(|| TubecastError::Config(format!("Unknown configuration key: {}", key)))?;

        let existing = table
            .get(leaf)
            .ok_or_else(|| TubecastError::Config(format!("Unknown configuration key: {}", key)))?;
        let parsed = parse_like(existing, value).ok_or_else(|| {
            TubecastError::Config(format!("Invalid value for {}: {}", key, value))
        })?;
        table.insert(leaf.to_string(), parsed);

        *self = root
            .try_into()
            .map_err(|e: toml::de::Error| TubecastError::Config(format!("Invalid value for {}: {}", key, e)))?;
        Ok(())
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }

    /// Get the expanded output directory path.
    pub fn output_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.output_dir)
    }

    /// Directory holding generated markdown and blog records.
    pub fn blogs_dir(&self) -> PathBuf {
        self.output_dir().join("blogs")
    }

    /// Directory holding generated narration.
    pub fn audio_dir(&self) -> PathBuf {
        self.output_dir().join("audio")
    }
}

/// Parse `value` into the same TOML type as `existing`.
fn parse_like(existing: &toml::Value, value: &str) -> Option<toml::Value> {
    match existing {
        toml::Value::String(_) => Some(toml::Value::String(value.to_string())),
        toml::Value::Integer(_) => value.trim().parse().ok().map(toml::Value::Integer),
        toml::Value::Float(_) => value.trim().parse().ok().map(toml::Value::Float),
        toml::Value::Boolean(_) => value.trim().parse().ok().map(toml::Value::Boolean),
        toml::Value::Array(_) => Some(toml::Value::Array(
            value
                .split(',')
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(|s| toml::Value::String(s.to_string()))
                .collect(),
        )),
        _ => None,
    }
}

/// Mask an API key for display, showing only the first and last 4 characters.
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.is_empty() {
        return String::new();
    }
    if chars.len() < 10 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}****{}", head, tail)
}
