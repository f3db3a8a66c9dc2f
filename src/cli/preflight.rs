//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools are available before starting operations
//! that would otherwise fail midway.

use crate::capability::tts_enabled;
use crate::config::{Settings, TtsEngine};
use crate::error::{Result, TubecastError};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Anything reading from YouTube needs yt-dlp.
    FetchVideo,
    /// Narration needs edge-tts unless OpenAI TTS is usable.
    Narrate,
    /// Summarizing a local transcript has no external requirements.
    Summarize,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::FetchVideo => {
            check_tool("yt-dlp")?;
        }
        Operation::Narrate => {
            if !tts_enabled(settings, TtsEngine::OpenAi) {
                check_tool(&settings.tts.edge_command)?;
            }
        }
        Operation::Summarize => {}
    }
    Ok(())
}

/// Check if an external tool is available.
pub fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(TubecastError::ToolFailed(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(TubecastError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(TubecastError::ToolNotFound(format!("{}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_has_no_requirements() {
        assert!(check(Operation::Summarize, &Settings::default()).is_ok());
    }

    #[test]
    fn test_missing_tool() {
        let err = check_tool("tubecast-no-such-tool-xyz").unwrap_err();
        assert!(matches!(err, TubecastError::ToolNotFound(_)));
    }

    #[test]
    fn test_narrate_with_openai_skips_edge_check() {
        let mut settings = Settings::default();
        settings.tts.edge_command = "tubecast-no-such-tool-xyz".to_string();
        assert!(check(Operation::Narrate, &settings).is_err());

        settings.openai.api_key = "sk-test".to_string();
        assert!(check(Operation::Narrate, &settings).is_ok());
    }
}
