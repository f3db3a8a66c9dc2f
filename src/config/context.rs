//! Shared configuration context.
//!
//! Holds the current settings and the Google OAuth token slot. Every component
//! receives an `Arc<AppContext>` and reads a fresh snapshot per operation, so
//! edits made through `set`/`reload` are visible to the next call.

use super::settings::Settings;
use crate::error::{Result, TubecastError};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// OAuth access token obtained from an external login flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

impl OAuthToken {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
        }
    }
}

/// Configuration context with interior mutability.
///
/// Writers are last-writer-wins. A poisoned lock is recovered rather than
/// propagated since the guarded data is plain configuration.
#[derive(Debug)]
pub struct AppContext {
    settings: RwLock<Settings>,
    oauth: RwLock<Option<OAuthToken>>,
    config_path: Option<PathBuf>,
}

impl AppContext {
    /// Create a context around already loaded settings, with no backing file.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: RwLock::new(settings),
            oauth: RwLock::new(None),
            config_path: None,
        }
    }

    /// Load settings from `path` (or the default location) and restore a
    /// persisted OAuth token if one exists in the data directory.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let settings = Settings::load_from(path)?;
        let token_path = settings.data_dir().join("oauth.token");
        let oauth = std::fs::read_to_string(&token_path)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(OAuthToken::new);

        Ok(Self {
            settings: RwLock::new(settings),
            oauth: RwLock::new(oauth),
            config_path: Some(
                path.map(Path::to_path_buf)
                    .unwrap_or_else(Settings::default_config_path),
            ),
        })
    }

    /// Path of the backing configuration file, if any.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Clone of the current settings.
    pub fn snapshot(&self) -> Settings {
        self.settings
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Read a value by flat dotted key.
    pub fn get(&self, key: &str) -> Option<String> {
        self.settings
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
    }

    /// Set a value by flat dotted key, in memory only.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.settings
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .set(key, value)
    }

    /// Apply an arbitrary change to the settings.
    pub fn update<F: FnOnce(&mut Settings)>(&self, f: F) {
        let mut guard = self.settings.write().unwrap_or_else(|e| e.into_inner());
        f(&mut guard);
    }

    /// Re-read settings from the backing file.
    pub fn reload(&self) -> Result<()> {
        let fresh = Settings::load_from(self.config_path.as_deref())?;
        *self.settings.write().unwrap_or_else(|e| e.into_inner()) = fresh;
        Ok(())
    }

    /// Write the current settings to the backing file.
    pub fn persist(&self) -> Result<()> {
        let path = self
            .config_path
            .as_deref()
            .ok_or_else(|| TubecastError::Config("No configuration file is associated with this context".to_string()))?;
        self.snapshot().save_to(path)
    }

    /// Change one key in the backing file and reload.
    ///
    /// Unlike `set` followed by `persist`, values that only come from
    /// environment overrides are not written to the file.
    pub fn set_persistent(&self, key: &str, value: &str) -> Result<()> {
        let path = self
            .config_path
            .as_deref()
            .ok_or_else(|| TubecastError::Config("No configuration file is associated with this context".to_string()))?;
        let mut on_disk = Settings::from_file(path)?;
        on_disk.set(key, value)?;
        on_disk.save_to(path)?;
        self.reload()
    }

    pub fn oauth_token(&self) -> Option<OAuthToken> {
        self.oauth.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn set_oauth_token(&self, token: OAuthToken) {
        *self.oauth.write().unwrap_or_else(|e| e.into_inner()) = Some(token);
    }

    pub fn clear_oauth_token(&self) {
        *self.oauth.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    /// Forget the token for this run and every later one.
    pub fn discard_oauth_token(&self) -> Result<()> {
        self.clear_oauth_token();
        self.persist_oauth_token()
    }

    /// Store the token for future runs, or remove the stored token when `None`.
    pub fn persist_oauth_token(&self) -> Result<()> {
        let dir = self.snapshot().data_dir();
        let path = dir.join("oauth.token");
        match self.oauth_token() {
            Some(token) => {
                std::fs::create_dir_all(&dir)?;
                std::fs::write(&path, token.access_token)?;
            }
            None => {
                if path.exists() {
                    std::fs::remove_file(&path)?;
                }
            }
        }
        Ok(())
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_is_visible_in_next_snapshot() {
        let ctx = AppContext::default();
        assert_eq!(ctx.snapshot().groq.api_key, "");
        ctx.set("groq.api_key", "gsk_live").unwrap();
        assert_eq!(ctx.snapshot().groq.api_key, "gsk_live");
        assert_eq!(ctx.get("groq.api_key").as_deref(), Some("gsk_live"));
    }

    #[test]
    fn test_oauth_slot() {
        let ctx = AppContext::default();
        assert!(ctx.oauth_token().is_none());
        ctx.set_oauth_token(OAuthToken::new("ya29.token"));
        assert_eq!(ctx.oauth_token().unwrap().access_token, "ya29.token");
        ctx.clear_oauth_token();
        ctx.clear_oauth_token();
        assert!(ctx.oauth_token().is_none());
    }

    #[test]
    fn test_discard_removes_stored_token() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = AppContext::default();
        ctx.set("general.data_dir", dir.path().to_str().unwrap()).unwrap();
        ctx.set_oauth_token(OAuthToken::new("ya29.token"));
        ctx.persist_oauth_token().unwrap();

        ctx.discard_oauth_token().unwrap();
        assert!(ctx.oauth_token().is_none());
        assert!(!dir.path().join("oauth.token").exists());
        // Nothing stored is fine too.
        ctx.discard_oauth_token().unwrap();
    }

    #[test]
    fn test_persist_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let ctx = AppContext::load(Some(&path)).unwrap();
        ctx.set("custom.model", "qwen-max").unwrap();
        ctx.persist().unwrap();

        ctx.update(|s| s.custom.model.clear());
        assert_eq!(ctx.snapshot().custom.model, "");

        ctx.reload().unwrap();
        assert_eq!(ctx.snapshot().custom.model, "qwen-max");
    }

    #[test]
    fn test_set_persistent_keeps_other_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[tts]\nvoice = \"en-US-GuyNeural\"\n").unwrap();
        let ctx = AppContext::load(Some(&path)).unwrap();

        ctx.set_persistent("summarizer.language", "en").unwrap();
        assert_eq!(ctx.snapshot().summarizer.language, "en");

        let on_disk = Settings::from_file(&path).unwrap();
        assert_eq!(on_disk.summarizer.language, "en");
        assert_eq!(on_disk.tts.voice, "en-US-GuyNeural");
        assert!(ctx.set_persistent("no.such_key", "1").is_err());
    }

    #[test]
    fn test_persist_without_path_fails() {
        let ctx = AppContext::default();
        assert!(ctx.persist().is_err());
    }
}
