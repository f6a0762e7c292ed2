//! Configuration handling for the Cirrus client
//!
//! Configuration is stored in `~/.config/cirrus/config.toml` (or the
//! platform equivalent). `CIRRUS_CONFIG_DIR` overrides the directory,
//! which tests rely on.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("No target named {0:?} is configured")]
    UnknownTarget(String),

    #[error("A target named {0:?} already exists")]
    DuplicateTarget(String),
}

/// Persistent client state: named API targets, the current selection, and
/// the session token.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientConfig {
    /// Label -> endpoint URL.
    #[serde(default)]
    pub targets: BTreeMap<String, String>,

    /// Label of the target invocations run against.
    #[serde(default)]
    pub current: Option<String>,

    /// Session token obtained by `login`.
    #[serde(default)]
    pub token: Option<String>,

    /// When the token was last written.
    #[serde(default)]
    pub token_updated_at: Option<DateTime<Utc>>,
}

impl ClientConfig {
    /// URL of the current target, if one is selected.
    pub fn current_url(&self) -> Option<&str> {
        let label = self.current.as_deref()?;
        self.targets.get(label).map(String::as_str)
    }
}

/// Loads and saves the client configuration file. Constructed once in the
/// entry point and handed to the commands that need it.
pub struct ConfigStore {
    dir: PathBuf,
}

impl ConfigStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at `CIRRUS_CONFIG_DIR` when set, otherwise the
    /// platform config directory, otherwise `.cirrus` under the working
    /// directory.
    pub fn from_env() -> Self {
        if let Ok(dir) = std::env::var("CIRRUS_CONFIG_DIR") {
            if !dir.trim().is_empty() {
                return Self::new(dir);
            }
        }
        let dir = ProjectDirs::from("dev", "cirrus", "cirrus-cli")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".cirrus"));
        Self::new(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join("config.toml")
    }

    /// Directory scanned for locally installed plugins.
    pub fn plugins_dir(&self) -> PathBuf {
        self.dir.join("plugins")
    }

    /// Loads the configuration; a missing file is an empty configuration.
    pub fn load(&self) -> Result<ClientConfig> {
        let path = self.config_path();
        if !path.exists() {
            return Ok(ClientConfig::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .context("Failed to parse config")
    }

    /// Saves the configuration atomically: write to a locked temp file,
    /// then rename over the real one.
    pub fn save(&self, config: &ClientConfig) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create config dir: {}", self.dir.display()))?;

        let path = self.config_path();
        let temp_path = path.with_extension("toml.tmp");
        let content = toml::to_string_pretty(config).context("Failed to serialize config")?;

        let file = fs::File::create(&temp_path)
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;
        file.lock_exclusive()
            .context("Failed to acquire write lock on config")?;
        let mut writer = &file;
        writer
            .write_all(content.as_bytes())
            .context("Failed to write config")?;
        writer.flush().context("Failed to flush config")?;
        drop(file);

        fs::rename(&temp_path, &path)
            .with_context(|| format!("Failed to replace config: {}", path.display()))?;
        Ok(())
    }

    /// Loads, applies a mutation, and saves. Returns the updated config.
    pub fn mutate(
        &self,
        apply: impl FnOnce(&mut ClientConfig) -> Result<()>,
    ) -> Result<ClientConfig> {
        let mut config = self.load()?;
        apply(&mut config)?;
        self.save(&config)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_default() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path());
        let config = store.load().unwrap();
        assert!(config.targets.is_empty());
        assert!(config.current.is_none());
        assert!(config.token.is_none());
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path());

        let mut config = ClientConfig::default();
        config
            .targets
            .insert("prod".to_string(), "https://api.example.com".to_string());
        config.current = Some("prod".to_string());
        store.save(&config).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(
            loaded.targets.get("prod").map(String::as_str),
            Some("https://api.example.com")
        );
        assert_eq!(loaded.current.as_deref(), Some("prod"));
        assert_eq!(loaded.current_url(), Some("https://api.example.com"));
    }

    #[test]
    fn mutate_persists_changes() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path());

        store
            .mutate(|config| {
                config
                    .targets
                    .insert("dev".to_string(), "http://localhost:8080".to_string());
                Ok(())
            })
            .unwrap();

        let loaded = store.load().unwrap();
        assert!(loaded.targets.contains_key("dev"));
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path());
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.config_path(), "not [valid toml").unwrap();
        assert!(store.load().is_err());
    }

    #[test]
    fn current_url_requires_matching_target() {
        let mut config = ClientConfig::default();
        config.current = Some("gone".to_string());
        assert!(config.current_url().is_none());
    }
}
