//! Global configuration: where the store lives, which archive to pull by
//! default, and how patient the fetcher is.
//!
//! Configuration is stored as TOML at the platform config directory and is
//! optional — a missing file yields defaults. `DMETA_CONFIG_DIR` and
//! `DMETA_DATA_DIR` override the locations explicitly.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::{Error, Result};

/// Archive pulled by `reload` when no URL is given.
pub const DEFAULT_SOURCE_URL: &str =
    "https://github.com/DenizenScript/Denizen/archive/dev.zip";

const CONFIG_FILE: &str = "global.toml";

/// Global configuration for the meta cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Default settings applied to every operation.
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// File system paths.
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Default operation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Archive URL used by `reload` when none is passed.
    pub source_url: String,
    /// HTTP timeout for archive downloads, in seconds.
    pub fetch_timeout_secs: u64,
}

/// File system paths configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Root directory for the flat-file store.
    pub root: PathBuf,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            fetch_timeout_secs: 60,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            root: default_data_dir(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            defaults: DefaultsConfig::default(),
            paths: PathsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, or fall back to
    /// defaults when no file exists. A malformed file is an error.
    pub fn load() -> Result<Self> {
        let path = config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("Failed to read config: {e}")))?;
        let config = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Persist the configuration, creating the config directory if needed.
    pub fn save(&self) -> Result<()> {
        let path = config_file_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("Failed to create config dir: {e}")))?;
        }
        let toml = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))?;
        fs::write(&path, toml)
            .map_err(|e| Error::Config(format!("Failed to write config: {e}")))?;
        Ok(())
    }
}

fn config_file_path() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("DMETA_CONFIG_DIR") {
        let trimmed = dir.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed).join(CONFIG_FILE));
        }
    }

    let dirs = ProjectDirs::from("dev", "dmeta", "dmeta")
        .ok_or_else(|| Error::Config("Failed to determine config directory".into()))?;
    Ok(dirs.config_dir().join(CONFIG_FILE))
}

fn default_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("DMETA_DATA_DIR") {
        let trimmed = dir.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    ProjectDirs::from("dev", "dmeta", "dmeta")
        .map_or_else(|| PathBuf::from(".dmeta"), |dirs| dirs.data_dir().to_path_buf())
}
