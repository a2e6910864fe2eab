use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

const DEFAULT_CONFIG: &str = include_str!("../../../config/default.toml");

/// Top-level application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub browse: BrowseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub base_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://gutendex.com/books".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowseConfig {
    pub debounce_ms: u64,
    pub reveal_stagger_ms: u64,
}

impl BrowseConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn reveal_stagger(&self) -> Duration {
        Duration::from_millis(self.reveal_stagger_ms)
    }
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            reveal_stagger_ms: 50,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database location; the platform data dir when unset.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Write logs to a daily file in the data dir instead of stderr.
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "gutenshelf=info".into(),
            file: false,
        }
    }
}

impl AppConfig {
    /// Load config from the user config path, or the built-in defaults.
    pub fn load() -> Result<Self, CoreError> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path` if it exists, otherwise the built-in defaults.
    pub fn load_from(path: &Path) -> Result<Self, CoreError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).map_err(|e| CoreError::Config(e.to_string()))?;
        toml::from_str(&content).map_err(|e| CoreError::Config(format!("{}: {e}", path.display())))
    }

    /// Save current config to the user config file.
    pub fn save(&self) -> Result<(), CoreError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), CoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| CoreError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Path to user config file (XDG on Linux, AppData on Windows).
    pub fn config_path() -> PathBuf {
        project_dirs()
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    /// Path to the database file, honouring `storage.path`.
    pub fn db_path(&self) -> PathBuf {
        if let Some(ref path) = self.storage.path {
            return path.clone();
        }
        data_dir()
            .map(|d| d.join("gutenshelf.db"))
            .unwrap_or_else(|| PathBuf::from("gutenshelf.db"))
    }

    /// Ensure the database's parent directory exists and return the DB path.
    pub fn ensure_db_path(&self) -> Result<PathBuf, CoreError> {
        let path = self.db_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(path)
    }

    /// Directory for rolling log files.
    pub fn log_dir() -> PathBuf {
        data_dir()
            .map(|d| d.join("logs"))
            .unwrap_or_else(|| PathBuf::from("logs"))
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).expect("built-in default config is valid TOML")
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "gutenshelf")
}

fn data_dir() -> Option<PathBuf> {
    project_dirs().map(|d| d.data_dir().to_path_buf())
}
