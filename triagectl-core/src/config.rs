use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, TriageError};
use crate::queue::DEFAULT_MINUTES_PER_PATIENT;

/// Environment variable overriding the database path
pub const DB_ENV: &str = "TRIAGECTL_DB";
/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "TRIAGECTL_CONFIG";

/// Configuration for triagectl, read from ~/.triagectl/config.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    pub storage: StorageConfig,
    pub queue: QueueConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Average consult length used for the wait estimate column
    pub minutes_per_patient: u32,
    /// Rows shown on the history tab (0 = all)
    pub history_limit: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file used while the terminal UI owns the screen
    pub file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("~/.triagectl/patients.db"),
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            minutes_per_patient: DEFAULT_MINUTES_PER_PATIENT,
            history_limit: 100,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("~/.triagectl/triagectl.log"),
        }
    }
}

impl TriageConfig {
    /// Load config from the default location, falling back to defaults if the
    /// file does not exist. Environment overrides are applied afterwards.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };

        if let Ok(db) = env::var(DB_ENV) {
            if !db.trim().is_empty() {
                config.storage.db_path = PathBuf::from(db);
            }
        }

        config.expand_paths();
        Ok(config)
    }

    /// Parse a specific config file (no env overrides, no path expansion)
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            TriageError::config(format!("failed to read {}: {}", path.display(), e))
        })?;

        toml::from_str(&content).map_err(|e| {
            TriageError::config(format!("invalid TOML in {}: {}", path.display(), e))
        })
    }

    /// Get config file path: $TRIAGECTL_CONFIG or ~/.triagectl/config.toml
    pub fn config_path() -> PathBuf {
        if let Ok(path) = env::var(CONFIG_ENV) {
            if !path.trim().is_empty() {
                return PathBuf::from(path);
            }
        }
        home_dir().join(".triagectl/config.toml")
    }

    /// Render as TOML (used by `config init` and `config show`)
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| TriageError::config(format!("failed to serialize config: {}", e)))
    }

    /// Expand `~` in every configured path
    pub fn expand_paths(&mut self) {
        self.storage.db_path = expand_home(&self.storage.db_path);
        self.logging.file = expand_home(&self.logging.file);
    }

    /// History cap for the store (`None` = unlimited)
    pub fn history_limit(&self) -> Option<usize> {
        Some(self.queue.history_limit).filter(|&n| n > 0)
    }
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Replace a leading `~` with the home directory
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home_dir().join(rest),
        Err(_) => path.to_path_buf(),
    }
}
