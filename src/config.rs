//! Configuration loading.
//!
//! Read from a JSON file next to the task data. Every field has a default, so
//! a missing or partial file is fine.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TaskError};
use crate::store::{sqlite::DEFAULT_TABLE, JsonStore, SqliteStore, TaskStore};
use crate::task::Placeholders;
use crate::theme::ThemeName;

pub const CONFIG_FILE: &str = "tasklist.config.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub theme: ThemeName,
    pub placeholders: Placeholders,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Sqlite,
    Json,
}

impl Backend {
    pub fn default_path(self) -> PathBuf {
        match self {
            Backend::Sqlite => PathBuf::from("tasks.db"),
            Backend::Json => PathBuf::from("tasks.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: Backend,
    /// Falls back to the backend's default file when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// SQLite only.
    pub table: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            path: None,
            table: DEFAULT_TABLE.to_string(),
        }
    }
}

impl StorageConfig {
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| self.backend.default_path())
    }
}

impl Config {
    /// Loads `path`, or defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let data = fs::read_to_string(path)?;
        serde_json::from_str(&data)
            .map_err(|err| TaskError::InvalidConfig(format!("{}: {}", path.display(), err)))
    }

    /// Writes the default configuration unless `path` already exists.
    /// Returns `false` when there was already a file.
    pub fn init(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(&Config::default())?)?;
        Ok(true)
    }

    pub fn open_store(&self) -> Result<Box<dyn TaskStore>> {
        let path = self.storage.resolved_path();
        let placeholders = self.placeholders.clone();
        Ok(match self.storage.backend {
            Backend::Sqlite => Box::new(
                SqliteStore::open_table(&path, &self.storage.table)?.with_placeholders(placeholders),
            ),
            Backend::Json => Box::new(JsonStore::open(&path)?.with_placeholders(placeholders)),
        })
    }
}
