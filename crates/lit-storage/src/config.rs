//! Storage configuration
//!
//! One [`StorageConfiguration`] per configured database, read from a TOML
//! table such as:
//!
//! ```toml
//! name = "default"
//! backend = "memory"
//! file = "variables.db"
//! enabled = true
//! flush_interval_secs = 300
//!
//! [options]
//! backup_count = 3
//! ```

use crate::error::StorageError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_FLUSH_INTERVAL_SECS: u64 = 300;

fn default_enabled() -> bool {
    true
}

fn default_flush_interval() -> u64 {
    DEFAULT_FLUSH_INTERVAL_SECS
}

/// User settings for one variable storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfiguration {
    /// Name the storage is referred to by
    pub name: String,
    /// Backend type, e.g. `memory`
    pub backend: String,
    /// Backing file, for backends that need one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Seconds between periodic flushes
    #[serde(default = "default_flush_interval")]
    pub flush_interval_secs: u64,
    /// Backend-specific settings
    #[serde(default)]
    pub options: toml::Table,
}

impl StorageConfiguration {
    /// Create an enabled configuration with default settings
    #[must_use]
    pub fn new(name: impl Into<String>, backend: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            backend: backend.into(),
            file: None,
            enabled: true,
            flush_interval_secs: DEFAULT_FLUSH_INTERVAL_SECS,
            options: toml::Table::new(),
        }
    }

    /// With backing file
    #[inline]
    #[must_use]
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// With enabled flag
    #[inline]
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// With flush interval in seconds
    #[inline]
    #[must_use]
    pub fn with_flush_interval_secs(mut self, secs: u64) -> Self {
        self.flush_interval_secs = secs;
        self
    }

    /// With a backend-specific option
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<toml::Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// Returns error if the text is not a valid storage table
    pub fn from_toml_str(text: &str) -> Result<Self, StorageError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    #[inline]
    #[must_use]
    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval_secs)
    }

    #[inline]
    #[must_use]
    pub fn option(&self, key: &str) -> Option<&toml::Value> {
        self.options.get(key)
    }
}
