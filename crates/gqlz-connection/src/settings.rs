//! Store settings
//!
//! Persisted as JSON; any missing field takes its default.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = "gqlz";

fn app_dir(base: Option<PathBuf>, kind: &str) -> Result<PathBuf> {
    base.map(|p| p.join(APP_DIR))
        .with_context(|| format!("Could not determine {} directory", kind))
}

/// Per-user configuration directory
pub fn config_dir() -> Result<PathBuf> {
    app_dir(dirs::config_dir(), "config")
}

/// Per-user data directory
pub fn data_dir() -> Result<PathBuf> {
    app_dir(dirs::data_dir(), "data")
}

pub fn settings_file() -> Result<PathBuf> {
    Ok(config_dir()?.join("settings.json"))
}

/// File backing the default [`FileStore`](crate::FileStore)
pub fn connections_file() -> Result<PathBuf> {
    Ok(data_dir()?.join("connections.json"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Key the multi-profile store persists its snapshot under
    pub storage_key: String,
    /// Key the single-connection store persists its snapshot under
    pub single_storage_key: String,
    /// Timeout applied to every gateway request
    pub request_timeout_secs: u64,
    /// Quiet period before an edited connection is re-tested
    pub test_debounce_ms: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            storage_key: "gqlz.connections".into(),
            single_storage_key: "gqlz.connection".into(),
            request_timeout_secs: 30,
            test_debounce_ms: 500,
        }
    }
}

impl StoreSettings {
    /// Load settings from `path`, falling back to defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = ?path, "no settings file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        serde_json::from_str(&content).with_context(|| "Failed to parse settings JSON")
    }

    /// Load settings from the default location
    pub fn load_default() -> Result<Self> {
        Self::load(&settings_file()?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings to {:?}", path))?;
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn test_debounce(&self) -> Duration {
        Duration::from_millis(self.test_debounce_ms)
    }
}
