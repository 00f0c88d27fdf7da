//! Persistence for connection snapshots
//!
//! Stores depend only on the [`KeyValueStore`] capability. Two backends are
//! provided:
//! - [`MemoryStore`]: in-process map, for tests and ephemeral sessions
//! - [`FileStore`]: a single JSON file holding every key
//!
//! [`PersistenceBridge`] sits between a store and its backend. Read and write
//! failures are logged and swallowed: a store whose snapshot cannot be read
//! starts empty, and one whose snapshot cannot be written keeps running.

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;

use gqlz_core::{GqlzError, Result};

/// String key-value capability a store persists through
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    fn remove_item(&self, key: &str) -> Result<()>;
}

/// In-memory key-value store
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.read().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.items.write().remove(key);
        Ok(())
    }
}

/// Key-value store kept in one JSON object file.
///
/// Every operation reads the file, so edits made by another process between
/// calls are picked up. Writes within this process are serialized and replace
/// the file atomically. A file that no longer parses is renamed to
/// `<name>.corrupt` by the next write.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Open the store at the platform data directory
    pub fn open_default() -> anyhow::Result<Self> {
        Ok(Self::new(crate::connections_file()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(HashMap::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            GqlzError::Storage(format!("Failed to parse {}: {}", self.path.display(), e))
        })
    }

    /// Read the file for a write. A corrupt file is moved aside and replaced
    /// rather than blocking every later write.
    fn read_for_write(&self) -> Result<HashMap<String, String>> {
        match self.read_all() {
            Err(GqlzError::Storage(reason)) => {
                let backup = self.corrupt_backup_path();
                tracing::warn!(error = %reason, backup = ?backup, "key-value file is corrupt, starting fresh");
                if let Err(e) = std::fs::rename(&self.path, &backup) {
                    tracing::warn!(error = %e, "failed to set aside corrupt key-value file");
                }
                Ok(HashMap::new())
            }
            other => other,
        }
    }

    fn corrupt_backup_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".corrupt");
        PathBuf::from(name)
    }

    /// Replace the file atomically: write a sibling temp file, then rename it
    fn write_all(&self, items: &HashMap<String, String>) -> Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent)?;

        let content = serde_json::to_string_pretty(items)?;
        let mut temp = NamedTempFile::new_in(&parent)?;
        temp.write_all(content.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(&self.path).map_err(|e| GqlzError::Io(e.error))?;

        tracing::debug!(count = items.len(), path = ?self.path, "key-value file written");
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut items = self.read_for_write()?;
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items)
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let _guard = self.write_lock.lock();
        let mut items = self.read_for_write()?;
        if items.remove(key).is_some() {
            self.write_all(&items)?;
        }
        Ok(())
    }
}

/// Reads and writes one store's snapshot under a fixed key
pub struct PersistenceBridge {
    store: Option<Arc<dyn KeyValueStore>>,
    key: String,
}

impl PersistenceBridge {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store: Some(store),
            key: key.into(),
        }
    }

    /// A bridge that persists nothing
    pub fn disabled() -> Self {
        Self {
            store: None,
            key: String::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read and decode the snapshot. Any failure is logged and yields `None`.
    pub fn load<T: DeserializeOwned>(&self) -> Option<T> {
        let store = self.store.as_ref()?;
        let raw = match store.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(key = %self.key, "no saved snapshot");
                return None;
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "failed to read saved snapshot, starting empty");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "saved snapshot is malformed, starting empty");
                None
            }
        }
    }

    /// Encode and write the snapshot. Failures are logged.
    pub fn save<T: Serialize>(&self, snapshot: &T) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        let result = serde_json::to_string(snapshot)
            .map_err(GqlzError::from)
            .and_then(|raw| store.set_item(&self.key, &raw));
        if let Err(e) = result {
            tracing::warn!(key = %self.key, error = %e, "failed to save snapshot");
        }
    }

    /// Delete the snapshot. Failures are logged.
    pub fn remove(&self) {
        let Some(store) = self.store.as_ref() else {
            return;
        };
        if let Err(e) = store.remove_item(&self.key) {
            tracing::warn!(key = %self.key, error = %e, "failed to remove snapshot");
        }
    }
}
