//! Durable key-value storage for session and reader state
//!
//! All persistence in autosearch goes through the [`StateStore`] trait so
//! the session layer never depends on a concrete backend. [`SledStateStore`]
//! is the production implementation; [`MemoryStateStore`] backs tests and
//! ephemeral runs.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use directories::ProjectDirs;
use sled::Db;

use crate::error::{AutosearchError, Result};

/// String-keyed store for JSON blobs.
///
/// Implementations return explicit errors; callers choose the policy. The
/// session and reader layers treat every failure as best-effort and keep
/// going without persistence.
pub trait StateStore: Send + Sync {
    /// Fetch the value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn delete(&self, key: &str) -> Result<()>;
}

/// Embedded on-disk store backed by `sled`.
///
/// One database holds the session snapshot and every reader handoff
/// record. Writes are flushed before returning.
pub struct SledStateStore {
    db: Db,
}

impl SledStateStore {
    /// Open the store at its default location.
    ///
    /// The path can be overridden with the `AUTOSEARCH_STATE_DB`
    /// environment variable, which makes it easy to point the binary at a
    /// test database without touching the user's application data dir.
    /// Otherwise the database lives in the platform data directory.
    ///
    /// # Errors
    ///
    /// Returns `AutosearchError::Storage` if the data directory cannot be
    /// determined or the database cannot be opened.
    pub fn new() -> Result<Self> {
        if let Ok(override_path) = std::env::var("AUTOSEARCH_STATE_DB") {
            return Self::new_with_path(override_path);
        }

        let proj_dirs = ProjectDirs::from("com", "autosearch", "autosearch")
            .ok_or_else(|| AutosearchError::Storage("Could not determine data directory".into()))?;

        let data_dir = proj_dirs.data_dir();
        std::fs::create_dir_all(data_dir).map_err(|e| {
            AutosearchError::Storage(format!("Failed to create data directory: {}", e))
        })?;

        Self::new_with_path(data_dir.join("state.db"))
    }

    /// Open the store at an explicit path.
    ///
    /// Primarily useful for tests where the default application data
    /// directory is not desirable (for example, a temporary directory).
    pub fn new_with_path<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AutosearchError::Storage(format!("Failed to create parent directory: {}", e))
            })?;
        }

        let db = sled::open(&path)
            .map_err(|e| AutosearchError::Storage(format!("Failed to open database: {}", e)))?;

        Ok(Self { db })
    }
}

impl StateStore for SledStateStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self
            .db
            .get(key.as_bytes())
            .map_err(|e| AutosearchError::Storage(format!("Get failed: {}", e)))?
        {
            Some(bytes) => {
                let text = String::from_utf8(bytes.to_vec()).map_err(|e| {
                    AutosearchError::Storage(format!("Stored value is not UTF-8: {}", e))
                })?;
                Ok(Some(text))
            }
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.db
            .insert(key.as_bytes(), value.as_bytes())
            .map_err(|e| AutosearchError::Storage(format!("Insert failed: {}", e)))?;

        self.db
            .flush()
            .map_err(|e| AutosearchError::Storage(format!("Flush failed: {}", e)))?;

        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.db
            .remove(key.as_bytes())
            .map_err(|e| AutosearchError::Storage(format!("Remove failed: {}", e)))?;

        self.db
            .flush()
            .map_err(|e| AutosearchError::Storage(format!("Flush failed: {}", e)))?;

        Ok(())
    }
}

/// In-process store used in tests and embedding scenarios that do not
/// want anything written to disk.
///
/// # Examples
///
/// ```
/// use autosearch::storage::{MemoryStateStore, StateStore};
///
/// let store = MemoryStateStore::new();
/// store.put("k", "v").unwrap();
/// assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
/// store.delete("k").unwrap();
/// assert_eq!(store.get("k").unwrap(), None);
/// ```
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| AutosearchError::Storage("Lock poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| AutosearchError::Storage("Lock poisoned".into()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| AutosearchError::Storage("Lock poisoned".into()))?;
        entries.remove(key);
        Ok(())
    }
}
