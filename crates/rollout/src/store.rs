//! Key/value stores holding local rollout overrides.
//!
//! The resolver reads local overrides through the [`OverrideStore`] trait, so
//! the same resolution logic runs against an in-memory map in tests, a JSON
//! file on a developer machine, or nothing at all in production.
//!
//! | Store | Reads | Writes |
//! |-------|-------|--------|
//! | [`NoOverrideStore`] | always empty | - |
//! | [`MemoryOverrideStore`] | in-process map | in-process map |
//! | [`FileOverrideStore`] | JSON object file | unique temp file + rename |

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{StoreError, StoreResult};

/// Key under which local rollout overrides are stored.
pub const LOCAL_OVERRIDE_KEY: &str = "dpp.rollout.surface-overrides";

/// Read access to a string key/value store.
pub trait OverrideStore: Send + Sync {
    /// Returns the value stored under `key`, if any.
    ///
    /// Implementations must not fail: an unreadable store behaves as empty.
    fn get(&self, key: &str) -> Option<String>;
}

/// Write access to a string key/value store, used by developer tooling.
pub trait OverrideStoreMut: OverrideStore {
    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Removes `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;
}

impl<S: OverrideStore + ?Sized> OverrideStore for &S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}

impl<S: OverrideStore + ?Sized> OverrideStore for Box<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}

impl<S: OverrideStore + ?Sized> OverrideStore for std::sync::Arc<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}

/// A store that never holds anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOverrideStore;

impl OverrideStore for NoOverrideStore {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }
}

/// An in-process store.
#[derive(Debug, Default)]
pub struct MemoryOverrideStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryOverrideStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding a single entry.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::new();
        store.entries.write().insert(key.into(), value.into());
        store
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl OverrideStore for MemoryOverrideStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }
}

impl OverrideStoreMut for MemoryOverrideStore {
    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries
            .write()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.entries.write().remove(key);
        Ok(())
    }
}

/// A store persisted as a JSON object of string values.
///
/// The file is re-read on every access so edits made by another process are
/// picked up without restarting. Reads are lenient: a missing, unreadable or
/// malformed file reads as empty, and non-string values are skipped. Writes
/// are strict: a file that exists but cannot be parsed as a JSON object is
/// left untouched and the write fails. Values of other JSON types are kept
/// as they are.
#[derive(Debug, Clone)]
pub struct FileOverrideStore {
    path: PathBuf,
}

impl FileOverrideStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_lenient(&self) -> Map<String, Value> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    debug!(path = %self.path.display(), error = %e, "Override file unreadable");
                }
                return Map::new();
            }
        };

        match serde_json::from_str(&contents) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Override file is not a JSON object");
                Map::new()
            }
        }
    }

    fn read_strict(&self) -> StoreResult<Map<String, Value>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        serde_json::from_str(&contents).map_err(|source| StoreError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    fn write_entries(&self, entries: &Map<String, Value>) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(entries)?;

        let parent = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
                parent
            }
            None => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(parent).map_err(|e| StoreError::io(parent, e))?;
        tmp.write_all(json.as_bytes())
            .map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| StoreError::io(&self.path, e.error))?;
        Ok(())
    }
}

impl OverrideStore for FileOverrideStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.read_lenient().remove(key) {
            Some(Value::String(value)) => Some(value),
            _ => None,
        }
    }
}

impl OverrideStoreMut for FileOverrideStore {
    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut entries = self.read_strict()?;
        entries.insert(key.to_string(), Value::String(value.to_string()));
        self.write_entries(&entries)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let mut entries = self.read_strict()?;
        if entries.remove(key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }
}
