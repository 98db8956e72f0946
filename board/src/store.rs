//! Whole-document persistence behind a key/value store.
//!
//! The board is stored as one JSON string under [`STORAGE_KEY`], read once at
//! startup and overwritten in full after every change. There is no diffing and
//! no transaction: the last successful write wins.
//!
//! Loading is fail-soft. A missing entry is reported as
//! [`LoadOutcome::Missing`] so the caller can seed a fresh board; a corrupt or
//! unreadable entry is logged and reported as [`LoadOutcome::Corrupt`], which
//! callers treat as an empty board.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::consts::STORAGE_KEY;
use crate::doc::BoardDocument;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io failed: {0}")]
    Io(#[from] io::Error),
    #[error("document encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// String key/value storage, the shape of browser `localStorage`.
pub trait BoardStore {
    /// Read the raw value for `key`, or `None` if it was never written.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be read.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the value for `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written.
    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

// =============================================================================
// FILE STORE
// =============================================================================

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file backing `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl BoardStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        // Write beside the target and rename so a crash never leaves half a document.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// In-memory store, used by tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `value` already stored under `key`.
    #[must_use]
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.to_owned(), value.to_owned());
        Self { entries }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl BoardStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

// =============================================================================
// LOAD / SAVE
// =============================================================================

/// Result of reading the board at startup.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// A stored document was decoded.
    Restored(BoardDocument),
    /// Nothing has been stored yet.
    Missing,
    /// Something was stored but could not be read or decoded.
    Corrupt,
}

/// Read the board document from `store`.
pub fn load_document<S: BoardStore + ?Sized>(store: &S) -> LoadOutcome {
    let raw = match store.read(STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return LoadOutcome::Missing,
        Err(e) => {
            tracing::warn!(error = %e, "board storage unreadable; starting empty");
            return LoadOutcome::Corrupt;
        }
    };

    match serde_json::from_str::<BoardDocument>(&raw) {
        Ok(doc) => match doc.integrity_violation() {
            None => {
                tracing::debug!(objects = doc.len(), "board restored");
                LoadOutcome::Restored(doc)
            }
            Some(reason) => {
                tracing::warn!(%reason, "stored board violates invariants; starting empty");
                LoadOutcome::Corrupt
            }
        },
        Err(e) => {
            tracing::warn!(error = %e, "stored board is malformed; starting empty");
            LoadOutcome::Corrupt
        }
    }
}

/// Serialize `doc` and overwrite the stored board.
///
/// # Errors
///
/// Returns an error if encoding or the write fails.
pub fn save_document<S: BoardStore + ?Sized>(store: &mut S, doc: &BoardDocument) -> Result<(), StorageError> {
    let raw = serde_json::to_string(doc)?;
    store.write(STORAGE_KEY, &raw)
}
