//! Local durable snapshot store.
//!
//! Three independent records, each its own JSON file under the storage
//! directory: the full sequence list, the single current sequence, and
//! the selected message index.  Reads are defensive: a missing or corrupt
//! file yields the empty/default value, never an error, so a damaged
//! cache can at worst lose local state.  Writes do propagate errors;
//! losing a snapshot silently would defeat the point of having one.

mod debounce;

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use msc_core::Sequence;

pub use debounce::DebouncedWriter;

/// Shared filename prefix for all snapshot records.
const NAMESPACE: &str = "msc_editor";

/// Error type for snapshot write operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing snapshot at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot could not be serialized.
    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// File-backed store for the editor's persisted snapshots.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Opens (and creates if needed) the store at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    fn record_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{NAMESPACE}.{key}.json"))
    }

    // ── Sequence list ─────────────────────────────────────────────────────────

    /// Writes the full sequence list.
    pub fn save_sequences(&self, sequences: &[Sequence]) -> Result<(), StoreError> {
        self.write_record("sequences", &sequences)
    }

    /// Reads the sequence list; absent or corrupt data yields an empty
    /// list.
    pub fn load_sequences(&self) -> Vec<Sequence> {
        self.read_record("sequences").unwrap_or_default()
    }

    // ── Current sequence ──────────────────────────────────────────────────────

    /// Writes the current sequence snapshot.
    pub fn save_current(&self, sequence: &Sequence) -> Result<(), StoreError> {
        self.write_record("current_sequence", sequence)
    }

    /// Reads the persisted current sequence, if any.
    pub fn load_current(&self) -> Option<Sequence> {
        self.read_record("current_sequence")
    }

    /// Removes the persisted current sequence.
    pub fn clear_current(&self) -> Result<(), StoreError> {
        self.remove_record("current_sequence")
    }

    // ── Selected message index ────────────────────────────────────────────────

    /// Writes (or clears, for `None`) the selected message index.
    pub fn save_selected_index(&self, index: Option<usize>) -> Result<(), StoreError> {
        match index {
            Some(index) => self.write_record("selected_index", &index),
            None => self.remove_record("selected_index"),
        }
    }

    /// Reads the persisted selected message index, if any.
    pub fn load_selected_index(&self) -> Option<usize> {
        self.read_record("selected_index")
    }

    // ── Record primitives ─────────────────────────────────────────────────────

    fn write_record<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let path = self.record_path(key);
        let content = serde_json::to_string(value)?;
        fs::write(&path, content).map_err(|source| StoreError::Io { path, source })
    }

    fn read_record<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let path = self.record_path(key);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable snapshot, treating as absent");
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupt snapshot, treating as absent");
                None
            }
        }
    }

    fn remove_record(&self, key: &str) -> Result<(), StoreError> {
        let path = self.record_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}
