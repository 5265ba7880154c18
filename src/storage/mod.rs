//! Snapshot storage - the opaque key-value persistence boundary.
//!
//! The record collection is persisted as a single string blob under one
//! key, read on startup and overwritten wholesale on every mutation. The
//! backend is pluggable so the store can run against memory in tests and
//! against the filesystem in an application.
//!
//! ## Example
//!
//! ```ignore
//! use errata::{InMemorySnapshotStorage, SnapshotStorage};
//!
//! let storage = InMemorySnapshotStorage::new();
//! storage.set("errata_records", "[]".to_string())?;
//! let blob = storage.get("errata_records")?;
//! ```

mod file;
mod in_memory;

use std::fmt;

/// Error type for snapshot storage operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Backend-level failure (lock poisoned, I/O error).
    Backend(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Backend(msg) => write!(f, "snapshot storage error: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

/// Abstract key-value slot for serialized snapshots.
pub trait SnapshotStorage: Send + Sync {
    /// Read the blob under `key`. Returns None if the slot was never written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the blob under `key`.
    fn set(&self, key: &str, value: String) -> Result<(), StorageError>;
}

pub use file::FileSnapshotStorage;
pub use in_memory::InMemorySnapshotStorage;
