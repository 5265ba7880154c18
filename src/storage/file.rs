//! FileSnapshotStorage - one file per key under a root directory.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use super::{SnapshotStorage, StorageError};

/// Filesystem snapshot storage. Each key maps to `<root>/<key>.json`.
pub struct FileSnapshotStorage {
    root: PathBuf,
}

impl FileSnapshotStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileSnapshotStorage { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }
}

impl SnapshotStorage for FileSnapshotStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Backend(e.to_string())),
        }
    }

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        fs::create_dir_all(&self.root).map_err(|e| StorageError::Backend(e.to_string()))?;
        fs::write(self.path_for(key), value).map_err(|e| StorageError::Backend(e.to_string()))
    }
}
