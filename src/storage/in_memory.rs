//! InMemorySnapshotStorage - HashMap-backed storage for testing and development.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::{SnapshotStorage, StorageError};

/// In-memory snapshot storage backed by a HashMap. Clone-friendly via Arc,
/// so a test can hold a handle onto the same slots as the store under test.
#[derive(Clone)]
pub struct InMemorySnapshotStorage {
    slots: Arc<RwLock<HashMap<String, String>>>,
}

impl Default for InMemorySnapshotStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySnapshotStorage {
    pub fn new() -> Self {
        InMemorySnapshotStorage {
            slots: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl SnapshotStorage for InMemorySnapshotStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let slots = self
            .slots
            .read()
            .map_err(|_| StorageError::Backend("lock poisoned".into()))?;
        Ok(slots.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut slots = self
            .slots
            .write()
            .map_err(|_| StorageError::Backend("lock poisoned".into()))?;
        slots.insert(key.to_string(), value);
        Ok(())
    }
}
