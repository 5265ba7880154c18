//! RecordStore - the canonical record collection, synchronized to storage.
//!
//! The store owns the in-memory list of [`ErrorRecord`] for the session and
//! mirrors it wholesale into one snapshot slot after every mutation. On load
//! it accepts either the current versioned envelope or a legacy bare array;
//! an unparsable blob degrades to an empty collection with a diagnostic,
//! never an error.
//!
//! With the `emitter` feature, mutations queue change events that fire only
//! after a successful `persist`, so listeners never observe state that did
//! not make it to storage.

use std::collections::HashSet;
use std::fmt;

#[cfg(feature = "emitter")]
use event_emitter_rs::EventEmitter;
use serde::{Deserialize, Serialize};

use crate::record::ErrorRecord;
use crate::storage::{SnapshotStorage, StorageError};

/// Default snapshot slot for the record collection.
pub const STORAGE_KEY: &str = "errata_records";

/// Version written into the persisted envelope.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Persisted shape: a version tag wrapping the record array, so future
/// field additions have a migration hook.
#[derive(Deserialize)]
struct SnapshotEnvelope {
    version: u32,
    records: Vec<ErrorRecord>,
}

/// Borrowing mirror of [`SnapshotEnvelope`], so persisting serializes the
/// live collection without copying it first.
#[derive(Serialize)]
struct SnapshotEnvelopeRef<'a> {
    version: u32,
    records: &'a [ErrorRecord],
}

/// Error type for store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The collection could not be serialized for persistence.
    Serialize(String),
    /// The storage backend failed.
    Storage(StorageError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Serialize(msg) => write!(f, "failed to serialize records: {}", msg),
            StoreError::Storage(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<StorageError> for StoreError {
    fn from(e: StorageError) -> Self {
        StoreError::Storage(e)
    }
}

/// A change event queued during mutation, emitted after persist.
#[cfg(feature = "emitter")]
#[derive(Clone, Debug, PartialEq)]
struct ChangeEvent {
    event_type: String,
    data: String,
}

pub struct RecordStore {
    records: Vec<ErrorRecord>,
    key: String,
    storage: Box<dyn SnapshotStorage>,
    #[cfg(feature = "emitter")]
    event_emitter: EventEmitter,
    #[cfg(feature = "emitter")]
    events_to_emit: Vec<ChangeEvent>,
}

impl RecordStore {
    pub fn new(storage: Box<dyn SnapshotStorage>) -> Self {
        Self::with_key(storage, STORAGE_KEY)
    }

    pub fn with_key(storage: Box<dyn SnapshotStorage>, key: &str) -> Self {
        RecordStore {
            records: Vec::new(),
            key: key.to_string(),
            storage,
            #[cfg(feature = "emitter")]
            event_emitter: EventEmitter::new(),
            #[cfg(feature = "emitter")]
            events_to_emit: Vec::new(),
        }
    }

    /// Hydrate from the persisted snapshot.
    ///
    /// Missing slot or unparsable blob both yield an empty collection;
    /// corruption is logged and swallowed so the app always starts.
    pub fn load(&mut self) -> Result<(), StoreError> {
        let Some(blob) = self.storage.get(&self.key)? else {
            self.records = Vec::new();
            return Ok(());
        };

        self.records = match serde_json::from_str::<SnapshotEnvelope>(&blob) {
            Ok(envelope) => {
                if envelope.version > SNAPSHOT_VERSION {
                    tracing::warn!(
                        version = envelope.version,
                        "snapshot written by a newer schema version"
                    );
                }
                envelope.records
            }
            // Pre-envelope snapshots were a bare array.
            Err(_) => match serde_json::from_str::<Vec<ErrorRecord>>(&blob) {
                Ok(records) => records,
                Err(e) => {
                    tracing::warn!(key = %self.key, error = %e, "discarding corrupt snapshot");
                    Vec::new()
                }
            },
        };
        Ok(())
    }

    pub fn records(&self) -> &[ErrorRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Highest id currently present, for seeding the id generator.
    pub fn highest_id(&self) -> u64 {
        self.records.iter().map(|r| r.id).max().unwrap_or(0)
    }

    pub fn add(&mut self, record: ErrorRecord) {
        self.enqueue("record_added", record.id.to_string());
        self.records.push(record);
    }

    /// Delete every record matching `id`. No-op if absent.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        let removed = self.records.len() < before;
        if removed {
            self.enqueue("record_removed", id.to_string());
        }
        removed
    }

    /// Discard the current collection and install `records` verbatim.
    pub fn replace_all(&mut self, records: Vec<ErrorRecord>) {
        self.enqueue("records_replaced", records.len().to_string());
        self.records = records;
    }

    /// Append only records whose id is not already present. Existing
    /// records are never overwritten, and an id occurring twice within the
    /// incoming batch is installed once. Returns how many were added.
    pub fn merge_in(&mut self, records: Vec<ErrorRecord>) -> usize {
        let mut existing: HashSet<u64> = self.records.iter().map(|r| r.id).collect();
        let mut added = 0;
        for record in records {
            if existing.insert(record.id) {
                self.records.push(record);
                added += 1;
            }
        }
        if added > 0 {
            self.enqueue("records_merged", added.to_string());
        }
        added
    }

    pub fn clear(&mut self) {
        self.enqueue("records_cleared", self.records.len().to_string());
        self.records.clear();
    }

    /// Serialize the whole collection into the snapshot slot.
    ///
    /// Mutation and persistence are one user-visible step; a failure here
    /// propagates to the caller, there is no partial-failure recovery.
    pub fn persist(&mut self) -> Result<(), StoreError> {
        let envelope = SnapshotEnvelopeRef {
            version: SNAPSHOT_VERSION,
            records: &self.records,
        };
        let blob =
            serde_json::to_string(&envelope).map_err(|e| StoreError::Serialize(e.to_string()))?;
        self.storage.set(&self.key, blob)?;
        tracing::debug!(key = %self.key, count = self.records.len(), "snapshot persisted");
        self.emit_queued();
        Ok(())
    }

    #[cfg(feature = "emitter")]
    fn enqueue(&mut self, event_type: &str, data: String) {
        self.events_to_emit.push(ChangeEvent {
            event_type: event_type.to_string(),
            data,
        });
    }

    #[cfg(not(feature = "emitter"))]
    fn enqueue(&mut self, _event_type: &str, _data: String) {}

    #[cfg(feature = "emitter")]
    fn emit_queued(&mut self) {
        let events: Vec<ChangeEvent> = self.events_to_emit.drain(..).collect();
        for event in events {
            self.event_emitter.emit(&event.event_type, event.data);
        }
    }

    #[cfg(not(feature = "emitter"))]
    fn emit_queued(&mut self) {}

    /// Register a listener for a change event (`record_added`,
    /// `record_removed`, `records_replaced`, `records_merged`,
    /// `records_cleared`). Fires after the mutation has been persisted.
    #[cfg(feature = "emitter")]
    pub fn on<F>(&mut self, event: &str, listener: F)
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        self.event_emitter.on(event, listener);
    }
}
