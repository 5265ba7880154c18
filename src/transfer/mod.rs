//! Import and export of the record collection as JSON arrays.
//!
//! The interchange shape is the same in both directions: a JSON array of
//! record objects, exactly what the snapshot envelope wraps. Import
//! deserializes into the typed record shape at the boundary and rejects
//! files that do not fit it; nothing malformed reaches the store.

use std::fmt;

use chrono::NaiveDate;

use crate::record::ErrorRecord;

/// Error type for import/export operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// The file content is not a JSON array of records.
    InvalidFormat(String),
    /// The file could not be read; carries the underlying message.
    Unreadable(String),
    /// The collection could not be serialized for export.
    Serialize(String),
}

impl fmt::Display for TransferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferError::InvalidFormat(msg) => {
                write!(f, "invalid import format: {}", msg)
            }
            TransferError::Unreadable(msg) => write!(f, "could not read import file: {}", msg),
            TransferError::Serialize(msg) => write!(f, "could not serialize export: {}", msg),
        }
    }
}

impl std::error::Error for TransferError {}

/// What to do with records already in the collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportMode {
    /// Keep existing records; add only previously-unseen ids.
    Merge,
    /// Discard the existing collection and install the imported one.
    Replace,
}

/// Parse import file content into records.
///
/// The top-level value must be a JSON array and every element must fit the
/// record shape; otherwise nothing is imported.
pub fn parse_import(content: &str) -> Result<Vec<ErrorRecord>, TransferError> {
    let value: serde_json::Value =
        serde_json::from_str(content).map_err(|e| TransferError::InvalidFormat(e.to_string()))?;
    if !value.is_array() {
        return Err(TransferError::InvalidFormat(
            "top-level value is not an array".to_string(),
        ));
    }
    serde_json::from_value(value).map_err(|e| TransferError::InvalidFormat(e.to_string()))
}

/// Pretty-printed JSON array of the in-memory collection, suitable for a
/// downloadable backup.
pub fn export_json(records: &[ErrorRecord]) -> Result<String, TransferError> {
    serde_json::to_string_pretty(records).map_err(|e| TransferError::Serialize(e.to_string()))
}

/// Backup file name carrying the given date: `errata_backup_2024-03-01.json`.
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("errata_backup_{}.json", date.format("%Y-%m-%d"))
}
