mod aggregate;
mod record;
mod storage;
mod store;
mod tracker;
mod transfer;
mod view;

pub use aggregate::{
    count_by, distinct_sorted, filter_by_subject, filter_by_text, group_by_month_year,
    group_by_year, percentage_of, ranked_top_n,
};
pub use record::{ErrorRecord, IdGenerator, RecordDraft, RecordError};
pub use storage::{FileSnapshotStorage, InMemorySnapshotStorage, SnapshotStorage, StorageError};
pub use store::{RecordStore, StoreError, SNAPSHOT_VERSION, STORAGE_KEY};
pub use tracker::{ImportOutcome, PendingCommand, Tracker, TrackerError};
pub use transfer::{backup_file_name, export_json, parse_import, ImportMode, TransferError};
pub use view::{
    ChartDataset, HistoryEntry, OptionLists, Renderer, SubjectFilterOptions, Summary, ViewFilters,
    ViewSynchronizer, CHART_COLORS, TOP_TOPICS,
};

// Re-export the EventEmitter from the event_emitter_rs crate
#[cfg(feature = "emitter")]
pub use event_emitter_rs::EventEmitter;
