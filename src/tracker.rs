//! Tracker - the application context that ties the pieces together.
//!
//! Owns the record store, the id generator, and the user's view filters,
//! and drives the mutation → persist → view-refresh cycle. Destructive
//! operations (delete-one, clear-all, replace-import) go through an
//! explicit request → confirm → commit flow: the pending command is plain
//! state, and cancelling it leaves the store and its snapshot untouched.

use std::fmt;

use crate::record::{ErrorRecord, IdGenerator, RecordDraft, RecordError};
use crate::storage::SnapshotStorage;
use crate::store::{RecordStore, StoreError};
use crate::transfer::{self, ImportMode, TransferError};
use crate::view::{Renderer, ViewFilters, ViewSynchronizer};

/// A destructive mutation awaiting explicit confirmation.
#[derive(Clone, Debug, PartialEq)]
pub enum PendingCommand {
    DeleteOne(u64),
    ClearAll,
    ReplaceImport(Vec<ErrorRecord>),
}

/// What an import call did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImportOutcome {
    /// Merge mode: this many previously-unseen records were added.
    Merged(usize),
    /// Replace mode is destructive; the records are parked as a pending
    /// command until [`Tracker::confirm`] commits them.
    AwaitingConfirmation,
}

/// Error type for tracker operations.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerError {
    Record(RecordError),
    Store(StoreError),
    Transfer(TransferError),
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerError::Record(e) => write!(f, "{}", e),
            TrackerError::Store(e) => write!(f, "{}", e),
            TrackerError::Transfer(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for TrackerError {}

impl From<RecordError> for TrackerError {
    fn from(e: RecordError) -> Self {
        TrackerError::Record(e)
    }
}

impl From<StoreError> for TrackerError {
    fn from(e: StoreError) -> Self {
        TrackerError::Store(e)
    }
}

impl From<TransferError> for TrackerError {
    fn from(e: TransferError) -> Self {
        TrackerError::Transfer(e)
    }
}

pub struct Tracker {
    store: RecordStore,
    ids: IdGenerator,
    filters: ViewFilters,
    pending: Option<PendingCommand>,
}

impl Tracker {
    pub fn new(storage: Box<dyn SnapshotStorage>) -> Self {
        Tracker {
            store: RecordStore::new(storage),
            ids: IdGenerator::new(),
            filters: ViewFilters::default(),
            pending: None,
        }
    }

    /// Hydrate from storage and render the initial views. A corrupt
    /// snapshot degrades to an empty collection inside the store.
    pub fn load(&mut self, renderer: &mut dyn Renderer) -> Result<(), TrackerError> {
        self.store.load()?;
        self.ids = IdGenerator::seeded_above(self.store.highest_id());
        self.refresh(renderer);
        Ok(())
    }

    pub fn records(&self) -> &[ErrorRecord] {
        self.store.records()
    }

    pub fn filters(&self) -> &ViewFilters {
        &self.filters
    }

    pub fn pending(&self) -> Option<&PendingCommand> {
        self.pending.as_ref()
    }

    /// Mutable access to the store, for wiring change listeners.
    #[cfg(feature = "emitter")]
    pub fn store_mut(&mut self) -> &mut RecordStore {
        &mut self.store
    }

    /// Validate the entry form, assign a fresh id, append, persist, and
    /// refresh the views. Returns the new record's id.
    pub fn add(
        &mut self,
        draft: RecordDraft,
        renderer: &mut dyn Renderer,
    ) -> Result<u64, TrackerError> {
        let record = draft.validate()?.into_record(self.ids.next());
        let id = record.id;
        self.store.add(record);
        self.store.persist()?;
        self.refresh(renderer);
        Ok(id)
    }

    /// Park a destructive command. Supersedes any earlier pending command.
    pub fn request(&mut self, command: PendingCommand) {
        self.pending = Some(command);
    }

    /// Drop the pending command without touching any state.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Commit the pending command. Returns false when nothing was pending.
    pub fn confirm(&mut self, renderer: &mut dyn Renderer) -> Result<bool, TrackerError> {
        let Some(command) = self.pending.take() else {
            return Ok(false);
        };
        match command {
            PendingCommand::DeleteOne(id) => {
                self.store.remove(id);
            }
            PendingCommand::ClearAll => self.store.clear(),
            PendingCommand::ReplaceImport(records) => {
                self.store.replace_all(records);
                // Imported ids may sit above anything generated so far.
                self.ids.raise_to(self.store.highest_id());
            }
        }
        self.store.persist()?;
        self.refresh(renderer);
        Ok(true)
    }

    /// Import file content that has already been read by the caller.
    ///
    /// Merge mode commits immediately; replace mode is destructive and is
    /// parked for confirmation. A parse failure applies no mutation.
    pub fn import(
        &mut self,
        content: &str,
        mode: ImportMode,
        renderer: &mut dyn Renderer,
    ) -> Result<ImportOutcome, TrackerError> {
        let records = transfer::parse_import(content)?;
        match mode {
            ImportMode::Merge => {
                let added = self.store.merge_in(records);
                self.ids.raise_to(self.store.highest_id());
                self.store.persist()?;
                self.refresh(renderer);
                Ok(ImportOutcome::Merged(added))
            }
            ImportMode::Replace => {
                self.request(PendingCommand::ReplaceImport(records));
                Ok(ImportOutcome::AwaitingConfirmation)
            }
        }
    }

    /// Surface an import-file read failure without mutating anything.
    pub fn import_read_failed(message: impl Into<String>) -> TrackerError {
        TrackerError::Transfer(TransferError::Unreadable(message.into()))
    }

    /// Pretty-printed JSON backup of the collection.
    pub fn export(&self) -> Result<String, TrackerError> {
        Ok(transfer::export_json(self.store.records())?)
    }

    /// Change the subject filter and re-derive the dependent views. The
    /// store is not touched.
    pub fn set_subject_filter(&mut self, subject: Option<String>, renderer: &mut dyn Renderer) {
        self.filters.subject = subject.filter(|s| !s.is_empty());
        self.refresh(renderer);
    }

    /// Change the history search text and re-derive the dependent views.
    pub fn set_search(&mut self, search: String, renderer: &mut dyn Renderer) {
        self.filters.search = search;
        self.refresh(renderer);
    }

    fn refresh(&mut self, renderer: &mut dyn Renderer) {
        ViewSynchronizer::refresh(self.store.records(), &mut self.filters, renderer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemorySnapshotStorage;
    use crate::view::{ChartDataset, HistoryEntry, OptionLists, SubjectFilterOptions, Summary};

    struct NullRenderer;

    impl Renderer for NullRenderer {
        fn option_lists(&mut self, _: &OptionLists) {}
        fn subject_filter(&mut self, _: &SubjectFilterOptions) {}
        fn history(&mut self, _: &[HistoryEntry]) {}
        fn subject_chart(&mut self, _: &ChartDataset) {}
        fn topic_chart(&mut self, _: &ChartDataset) {}
        fn timeline_chart(&mut self, _: &ChartDataset) {}
        fn summary(&mut self, _: &Summary) {}
    }

    fn draft(subject: &str) -> RecordDraft {
        RecordDraft {
            subject: subject.to_string(),
            topic: "Topic".to_string(),
            exam_source: "Exam".to_string(),
            month: 6,
            year: 2024,
        }
    }

    fn tracker() -> Tracker {
        let mut t = Tracker::new(Box::new(InMemorySnapshotStorage::new()));
        t.load(&mut NullRenderer).unwrap();
        t
    }

    #[test]
    fn add_assigns_increasing_ids() {
        let mut t = tracker();
        let a = t.add(draft("Math"), &mut NullRenderer).unwrap();
        let b = t.add(draft("Bio"), &mut NullRenderer).unwrap();
        assert!(b > a);
        assert_eq!(t.records().len(), 2);
    }

    #[test]
    fn add_rejects_invalid_draft() {
        let mut t = tracker();
        let result = t.add(draft("   "), &mut NullRenderer);
        assert!(matches!(result, Err(TrackerError::Record(_))));
        assert!(t.records().is_empty());
    }

    #[test]
    fn confirm_without_pending_is_noop() {
        let mut t = tracker();
        assert!(!t.confirm(&mut NullRenderer).unwrap());
    }

    #[test]
    fn delete_needs_confirmation() {
        let mut t = tracker();
        let id = t.add(draft("Math"), &mut NullRenderer).unwrap();

        t.request(PendingCommand::DeleteOne(id));
        assert_eq!(t.records().len(), 1);

        assert!(t.confirm(&mut NullRenderer).unwrap());
        assert!(t.records().is_empty());
        assert_eq!(t.pending(), None);
    }

    #[test]
    fn cancel_leaves_state_untouched() {
        let mut t = tracker();
        let id = t.add(draft("Math"), &mut NullRenderer).unwrap();

        t.request(PendingCommand::DeleteOne(id));
        t.cancel();
        assert!(!t.confirm(&mut NullRenderer).unwrap());
        assert_eq!(t.records().len(), 1);
    }

    #[test]
    fn newer_request_supersedes_older() {
        let mut t = tracker();
        let id = t.add(draft("Math"), &mut NullRenderer).unwrap();

        t.request(PendingCommand::ClearAll);
        t.request(PendingCommand::DeleteOne(id));
        assert_eq!(t.pending(), Some(&PendingCommand::DeleteOne(id)));
    }

    #[test]
    fn replace_import_waits_for_confirmation() {
        let mut t = tracker();
        t.add(draft("Math"), &mut NullRenderer).unwrap();

        let incoming = "[{\"id\":99,\"subject\":\"Chem\",\"topic\":\"Acids\",\
                         \"examSource\":\"Mock\",\"month\":2,\"year\":2023,\
                         \"createdAt\":\"2023-02-01T00:00:00.000Z\"}]";
        let outcome = t
            .import(incoming, ImportMode::Replace, &mut NullRenderer)
            .unwrap();
        assert_eq!(outcome, ImportOutcome::AwaitingConfirmation);
        assert_eq!(t.records().len(), 1);
        assert_eq!(t.records()[0].subject, "Math");

        t.confirm(&mut NullRenderer).unwrap();
        assert_eq!(t.records().len(), 1);
        assert_eq!(t.records()[0].subject, "Chem");
    }

    fn import_json(id: u64) -> String {
        format!(
            "[{{\"id\":{},\"subject\":\"Chem\",\"topic\":\"Acids\",\
              \"examSource\":\"Mock\",\"month\":2,\"year\":2023,\
              \"createdAt\":\"2023-02-01T00:00:00.000Z\"}}]",
            id
        )
    }

    fn all_ids_unique(t: &Tracker) -> bool {
        let ids: std::collections::HashSet<u64> = t.records().iter().map(|r| r.id).collect();
        ids.len() == t.records().len()
    }

    #[test]
    fn add_after_merge_import_stays_above_imported_ids() {
        let mut t = tracker();
        let far_future = u64::MAX - 1_000;
        t.import(&import_json(far_future), ImportMode::Merge, &mut NullRenderer)
            .unwrap();

        let id = t.add(draft("Math"), &mut NullRenderer).unwrap();
        assert!(id > far_future);
        assert!(all_ids_unique(&t));
    }

    #[test]
    fn add_after_replace_import_stays_above_imported_ids() {
        let mut t = tracker();
        let far_future = u64::MAX - 1_000;
        t.import(&import_json(far_future), ImportMode::Replace, &mut NullRenderer)
            .unwrap();
        t.confirm(&mut NullRenderer).unwrap();

        let id = t.add(draft("Math"), &mut NullRenderer).unwrap();
        assert!(id > far_future);
        assert!(all_ids_unique(&t));
    }

    #[test]
    fn malformed_import_applies_no_mutation() {
        let mut t = tracker();
        t.add(draft("Math"), &mut NullRenderer).unwrap();
        let result = t.import("{\"oops\":1}", ImportMode::Merge, &mut NullRenderer);
        assert!(matches!(result, Err(TrackerError::Transfer(_))));
        assert_eq!(t.records().len(), 1);
    }

    #[test]
    fn subject_filter_resets_when_subject_vanishes() {
        let mut t = tracker();
        let id = t.add(draft("Math"), &mut NullRenderer).unwrap();
        t.set_subject_filter(Some("Math".to_string()), &mut NullRenderer);
        assert_eq!(t.filters().subject.as_deref(), Some("Math"));

        t.request(PendingCommand::DeleteOne(id));
        t.confirm(&mut NullRenderer).unwrap();
        assert_eq!(t.filters().subject, None);
    }
}
