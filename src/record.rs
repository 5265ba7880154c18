use std::fmt;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// One logged study error.
///
/// `id` doubles as identity and implicit creation-order key. `created_at`
/// is informational only; nothing orders or filters by it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRecord {
    pub id: u64,
    pub subject: String,
    pub topic: String,
    pub exam_source: String,
    pub month: u32,
    pub year: i32,
    pub created_at: String,
}

/// Error type for record entry validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    EmptyField(&'static str),
    MonthOutOfRange(u32),
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::EmptyField(field) => write!(f, "field '{}' must not be empty", field),
            RecordError::MonthOutOfRange(month) => {
                write!(f, "month {} is outside 1..=12", month)
            }
        }
    }
}

impl std::error::Error for RecordError {}

/// Unvalidated entry-form input for a new record.
///
/// The storage layer accepts any `ErrorRecord` as-is (imports included);
/// only this entry path enforces trimmed, non-empty text fields and a
/// month in range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordDraft {
    pub subject: String,
    pub topic: String,
    pub exam_source: String,
    pub month: u32,
    pub year: i32,
}

impl RecordDraft {
    /// Trim all text fields and check entry-form constraints.
    pub fn validate(mut self) -> Result<Self, RecordError> {
        self.subject = self.subject.trim().to_string();
        self.topic = self.topic.trim().to_string();
        self.exam_source = self.exam_source.trim().to_string();

        if self.subject.is_empty() {
            return Err(RecordError::EmptyField("subject"));
        }
        if self.topic.is_empty() {
            return Err(RecordError::EmptyField("topic"));
        }
        if self.exam_source.is_empty() {
            return Err(RecordError::EmptyField("examSource"));
        }
        if !(1..=12).contains(&self.month) {
            return Err(RecordError::MonthOutOfRange(self.month));
        }
        Ok(self)
    }

    /// Materialize the draft into a record with a fresh id and timestamp.
    pub fn into_record(self, id: u64) -> ErrorRecord {
        ErrorRecord {
            id,
            subject: self.subject,
            topic: self.topic,
            exam_source: self.exam_source,
            month: self.month,
            year: self.year,
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Monotonic id generator seeded from the clock.
///
/// Ids are epoch milliseconds unless two calls land in the same tick, in
/// which case the second gets `last + 1`. Ids therefore never collide
/// within one generator, and stay creation-ordered.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        IdGenerator { last: 0 }
    }

    /// Resume above the highest id already present, so loaded collections
    /// keep getting creation-ordered ids.
    pub fn seeded_above(highest: u64) -> Self {
        IdGenerator { last: highest }
    }

    pub fn next(&mut self) -> u64 {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        self.last = now.max(self.last.saturating_add(1));
        self.last
    }

    /// Never hand out ids at or below `floor` from now on. Called after
    /// imports, which can install ids above anything generated so far.
    pub fn raise_to(&mut self, floor: u64) {
        self.last = self.last.max(floor);
    }
}
