//! View layer - declarative render artifacts and the rendering boundary.
//!
//! The core never drives a chart object. Each refresh produces plain
//! "current dataset" values ([`ChartDataset`], [`HistoryEntry`] rows,
//! option lists, a summary) and pushes them across the [`Renderer`] trait;
//! whatever sits on the other side decides how to diff and redraw.

mod synchronizer;

use serde::Serialize;

use crate::record::ErrorRecord;

/// Fixed chart palette, cycled when a dataset has more labels than colors.
pub const CHART_COLORS: [&str; 10] = [
    "#4f46e5", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#06b6d4", "#ec4899", "#84cc16",
    "#f97316", "#6366f1",
];

/// Labels, values, and colors for one aggregate chart.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartDataset {
    pub labels: Vec<String>,
    pub values: Vec<u64>,
    pub colors: Vec<String>,
}

impl ChartDataset {
    /// Dataset with one palette color per label, cycling the palette.
    pub fn with_palette(counts: Vec<(String, usize)>) -> Self {
        let colors = counts
            .iter()
            .enumerate()
            .map(|(i, _)| CHART_COLORS[i % CHART_COLORS.len()].to_string())
            .collect();
        let (labels, values) = split_counts(counts);
        ChartDataset {
            labels,
            values,
            colors,
        }
    }

    /// Dataset drawn in a single accent color (bar and line charts).
    pub fn with_accent(counts: Vec<(String, usize)>) -> Self {
        let (labels, values) = split_counts(counts);
        ChartDataset {
            labels,
            values,
            colors: vec![CHART_COLORS[0].to_string()],
        }
    }
}

fn split_counts(counts: Vec<(String, usize)>) -> (Vec<String>, Vec<u64>) {
    counts
        .into_iter()
        .map(|(label, count)| (label, count as u64))
        .unzip()
}

/// One row of the rendered history list.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub id: u64,
    pub subject: String,
    pub topic: String,
    pub exam_source: String,
    pub month: u32,
    pub year: i32,
}

impl From<&ErrorRecord> for HistoryEntry {
    fn from(record: &ErrorRecord) -> Self {
        HistoryEntry {
            id: record.id,
            subject: record.subject.clone(),
            topic: record.topic.clone(),
            exam_source: record.exam_source.clone(),
            month: record.month,
            year: record.year,
        }
    }
}

/// Distinct field values for the entry-form autocomplete lists.
#[derive(Clone, Debug, PartialEq, Serialize, Default)]
pub struct OptionLists {
    pub subjects: Vec<String>,
    pub topics: Vec<String>,
    pub exam_sources: Vec<String>,
}

/// Rebuilt subject-filter dropdown: alphabetical options plus whichever
/// selection survived the rebuild.
#[derive(Clone, Debug, PartialEq, Serialize, Default)]
pub struct SubjectFilterOptions {
    pub options: Vec<String>,
    pub selected: Option<String>,
}

/// Headline numbers: total errors and each subject's share of them.
#[derive(Clone, Debug, PartialEq, Serialize, Default)]
pub struct Summary {
    pub total: usize,
    pub subject_shares: Vec<(String, f64)>,
}

/// User-selected view filters, preserved across refreshes.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct ViewFilters {
    /// Exact-match subject filter for the topic and timeline charts.
    /// `None` means "all subjects".
    pub subject: Option<String>,
    /// Case-insensitive history search text.
    pub search: String,
}

/// The out-of-scope presentation layer. Receives every derived artifact
/// after each refresh.
pub trait Renderer {
    fn option_lists(&mut self, lists: &OptionLists);
    fn subject_filter(&mut self, filter: &SubjectFilterOptions);
    fn history(&mut self, entries: &[HistoryEntry]);
    fn subject_chart(&mut self, dataset: &ChartDataset);
    fn topic_chart(&mut self, dataset: &ChartDataset);
    fn timeline_chart(&mut self, dataset: &ChartDataset);
    fn summary(&mut self, summary: &Summary);
}

pub use synchronizer::{ViewSynchronizer, TOP_TOPICS};
