//! ViewSynchronizer - recomputes every derived artifact after a change.

use crate::aggregate::{
    count_by, distinct_sorted, filter_by_subject, filter_by_text, group_by_month_year,
    percentage_of, ranked_top_n,
};
use crate::record::ErrorRecord;
use crate::view::{
    ChartDataset, HistoryEntry, OptionLists, Renderer, SubjectFilterOptions, Summary, ViewFilters,
};

/// How many topics the ranked topic chart shows.
pub const TOP_TOPICS: usize = 10;

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Recomputes option lists, the subject filter, the filtered history, the
/// three chart datasets, and the summary from the current record
/// collection, and forwards each to the renderer.
///
/// Invoked after every store mutation and after any filter change. The
/// recomputation order (option lists first, charts last) only matters for
/// partial-failure isolation, not correctness.
pub struct ViewSynchronizer;

impl ViewSynchronizer {
    /// Rebuild everything and push it across the rendering boundary.
    ///
    /// `filters.subject` is reset to "all" when the selected subject no
    /// longer exists in the rebuilt option set; a still-valid selection is
    /// preserved.
    pub fn refresh(records: &[ErrorRecord], filters: &mut ViewFilters, renderer: &mut dyn Renderer) {
        renderer.option_lists(&Self::option_lists(records));

        let subject_filter = Self::subject_filter(records, filters.subject.as_deref());
        filters.subject = subject_filter.selected.clone();
        renderer.subject_filter(&subject_filter);

        renderer.history(&Self::history(records, &filters.search));

        renderer.subject_chart(&Self::subject_chart(records));
        renderer.topic_chart(&Self::topic_chart(records, filters.subject.as_deref()));
        renderer.timeline_chart(&Self::timeline_chart(records, filters.subject.as_deref()));

        renderer.summary(&Self::summary(records));
    }

    /// Distinct field values for the autocomplete datalists, alphabetical.
    pub fn option_lists(records: &[ErrorRecord]) -> OptionLists {
        OptionLists {
            subjects: distinct_sorted(records, |r| r.subject.clone(), |a, b| a.cmp(b)),
            topics: distinct_sorted(records, |r| r.topic.clone(), |a, b| a.cmp(b)),
            exam_sources: distinct_sorted(records, |r| r.exam_source.clone(), |a, b| a.cmp(b)),
        }
    }

    /// Alphabetical subject options, keeping `current` selected only while
    /// it still exists.
    pub fn subject_filter(records: &[ErrorRecord], current: Option<&str>) -> SubjectFilterOptions {
        let options = distinct_sorted(records, |r| r.subject.clone(), |a, b| a.cmp(b));
        let selected = current
            .filter(|subject| options.iter().any(|o| o == subject))
            .map(|subject| subject.to_string());
        SubjectFilterOptions { options, selected }
    }

    /// Search-filtered history rows, most recent first (id descending).
    pub fn history(records: &[ErrorRecord], search: &str) -> Vec<HistoryEntry> {
        let mut matched = filter_by_text(records, search);
        matched.sort_by(|a, b| b.id.cmp(&a.id));
        matched.into_iter().map(HistoryEntry::from).collect()
    }

    /// Errors per subject, descending count, one palette color per slice.
    pub fn subject_chart(records: &[ErrorRecord]) -> ChartDataset {
        let mut counts = count_by(records, |r| r.subject.clone());
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        ChartDataset::with_palette(counts)
    }

    /// Top topics within the selected subject (all subjects when none is
    /// selected), capped at [`TOP_TOPICS`].
    pub fn topic_chart(records: &[ErrorRecord], subject: Option<&str>) -> ChartDataset {
        let scoped = filter_by_subject(records, subject);
        let ranked = ranked_top_n(
            scoped.iter().copied(),
            |r| r.topic.clone(),
            TOP_TOPICS,
        );
        ChartDataset::with_accent(ranked)
    }

    /// Errors per month, chronological, scoped to the selected subject.
    pub fn timeline_chart(records: &[ErrorRecord], subject: Option<&str>) -> ChartDataset {
        let scoped = filter_by_subject(records, subject);
        let grouped = group_by_month_year(scoped.iter().copied());
        let labeled = grouped
            .into_iter()
            .map(|(key, count)| (Self::period_label(&key), count))
            .collect();
        ChartDataset::with_accent(labeled)
    }

    /// Total errors and each subject's percentage share, descending.
    pub fn summary(records: &[ErrorRecord]) -> Summary {
        let total = records.len();
        let mut counts = count_by(records, |r| r.subject.clone());
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        let subject_shares = counts
            .into_iter()
            .map(|(subject, count)| (subject, percentage_of(count, total)))
            .collect();
        Summary {
            total,
            subject_shares,
        }
    }

    /// `"2024-03"` -> `"Mar/2024"`. A key that does not fit the zero-padded
    /// shape is shown as-is.
    fn period_label(key: &str) -> String {
        let Some((year, month)) = key.split_once('-') else {
            return key.to_string();
        };
        match month.parse::<usize>() {
            Ok(m) if (1..=12).contains(&m) => format!("{}/{}", MONTH_LABELS[m - 1], year),
            _ => key.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, subject: &str, topic: &str, month: u32, year: i32) -> ErrorRecord {
        ErrorRecord {
            id,
            subject: subject.to_string(),
            topic: topic.to_string(),
            exam_source: "ENEM".to_string(),
            month,
            year,
            created_at: String::new(),
        }
    }

    fn sample() -> Vec<ErrorRecord> {
        vec![
            record(1, "Math", "Derivatives", 1, 2024),
            record(2, "Math", "Integrals", 3, 2024),
            record(3, "Bio", "Cells", 3, 2024),
        ]
    }

    #[test]
    fn option_lists_are_distinct_and_sorted() {
        let lists = ViewSynchronizer::option_lists(&sample());
        assert_eq!(lists.subjects, vec!["Bio", "Math"]);
        assert_eq!(lists.topics, vec!["Cells", "Derivatives", "Integrals"]);
        assert_eq!(lists.exam_sources, vec!["ENEM"]);
    }

    #[test]
    fn surviving_selection_is_preserved() {
        let filter = ViewSynchronizer::subject_filter(&sample(), Some("Bio"));
        assert_eq!(filter.selected.as_deref(), Some("Bio"));
    }

    #[test]
    fn vanished_selection_resets_to_all() {
        let filter = ViewSynchronizer::subject_filter(&sample(), Some("History"));
        assert_eq!(filter.selected, None);
    }

    #[test]
    fn history_is_searched_and_newest_first() {
        let entries = ViewSynchronizer::history(&sample(), "math");
        let ids: Vec<u64> = entries.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[test]
    fn subject_chart_descending_with_palette() {
        let dataset = ViewSynchronizer::subject_chart(&sample());
        assert_eq!(dataset.labels, vec!["Math", "Bio"]);
        assert_eq!(dataset.values, vec![2, 1]);
        assert_eq!(dataset.colors, vec!["#4f46e5", "#10b981"]);
    }

    #[test]
    fn topic_chart_respects_subject_filter() {
        let dataset = ViewSynchronizer::topic_chart(&sample(), Some("Math"));
        assert_eq!(dataset.labels, vec!["Derivatives", "Integrals"]);
        assert_eq!(dataset.values, vec![1, 1]);
    }

    #[test]
    fn topic_chart_caps_at_top_ten() {
        let records: Vec<ErrorRecord> = (0..15)
            .map(|i| record(i, "Math", &format!("Topic {}", i), 1, 2024))
            .collect();
        let dataset = ViewSynchronizer::topic_chart(&records, None);
        assert_eq!(dataset.labels.len(), TOP_TOPICS);
    }

    #[test]
    fn timeline_labels_are_month_slash_year() {
        let dataset = ViewSynchronizer::timeline_chart(&sample(), None);
        assert_eq!(dataset.labels, vec!["Jan/2024", "Mar/2024"]);
        assert_eq!(dataset.values, vec![1, 2]);
    }

    #[test]
    fn timeline_scopes_to_subject() {
        let dataset = ViewSynchronizer::timeline_chart(&sample(), Some("Bio"));
        assert_eq!(dataset.labels, vec!["Mar/2024"]);
        assert_eq!(dataset.values, vec![1]);
    }

    #[test]
    fn summary_shares_sum_to_whole() {
        let summary = ViewSynchronizer::summary(&sample());
        assert_eq!(summary.total, 3);
        assert_eq!(
            summary.subject_shares,
            vec![("Math".to_string(), 66.7), ("Bio".to_string(), 33.3)]
        );
    }

    #[test]
    fn empty_collection_yields_empty_artifacts() {
        let summary = ViewSynchronizer::summary(&[]);
        assert_eq!(summary.total, 0);
        assert!(summary.subject_shares.is_empty());
        let dataset = ViewSynchronizer::subject_chart(&[]);
        assert!(dataset.labels.is_empty());
    }
}
