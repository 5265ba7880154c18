use errata::{
    ChartDataset, HistoryEntry, OptionLists, Renderer, SubjectFilterOptions, Summary,
};

/// Renderer that records the last artifact pushed for each view, standing
/// in for the presentation layer.
#[derive(Default)]
pub struct RecordingRenderer {
    pub option_lists: OptionLists,
    pub subject_filter: SubjectFilterOptions,
    pub history: Vec<HistoryEntry>,
    pub subject_chart: Option<ChartDataset>,
    pub topic_chart: Option<ChartDataset>,
    pub timeline_chart: Option<ChartDataset>,
    pub summary: Summary,
    pub refreshes: usize,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Renderer for RecordingRenderer {
    fn option_lists(&mut self, lists: &OptionLists) {
        self.option_lists = lists.clone();
    }

    fn subject_filter(&mut self, filter: &SubjectFilterOptions) {
        self.subject_filter = filter.clone();
    }

    fn history(&mut self, entries: &[HistoryEntry]) {
        self.history = entries.to_vec();
    }

    fn subject_chart(&mut self, dataset: &ChartDataset) {
        self.subject_chart = Some(dataset.clone());
    }

    fn topic_chart(&mut self, dataset: &ChartDataset) {
        self.topic_chart = Some(dataset.clone());
    }

    fn timeline_chart(&mut self, dataset: &ChartDataset) {
        self.timeline_chart = Some(dataset.clone());
    }

    fn summary(&mut self, summary: &Summary) {
        self.summary = summary.clone();
        self.refreshes += 1;
    }
}
