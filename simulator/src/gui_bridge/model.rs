use chartcore::query_interface::QueryRecord;
use serde::{Deserialize, Serialize};

/// Record feed served to the visualizer over the HTTP bridge.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VisualizationFeed {
    pub records: Vec<QueryRecord>,
    pub record_count: usize,
    pub feed_notes: Vec<String>,
}

impl VisualizationFeed {
    pub fn new(records: Vec<QueryRecord>, feed_notes: Vec<String>) -> Self {
        let record_count = records.len();
        Self {
            records,
            record_count,
            feed_notes,
        }
    }
}
