use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// UTC calendar date used as the chart's row axis.
///
/// Ordering is derived from the date itself, which coincides with
/// lexicographic order of the zero-padded ISO string downstream renderers
/// sort by.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct DayKey(NaiveDate);

impl DayKey {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Zero-padded `YYYY-MM-DD`.
    pub fn iso(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// One per-model detection event derived from a query record.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionEvent {
    pub day: DayKey,
    /// Fractional hour of day: UTC hours + UTC minutes / 60, unsnapped.
    pub hour_of_day: f64,
    pub model: String,
    pub object_count: u32,
    pub has_image: bool,
    pub node: String,
    pub per_class_counts: HashMap<String, u32>,
}
