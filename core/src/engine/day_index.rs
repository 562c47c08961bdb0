use crate::query_interface::{DayKey, DetectionEvent};
use std::collections::BTreeMap;

/// Detection events grouped by UTC calendar day, days ascending.
#[derive(Debug, Default)]
pub struct DayBucketIndex {
    by_day: BTreeMap<DayKey, Vec<DetectionEvent>>,
}

impl DayBucketIndex {
    pub fn build(events: Vec<DetectionEvent>) -> Self {
        let mut by_day: BTreeMap<DayKey, Vec<DetectionEvent>> = BTreeMap::new();
        for event in events {
            by_day.entry(event.day).or_default().push(event);
        }
        Self { by_day }
    }

    pub fn days(&self) -> Vec<DayKey> {
        self.by_day.keys().copied().collect()
    }

    pub fn events_for(&self, day: DayKey) -> &[DetectionEvent] {
        self.by_day.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (DayKey, &[DetectionEvent])> + '_ {
        self.by_day
            .iter()
            .map(|(day, events)| (*day, events.as_slice()))
    }

    pub fn day_count(&self) -> usize {
        self.by_day.len()
    }

    pub fn event_count(&self) -> usize {
        self.by_day.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_day.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn event(day: (i32, u32, u32), hour: f64) -> DetectionEvent {
        DetectionEvent {
            day: DayKey::new(NaiveDate::from_ymd_opt(day.0, day.1, day.2).unwrap()),
            hour_of_day: hour,
            model: "YOLOv8n".to_string(),
            object_count: 1,
            has_image: true,
            node: "W023".to_string(),
            per_class_counts: HashMap::new(),
        }
    }

    #[test]
    fn groups_by_day_in_ascending_order() {
        let index = DayBucketIndex::build(vec![
            event((2025, 6, 10), 1.0),
            event((2025, 6, 9), 12.0),
            event((2025, 6, 10), 3.0),
        ]);
        let days: Vec<String> = index.days().iter().map(DayKey::iso).collect();
        assert_eq!(days, vec!["2025-06-09", "2025-06-10"]);
        assert_eq!(index.events_for(index.days()[1]).len(), 2);
        assert_eq!(index.event_count(), 3);
    }

    #[test]
    fn empty_input_yields_empty_index() {
        let index = DayBucketIndex::build(Vec::new());
        assert!(index.is_empty());
        assert_eq!(index.day_count(), 0);
    }
}
