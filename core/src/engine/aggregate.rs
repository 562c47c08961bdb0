use crate::engine::day_index::DayBucketIndex;
use crate::prelude::{validate_period, AggregationMode, ChartResult};
use crate::query_interface::DayKey;
use crate::telemetry::LogManager;
use std::collections::BTreeMap;

/// Per-model tallies inside one time bucket, split by whether the backing
/// record retained an image or was inference-only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BucketStats {
    pub with_image_count: u32,
    pub with_image_objects: u64,
    pub inference_only_count: u32,
    pub inference_only_objects: u64,
}

impl BucketStats {
    fn record(&mut self, object_count: u32, has_image: bool) {
        if has_image {
            self.with_image_count += 1;
            self.with_image_objects += u64::from(object_count);
        } else {
            self.inference_only_count += 1;
            self.inference_only_objects += u64::from(object_count);
        }
    }

    pub fn total_count(&self) -> u32 {
        self.with_image_count + self.inference_only_count
    }

    pub fn total_objects(&self) -> u64 {
        self.with_image_objects + self.inference_only_objects
    }

    /// Sum of objects, or mean objects per event. The division is guarded;
    /// a bucket with no events aggregates to 0.
    pub fn aggregate(&self, mode: AggregationMode) -> f64 {
        match mode {
            AggregationMode::Sum => self.total_objects() as f64,
            AggregationMode::Average => {
                let count = self.total_count();
                if count == 0 {
                    0.0
                } else {
                    self.total_objects() as f64 / f64::from(count)
                }
            }
        }
    }
}

/// One model's surviving entry in a bucket: the raw tallies plus the value
/// computed under the aggregation mode in effect.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelAggregate {
    pub stats: BucketStats,
    pub value: f64,
}

/// A fixed-width time window on one day with per-model aggregates.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeBucket {
    pub day: DayKey,
    /// Aligned to a multiple of the period: `floor(minuteOfDay / period) * period`.
    pub window_start_minute: u32,
    pub window_minutes: u32,
    pub per_model: BTreeMap<String, ModelAggregate>,
}

impl TimeBucket {
    pub fn window_start_hour(&self) -> f64 {
        f64::from(self.window_start_minute) / 60.0
    }

    pub fn window_end_minute(&self) -> u32 {
        self.window_start_minute + self.window_minutes
    }
}

/// Surviving buckets in (day, window) order plus the global maximum
/// aggregate value used to calibrate the value scale.
#[derive(Debug, Default)]
pub struct AggregateOutput {
    pub buckets: Vec<TimeBucket>,
    pub max_value: f64,
}

/// Buckets events into fixed-width windows per day and accumulates
/// per-model statistics.
pub struct TimeWindowAggregator {
    period_minutes: u32,
    mode: AggregationMode,
    logger: LogManager,
}

impl TimeWindowAggregator {
    pub fn new(period_minutes: u32, mode: AggregationMode) -> ChartResult<Self> {
        validate_period(period_minutes)?;
        Ok(Self {
            period_minutes,
            mode,
            logger: LogManager::new("aggregate"),
        })
    }

    pub fn period_minutes(&self) -> u32 {
        self.period_minutes
    }

    pub fn mode(&self) -> AggregationMode {
        self.mode
    }

    pub fn aggregate(&self, index: &DayBucketIndex) -> AggregateOutput {
        let mut tallies: BTreeMap<(DayKey, u32), BTreeMap<String, BucketStats>> = BTreeMap::new();

        for (day, events) in index.iter() {
            for event in events {
                // hour_of_day * 60 restores the exact minute of day.
                let minute_of_day = event.hour_of_day * 60.0;
                let start_minute = (minute_of_day / f64::from(self.period_minutes)).floor()
                    as u32
                    * self.period_minutes;
                tallies
                    .entry((day, start_minute))
                    .or_default()
                    .entry(event.model.clone())
                    .or_default()
                    .record(event.object_count, event.has_image);
            }
        }

        let mut buckets = Vec::new();
        let mut max_value = 0.0f64;
        for ((day, window_start_minute), models) in tallies {
            let mut per_model = BTreeMap::new();
            for (model, stats) in models {
                let value = stats.aggregate(self.mode);
                if value == 0.0 {
                    continue;
                }
                if value > max_value {
                    max_value = value;
                }
                per_model.insert(model, ModelAggregate { stats, value });
            }
            if per_model.is_empty() {
                continue;
            }
            buckets.push(TimeBucket {
                day,
                window_start_minute,
                window_minutes: self.period_minutes,
                per_model,
            });
        }

        self.logger.record(&format!(
            "{} buckets over {} days, max value {:.3}",
            buckets.len(),
            index.day_count(),
            max_value
        ));

        AggregateOutput { buckets, max_value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_interface::DetectionEvent;
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn day(y: i32, m: u32, d: u32) -> DayKey {
        DayKey::new(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn event(hour: f64, model: &str, objects: u32, has_image: bool) -> DetectionEvent {
        DetectionEvent {
            day: day(2025, 6, 1),
            hour_of_day: hour,
            model: model.to_string(),
            object_count: objects,
            has_image,
            node: "W023".to_string(),
            per_class_counts: HashMap::new(),
        }
    }

    fn index(events: Vec<DetectionEvent>) -> DayBucketIndex {
        DayBucketIndex::build(events)
    }

    #[test]
    fn sum_mode_combines_image_and_inference_events() {
        // Spec scenario: 10 objects with image at 0.0h, 5 without at 0.4h.
        let aggregator = TimeWindowAggregator::new(60, AggregationMode::Sum).unwrap();
        let output = aggregator.aggregate(&index(vec![
            event(0.0, "M1", 10, true),
            event(0.4, "M1", 5, false),
        ]));

        assert_eq!(output.buckets.len(), 1);
        let bucket = &output.buckets[0];
        assert_eq!(bucket.window_start_minute, 0);
        let entry = &bucket.per_model["M1"];
        assert_eq!(entry.stats.with_image_objects, 10);
        assert_eq!(entry.stats.inference_only_objects, 5);
        assert_eq!(entry.value, 15.0);
        assert_eq!(output.max_value, 15.0);
    }

    #[test]
    fn average_mode_divides_by_event_count() {
        let aggregator = TimeWindowAggregator::new(60, AggregationMode::Average).unwrap();
        let output = aggregator.aggregate(&index(vec![
            event(0.0, "M1", 10, true),
            event(0.4, "M1", 5, false),
        ]));
        assert_eq!(output.buckets[0].per_model["M1"].value, 7.5);
    }

    #[test]
    fn zero_valued_entries_are_dropped() {
        let aggregator = TimeWindowAggregator::new(60, AggregationMode::Sum).unwrap();
        let output = aggregator.aggregate(&index(vec![
            event(1.0, "M1", 0, true),
            event(2.0, "M2", 3, true),
        ]));
        assert_eq!(output.buckets.len(), 1);
        assert!(output.buckets[0].per_model.contains_key("M2"));
    }

    #[test]
    fn empty_index_produces_empty_output() {
        let aggregator = TimeWindowAggregator::new(60, AggregationMode::Sum).unwrap();
        let output = aggregator.aggregate(&index(Vec::new()));
        assert!(output.buckets.is_empty());
        assert_eq!(output.max_value, 0.0);
    }

    #[test]
    fn window_starts_align_to_period_multiples() {
        for period in [15u32, 30, 60, 90, 120, 480] {
            let aggregator = TimeWindowAggregator::new(period, AggregationMode::Sum).unwrap();
            let output = aggregator.aggregate(&index(vec![
                event(0.4, "M1", 1, true),
                event(7.75, "M1", 2, true),
                event(23.9, "M1", 3, false),
            ]));
            for bucket in &output.buckets {
                assert_eq!(bucket.window_start_minute % period, 0);
                assert!(bucket.window_start_minute < 1440);
            }
        }
    }

    #[test]
    fn conservation_of_object_counts_per_model() {
        let events = vec![
            event(0.1, "M1", 4, true),
            event(5.9, "M1", 7, false),
            event(5.95, "M2", 2, true),
            event(23.0, "M1", 11, true),
        ];
        let expected: u64 = events
            .iter()
            .filter(|e| e.model == "M1")
            .map(|e| u64::from(e.object_count))
            .sum();

        let aggregator = TimeWindowAggregator::new(30, AggregationMode::Sum).unwrap();
        let output = aggregator.aggregate(&index(events));
        let total: u64 = output
            .buckets
            .iter()
            .filter_map(|b| b.per_model.get("M1"))
            .map(|m| m.stats.total_objects())
            .sum();
        assert_eq!(total, expected);
    }

    #[test]
    fn recomputation_is_idempotent_and_mode_round_trips() {
        let events = vec![
            event(0.0, "M1", 10, true),
            event(0.4, "M1", 5, false),
            event(13.2, "M2", 8, true),
        ];
        let sum = TimeWindowAggregator::new(60, AggregationMode::Sum).unwrap();
        let first = sum.aggregate(&index(events.clone()));
        let again = sum.aggregate(&index(events.clone()));
        assert_eq!(first.buckets, again.buckets);

        let avg = TimeWindowAggregator::new(60, AggregationMode::Average).unwrap();
        let _ = avg.aggregate(&index(events.clone()));
        let back = sum.aggregate(&index(events));
        assert_eq!(first.buckets, back.buckets);
    }

    #[test]
    fn rejects_period_that_does_not_divide_a_day() {
        assert!(TimeWindowAggregator::new(77, AggregationMode::Sum).is_err());
    }
}
