use crate::query_interface::{DayKey, DetectionEvent, QueryRecord};
use crate::telemetry::LogManager;
use chrono::{DateTime, Timelike, Utc};
use std::collections::HashSet;

/// Events produced from one query result, plus the number of records
/// silently dropped because their timestamp could not be parsed.
#[derive(Debug)]
pub struct IngestOutput {
    pub events: Vec<DetectionEvent>,
    pub dropped_records: usize,
}

/// Normalizes raw query records into per-model detection events.
///
/// One event is emitted per (record, requested model present in that
/// record's results). Hidden models are excluded here so they never reach
/// the aggregation input, uniformly for every view.
pub struct EventIngester {
    logger: LogManager,
}

impl EventIngester {
    pub fn new() -> Self {
        Self {
            logger: LogManager::new("ingest"),
        }
    }

    pub fn ingest(
        &self,
        records: &[QueryRecord],
        selected_models: &[String],
        hidden_models: &HashSet<String>,
    ) -> IngestOutput {
        let mut events = Vec::new();
        let mut dropped_records = 0usize;

        for record in records {
            let Some((day, hour_of_day)) = parse_timestamp(&record.timestamp) else {
                dropped_records += 1;
                continue;
            };
            let has_image = record.retains_image();

            for model in selected_models {
                if hidden_models.contains(model) {
                    continue;
                }
                let Some(result) = record.models_results.get(model) else {
                    continue;
                };
                events.push(DetectionEvent {
                    day,
                    hour_of_day,
                    model: model.clone(),
                    object_count: result.total_objects,
                    has_image,
                    node: record.node.clone(),
                    per_class_counts: result.counts.clone(),
                });
            }
        }

        if dropped_records > 0 {
            self.logger.record(&format!(
                "{} records dropped (unparsable timestamp)",
                dropped_records
            ));
        }

        IngestOutput {
            events,
            dropped_records,
        }
    }
}

impl Default for EventIngester {
    fn default() -> Self {
        Self::new()
    }
}

/// `(day, fractional hour)` in UTC: hours + minutes / 60, seconds ignored.
fn parse_timestamp(raw: &str) -> Option<(DayKey, f64)> {
    let parsed = DateTime::parse_from_rfc3339(raw).ok()?;
    let utc = parsed.with_timezone(&Utc);
    let hour = f64::from(utc.hour()) + f64::from(utc.minute()) / 60.0;
    Some((DayKey::new(utc.date_naive()), hour))
}
