use anyhow::Context;
use chartcore::query_interface::{ModelResult, QueryRecord};
use chrono::{Duration, NaiveDate};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f32::consts::PI;

/// Traffic classes reported by the camera-node detectors.
const TRAFFIC_CLASSES: [&str; 5] = ["person", "bicycle", "motorcycle", "bus", "truck"];

/// Configuration for generating synthetic camera-node query records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub days: usize,
    pub records_per_day: usize,
    pub models: Vec<String>,
    pub node: String,
    pub start_date: String,
    /// Fraction of records whose image was retained on the node.
    pub image_ratio: f32,
    /// Records per day emitted with an unparsable timestamp.
    pub malformed_records: usize,
    pub seed: u64,
    pub description: Option<String>,
    pub scenario: Option<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            days: 3,
            records_per_day: 48,
            models: vec!["YOLOv8n".to_string(), "YOLOv8s".to_string()],
            node: "W023".to_string(),
            start_date: "2025-06-01".to_string(),
            image_ratio: 0.7,
            malformed_records: 0,
            seed: 0,
            description: None,
            scenario: None,
        }
    }
}

impl GeneratorConfig {
    fn normalized_records_per_day(&self) -> usize {
        self.records_per_day.max(1)
    }
}

/// Traffic volume envelope over the day: quiet nights, midday peak.
fn diurnal_envelope(minute_of_day: u32) -> f32 {
    let phase = minute_of_day as f32 / 1440.0 * PI;
    0.15 + 0.85 * phase.sin() * phase.sin()
}

fn build_counts(rng: &mut StdRng, total: u32) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    let mut remaining = total;
    for class in TRAFFIC_CLASSES {
        if remaining == 0 {
            break;
        }
        let take = rng.gen_range(0..=remaining / 3);
        if take > 0 {
            counts.insert(class.to_string(), take);
            remaining -= take;
        }
    }
    if remaining > 0 {
        counts.insert("car".to_string(), remaining);
    }
    counts
}

pub fn build_query_records_from_config(
    config: &GeneratorConfig,
) -> anyhow::Result<Vec<QueryRecord>> {
    let start_date = NaiveDate::parse_from_str(&config.start_date, "%Y-%m-%d")
        .with_context(|| format!("parsing generator start date {}", config.start_date))?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let records_per_day = config.normalized_records_per_day();
    let slot_minutes = (1440 / records_per_day).max(1) as u32;
    let mut records = Vec::with_capacity(config.days * records_per_day);

    for day_index in 0..config.days {
        let date = start_date + Duration::days(day_index as i64);
        for slot in 0..records_per_day {
            let jitter = rng.gen_range(0..slot_minutes.max(2));
            let minute_of_day = (slot as u32 * slot_minutes + jitter).min(1439);
            let second = rng.gen_range(0..60);
            let timestamp = format!(
                "{}T{:02}:{:02}:{:02}Z",
                date.format("%Y-%m-%d"),
                minute_of_day / 60,
                minute_of_day % 60,
                second
            );

            let envelope = diurnal_envelope(minute_of_day);
            let has_image = if rng.gen::<f32>() < config.image_ratio {
                None
            } else {
                Some(false)
            };

            let mut models_results = HashMap::new();
            for (model_index, model) in config.models.iter().enumerate() {
                let base = 14.0 * envelope * (1.0 - 0.12 * model_index as f32);
                let noise = rng.gen_range(-2.0f32..2.0);
                let total_objects = (base + noise).round().max(0.0) as u32;
                models_results.insert(
                    model.clone(),
                    ModelResult {
                        total_objects,
                        counts: build_counts(&mut rng, total_objects),
                    },
                );
            }

            records.push(QueryRecord {
                timestamp,
                node: config.node.clone(),
                filename: Some(format!("snapshot_{}_{:04}.jpg", date.format("%Y%m%d"), slot)),
                has_image,
                models_results,
            });
        }

        for _ in 0..config.malformed_records {
            records.push(QueryRecord {
                timestamp: "not-a-timestamp".to_string(),
                node: config.node.clone(),
                filename: None,
                has_image: None,
                models_results: HashMap::new(),
            });
        }
    }

    Ok(records)
}

pub fn build_query_records(days: usize, records_per_day: usize) -> anyhow::Result<Vec<QueryRecord>> {
    let config = GeneratorConfig {
        days,
        records_per_day,
        ..Default::default()
    };
    build_query_records_from_config(&config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_builds_expected_record_count() {
        let records = build_query_records(2, 24).unwrap();
        assert_eq!(records.len(), 2 * 24);
        assert!(records.iter().all(|r| r.models_results.len() == 2));
    }

    #[test]
    fn generator_is_deterministic_for_a_seed() {
        let config = GeneratorConfig {
            days: 1,
            records_per_day: 12,
            seed: 99,
            ..Default::default()
        };
        let first = build_query_records_from_config(&config).unwrap();
        let second = build_query_records_from_config(&config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn class_counts_sum_to_total_objects() {
        let records = build_query_records(1, 48).unwrap();
        for record in &records {
            for result in record.models_results.values() {
                let sum: u32 = result.counts.values().sum();
                assert_eq!(sum, result.total_objects);
            }
        }
    }

    #[test]
    fn malformed_records_are_appended_per_day() {
        let config = GeneratorConfig {
            days: 2,
            records_per_day: 4,
            malformed_records: 1,
            ..Default::default()
        };
        let records = build_query_records_from_config(&config).unwrap();
        assert_eq!(records.len(), 2 * 4 + 2);
        let malformed = records
            .iter()
            .filter(|r| r.timestamp == "not-a-timestamp")
            .count();
        assert_eq!(malformed, 2);
    }

    #[test]
    fn bad_start_date_is_an_error() {
        let config = GeneratorConfig {
            start_date: "June 1st".to_string(),
            ..Default::default()
        };
        assert!(build_query_records_from_config(&config).is_err());
    }
}
