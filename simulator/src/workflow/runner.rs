use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use chartcore::engine::{
    DayBucketIndex, EventIngester, Primitive, SceneBuilder, SceneParams, TimeWindowAggregator,
    ViewportTransform,
};
use chartcore::query_interface::QueryRecord;
use chartcore::telemetry::MetricsRecorder;
use std::collections::HashSet;
use std::sync::Arc;

/// Offline canvas used when no real surface drives the pixel budget.
const OFFLINE_WIDTH: f32 = 1280.0;
const OFFLINE_HEIGHT: f32 = 480.0;

pub struct WorkflowResult {
    pub event_count: usize,
    pub dropped_records: usize,
    pub day_count: usize,
    pub bucket_count: usize,
    pub max_value: f64,
    pub primitive_count: usize,
    pub bar_count: usize,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
    metrics: Arc<MetricsRecorder>,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self {
            config,
            metrics: Arc::new(MetricsRecorder::new()),
        }
    }

    /// `(recomputations, dropped_records)` since startup.
    pub fn metrics_snapshot(&self) -> (usize, usize) {
        self.metrics.snapshot()
    }

    /// Runs the full pipeline over one record set: ingest, day grouping,
    /// window aggregation and a scene layout at the offline canvas size.
    pub fn execute(&self, records: &[QueryRecord]) -> anyhow::Result<WorkflowResult> {
        let chart_config = self
            .config
            .to_chart_config()
            .context("resolving chart configuration")?;

        let hidden = HashSet::new();
        let ingester = EventIngester::new();
        let ingest_output = ingester.ingest(records, &self.config.models, &hidden);
        let event_count = ingest_output.events.len();
        let dropped_records = ingest_output.dropped_records;

        let index = DayBucketIndex::build(ingest_output.events);
        let aggregator = TimeWindowAggregator::new(chart_config.period_minutes, chart_config.mode)
            .context("initializing aggregator")?;
        let aggregate = aggregator.aggregate(&index);

        let viewport = ViewportTransform::new(SceneBuilder::inner_width(OFFLINE_WIDTH));
        let params = SceneParams {
            height: OFFLINE_HEIGHT,
            period_minutes: chart_config.period_minutes,
            selected_models: self.config.models.clone(),
            hidden_models: hidden,
        };
        self.metrics.record_recomputation();
        self.metrics.record_dropped(dropped_records);

        let scene = SceneBuilder::new().build(&index.days(), &aggregate, &params, &viewport);
        let bar_count = scene
            .primitives
            .iter()
            .filter(|p| matches!(p, Primitive::Bar { .. }))
            .count();

        Ok(WorkflowResult {
            event_count,
            dropped_records,
            day_count: index.day_count(),
            bucket_count: aggregate.buckets.len(),
            max_value: aggregate.max_value,
            primitive_count: scene.primitives.len(),
            bar_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::build_query_records;

    #[test]
    fn runner_executes_workflow() {
        let cfg = WorkflowConfig::from_args(60, 2, 24);
        let runner = Runner::new(cfg.clone());
        let records = build_query_records(cfg.days, cfg.records_per_day).unwrap();
        let result = runner.execute(&records).unwrap();
        assert_eq!(result.day_count, 2);
        assert_eq!(result.event_count, 2 * 24 * cfg.models.len());
        assert!(result.bucket_count > 0);
        assert!(result.bar_count > 0);
        assert_eq!(result.dropped_records, 0);
        assert_eq!(runner.metrics_snapshot(), (1, 0));
    }

    #[test]
    fn runner_surfaces_invalid_periods() {
        let cfg = WorkflowConfig::from_args(75, 1, 4);
        let runner = Runner::new(cfg);
        let records = build_query_records(1, 4).unwrap();
        assert!(runner.execute(&records).is_err());
    }
}
