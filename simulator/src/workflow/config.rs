use crate::generator::profile::GeneratorConfig;
use anyhow::Context;
use chartcore::prelude::{AggregationMode, ChartConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub period_minutes: u32,
    pub mode: AggregationMode,
    pub models: Vec<String>,
    pub days: usize,
    pub records_per_day: usize,
    pub node: String,
    pub seed: u64,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            period_minutes: 60,
            mode: AggregationMode::Sum,
            models: vec!["YOLOv8n".to_string(), "YOLOv8s".to_string()],
            days: 3,
            records_per_day: 48,
            node: "W023".to_string(),
            seed: 0,
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(period_minutes: u32, days: usize, records_per_day: usize) -> Self {
        Self {
            period_minutes,
            days,
            records_per_day,
            ..Default::default()
        }
    }

    pub fn to_chart_config(&self) -> anyhow::Result<ChartConfig> {
        ChartConfig::new(self.period_minutes, self.mode)
            .context("validating chart configuration")
    }

    pub fn to_generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            days: self.days,
            records_per_day: self.records_per_day,
            models: self.models.clone(),
            node: self.node.clone(),
            seed: self.seed,
            ..Default::default()
        }
    }
}
