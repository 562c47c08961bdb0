use serde::{Deserialize, Serialize};

/// Number of minutes in one UTC day; every bucket period must divide it.
pub const MINUTES_PER_DAY: u32 = 1440;

/// Rule used to combine the events of one bucket into a single value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AggregationMode {
    Sum,
    Average,
}

/// Shared configuration for a full chart recomputation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    pub period_minutes: u32,
    pub mode: AggregationMode,
}

impl ChartConfig {
    pub fn new(period_minutes: u32, mode: AggregationMode) -> ChartResult<Self> {
        validate_period(period_minutes)?;
        Ok(Self {
            period_minutes,
            mode,
        })
    }
}

/// A bucket period is valid iff it is a positive divisor of 1440.
pub fn validate_period(period_minutes: u32) -> ChartResult<()> {
    if period_minutes == 0 || MINUTES_PER_DAY % period_minutes != 0 {
        return Err(ChartError::InvalidPeriod(format!(
            "{} minutes does not divide a day",
            period_minutes
        )));
    }
    Ok(())
}

/// Common error type for engine execution.
#[derive(thiserror::Error, Debug)]
pub enum ChartError {
    #[error("invalid period: {0}")]
    InvalidPeriod(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type ChartResult<T> = Result<T, ChartError>;
