//! Aggregation and chart-layout core for the Rust detection timeline
//! platform.
//!
//! The modules turn raw camera-node query records into period-aligned time
//! buckets and renderer-agnostic drawing primitives, with a clamped zoom/pan
//! transform on the horizontal time axis and hit-testing for tooltips.

pub mod engine;
pub mod prelude;
pub mod query_interface;
pub mod telemetry;

pub use prelude::{AggregationMode, ChartConfig, ChartError, ChartResult};
