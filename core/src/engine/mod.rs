pub mod aggregate;
pub mod day_index;
pub mod ingest;
pub mod interact;
pub mod layout;
pub mod primitive;
pub mod scale;
pub mod scene;
pub mod viewport;

pub use aggregate::{AggregateOutput, BucketStats, ModelAggregate, TimeBucket, TimeWindowAggregator};
pub use day_index::DayBucketIndex;
pub use ingest::{EventIngester, IngestOutput};
pub use interact::{ChartView, InteractionLayer, TooltipPayload, VisibilityState};
pub use layout::{AdaptiveBarLayout, BarMetrics, BarSlot};
pub use primitive::{model_color, Primitive, Rgba};
pub use scale::ValueScale;
pub use scene::{BarHit, ChartScene, LegendEntry, SceneBuilder, SceneParams};
pub use viewport::{window_label, TimeTick, ViewportTransform};
