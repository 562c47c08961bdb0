use crate::engine::aggregate::{AggregateOutput, BucketStats};
use crate::engine::layout::{AdaptiveBarLayout, BarMetrics};
use crate::engine::primitive::{model_color, Primitive, Rgba};
use crate::engine::scale::ValueScale;
use crate::engine::viewport::{ViewportTransform, MIN_TICK_LABEL_SPACING};
use crate::query_interface::DayKey;
use crate::telemetry::LogManager;
use std::collections::HashSet;

pub const MARGIN_LEFT: f32 = 86.0;
pub const MARGIN_RIGHT: f32 = 14.0;
pub const MARGIN_TOP: f32 = 30.0;
pub const MARGIN_BOTTOM: f32 = 12.0;
const ROW_PAD: f32 = 7.0;
const AXIS_COLOR: Rgba = Rgba::opaque(0.42, 0.42, 0.5);
const GRID_COLOR: Rgba = Rgba::new(0.3, 0.3, 0.36, 0.55);
const LABEL_COLOR: Rgba = Rgba::opaque(0.85, 0.85, 0.88);

/// Inputs that change a scene without changing the aggregation. The
/// horizontal pixel budget is carried by the viewport transform.
#[derive(Debug, Clone)]
pub struct SceneParams {
    pub height: f32,
    pub period_minutes: u32,
    pub selected_models: Vec<String>,
    pub hidden_models: HashSet<String>,
}

/// Axis-aligned pixel rectangle used for hover hit-testing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl HitRect {
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// One rendered bar with everything the tooltip needs.
#[derive(Debug, Clone)]
pub struct BarHit {
    pub rect: HitRect,
    pub model: String,
    pub day: DayKey,
    pub window_start_minute: u32,
    pub window_minutes: u32,
    pub value: f64,
    pub stats: BucketStats,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub model: String,
    pub color: Rgba,
    pub hidden: bool,
}

/// Fully laid-out chart: primitives for the renderer, hit targets for the
/// interaction layer, legend state for the controls.
#[derive(Debug, Default)]
pub struct ChartScene {
    pub primitives: Vec<Primitive>,
    pub hit_targets: Vec<BarHit>,
    pub legend: Vec<LegendEntry>,
    pub day_count: usize,
    pub max_value: f64,
}

/// Lays out one complete scene from a precomputed aggregation.
///
/// Takes `AggregateOutput` rather than raw records so drag/zoom relayouts
/// never re-run ingestion or aggregation.
pub struct SceneBuilder {
    bar_layout: AdaptiveBarLayout,
    logger: LogManager,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::with_metrics(BarMetrics::default())
    }

    pub fn with_metrics(metrics: BarMetrics) -> Self {
        Self {
            bar_layout: AdaptiveBarLayout::new(metrics),
            logger: LogManager::new("scene"),
        }
    }

    /// Horizontal pixel budget of the plot area for a given canvas width.
    pub fn inner_width(width: f32) -> f32 {
        (width - MARGIN_LEFT - MARGIN_RIGHT).max(1.0)
    }

    pub fn build(
        &self,
        days: &[DayKey],
        aggregate: &AggregateOutput,
        params: &SceneParams,
        viewport: &ViewportTransform,
    ) -> ChartScene {
        let inner_width = viewport.inner_width();
        let inner_height = (params.height - MARGIN_TOP - MARGIN_BOTTOM).max(1.0);

        let mut primitives = Vec::new();
        let mut hit_targets = Vec::new();

        // Axis ticks and vertical gridlines, thinned by the label budget.
        for tick in viewport.ticks(params.period_minutes, MIN_TICK_LABEL_SPACING) {
            let boundary_x = viewport.minute_to_px(f64::from(tick.start_minute));
            if (0.0..=inner_width).contains(&boundary_x) {
                primitives.push(Primitive::GridLine {
                    x1: MARGIN_LEFT + boundary_x,
                    y1: MARGIN_TOP,
                    x2: MARGIN_LEFT + boundary_x,
                    y2: MARGIN_TOP + inner_height,
                    stroke: GRID_COLOR,
                    stroke_width: 1.0,
                });
            }
            if (0.0..=inner_width).contains(&tick.center_x) {
                primitives.push(Primitive::Tick {
                    x: MARGIN_LEFT + tick.center_x,
                    y: MARGIN_TOP - 8.0,
                    label: tick.label,
                    color: AXIS_COLOR,
                });
            }
        }

        let day_count = days.len();
        if day_count > 0 {
            let row_height = inner_height / day_count as f32;
            let max_bar_height = (row_height - ROW_PAD).max(1.0);
            let scale = ValueScale::new(aggregate.max_value, max_bar_height);

            for (row, day) in days.iter().enumerate() {
                let row_top = MARGIN_TOP + row as f32 * row_height;
                let baseline = row_top + row_height;

                primitives.push(Primitive::GridLine {
                    x1: MARGIN_LEFT,
                    y1: baseline,
                    x2: MARGIN_LEFT + inner_width,
                    y2: baseline,
                    stroke: AXIS_COLOR,
                    stroke_width: 1.0,
                });
                primitives.push(Primitive::Text {
                    x: 8.0,
                    y: row_top + row_height / 2.0 - 6.0,
                    content: day.iso(),
                    size: 12.0,
                    color: LABEL_COLOR,
                });

                for bucket in aggregate.buckets.iter().filter(|b| b.day == *day) {
                    let window_start = viewport.minute_to_px(f64::from(bucket.window_start_minute));
                    let window_end = viewport.minute_to_px(f64::from(bucket.window_end_minute()));
                    if window_end < 0.0 || window_start > inner_width {
                        continue;
                    }

                    let slots = self.bar_layout.layout(
                        window_start,
                        window_end,
                        bucket.per_model.len(),
                    );
                    for ((model, entry), slot) in bucket.per_model.iter().zip(slots) {
                        let height = scale.height_for(entry.value);
                        let rect = HitRect {
                            x: MARGIN_LEFT + slot.x,
                            y: baseline - height,
                            width: slot.width,
                            height,
                        };
                        primitives.push(Primitive::Bar {
                            x: rect.x,
                            y: rect.y,
                            width: rect.width,
                            height: rect.height,
                            fill: model_color(model),
                        });
                        hit_targets.push(BarHit {
                            rect,
                            model: model.clone(),
                            day: *day,
                            window_start_minute: bucket.window_start_minute,
                            window_minutes: bucket.window_minutes,
                            value: entry.value,
                            stats: entry.stats,
                        });
                    }
                }
            }
        }

        let legend = params
            .selected_models
            .iter()
            .map(|model| LegendEntry {
                model: model.clone(),
                color: model_color(model),
                hidden: params.hidden_models.contains(model),
            })
            .collect();

        self.logger.record(&format!(
            "{} primitives, {} bars over {} days",
            primitives.len(),
            hit_targets.len(),
            day_count
        ));

        ChartScene {
            primitives,
            hit_targets,
            legend,
            day_count,
            max_value: aggregate.max_value,
        }
    }
}

impl Default for SceneBuilder {
    fn default() -> Self {
        Self::new()
    }
}
