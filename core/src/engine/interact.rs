use crate::engine::scene::BarHit;
use crate::engine::viewport::window_label;
use std::collections::HashSet;

/// How far (px) the pointer may miss a bar and still pick it up.
const HOVER_SLOP_PX: f32 = 6.0;

/// The two chart views sharing the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartView {
    Timeline,
    Aggregated,
}

/// Per-view hidden-model sets.
///
/// Passed explicitly into ingestion, never read as ambient state; hiding a
/// model removes it from the aggregation input of the owning view.
#[derive(Debug, Clone, Default)]
pub struct VisibilityState {
    timeline: HashSet<String>,
    aggregated: HashSet<String>,
}

impl VisibilityState {
    pub fn hidden_for(&self, view: ChartView) -> &HashSet<String> {
        match view {
            ChartView::Timeline => &self.timeline,
            ChartView::Aggregated => &self.aggregated,
        }
    }

    pub fn is_hidden(&self, view: ChartView, model: &str) -> bool {
        self.hidden_for(view).contains(model)
    }

    /// Flips membership; returns whether the model is now hidden.
    pub fn toggle(&mut self, view: ChartView, model: &str) -> bool {
        let set = match view {
            ChartView::Timeline => &mut self.timeline,
            ChartView::Aggregated => &mut self.aggregated,
        };
        if set.remove(model) {
            false
        } else {
            set.insert(model.to_string());
            true
        }
    }
}

/// Everything a tooltip renders for one hovered bar.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipPayload {
    pub model: String,
    pub day: String,
    pub window: String,
    pub value: f64,
    pub with_image_count: u32,
    pub with_image_objects: u64,
    pub inference_only_count: u32,
    pub inference_only_objects: u64,
}

impl TooltipPayload {
    fn from_hit(hit: &BarHit) -> Self {
        Self {
            model: hit.model.clone(),
            day: hit.day.iso(),
            window: window_label(hit.window_start_minute, hit.window_minutes),
            value: hit.value,
            with_image_count: hit.stats.with_image_count,
            with_image_objects: hit.stats.with_image_objects,
            inference_only_count: hit.stats.inference_only_count,
            inference_only_objects: hit.stats.inference_only_objects,
        }
    }
}

/// Hover hit-testing against the last computed layout.
///
/// Holds only hit rectangles, so pointer motion never touches the
/// aggregation pipeline.
#[derive(Debug, Default)]
pub struct InteractionLayer {
    hits: Vec<BarHit>,
    tooltip: Option<TooltipPayload>,
}

impl InteractionLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopts a freshly built scene's hit targets.
    pub fn set_scene(&mut self, hits: Vec<BarHit>) {
        self.hits = hits;
        self.tooltip = None;
    }

    /// Updates the tooltip for a pointer position; a bar under the pointer
    /// wins, otherwise the nearest bar within the slop radius.
    pub fn hover(&mut self, x: f32, y: f32) -> Option<&TooltipPayload> {
        let mut best: Option<(f32, &BarHit)> = None;
        for hit in &self.hits {
            let distance = rect_distance(&hit.rect, x, y);
            if distance > HOVER_SLOP_PX {
                continue;
            }
            match best {
                Some((current, _)) if current <= distance => {}
                _ => best = Some((distance, hit)),
            }
        }
        self.tooltip = best.map(|(_, hit)| TooltipPayload::from_hit(hit));
        self.tooltip.as_ref()
    }

    pub fn pointer_left(&mut self) {
        self.tooltip = None;
    }

    pub fn tooltip(&self) -> Option<&TooltipPayload> {
        self.tooltip.as_ref()
    }
}

fn rect_distance(rect: &crate::engine::scene::HitRect, x: f32, y: f32) -> f32 {
    let dx = (rect.x - x).max(x - (rect.x + rect.width)).max(0.0);
    let dy = (rect.y - y).max(y - (rect.y + rect.height)).max(0.0);
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::aggregate::BucketStats;
    use crate::engine::scene::HitRect;
    use crate::query_interface::DayKey;
    use chrono::NaiveDate;

    fn hit(x: f32, model: &str) -> BarHit {
        BarHit {
            rect: HitRect {
                x,
                y: 100.0,
                width: 4.0,
                height: 40.0,
            },
            model: model.to_string(),
            day: DayKey::new(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()),
            window_start_minute: 480,
            window_minutes: 60,
            value: 15.0,
            stats: BucketStats {
                with_image_count: 1,
                with_image_objects: 10,
                inference_only_count: 1,
                inference_only_objects: 5,
            },
        }
    }

    #[test]
    fn hover_inside_a_bar_builds_the_payload() {
        let mut layer = InteractionLayer::new();
        layer.set_scene(vec![hit(200.0, "YOLOv8n")]);

        let tooltip = layer.hover(202.0, 120.0).cloned().unwrap();
        assert_eq!(tooltip.model, "YOLOv8n");
        assert_eq!(tooltip.day, "2025-06-01");
        assert_eq!(tooltip.window, "08:00–09:00");
        assert_eq!(tooltip.value, 15.0);
        assert_eq!(tooltip.with_image_objects, 10);
        assert_eq!(tooltip.inference_only_objects, 5);
    }

    #[test]
    fn near_miss_snaps_to_the_nearest_bar() {
        let mut layer = InteractionLayer::new();
        layer.set_scene(vec![hit(200.0, "near"), hit(300.0, "far")]);
        let tooltip = layer.hover(208.0, 120.0).cloned().unwrap();
        assert_eq!(tooltip.model, "near");
    }

    #[test]
    fn far_pointer_yields_no_tooltip() {
        let mut layer = InteractionLayer::new();
        layer.set_scene(vec![hit(200.0, "YOLOv8n")]);
        assert!(layer.hover(260.0, 120.0).is_none());
        assert!(layer.tooltip().is_none());
    }

    #[test]
    fn pointer_leave_clears_the_tooltip() {
        let mut layer = InteractionLayer::new();
        layer.set_scene(vec![hit(200.0, "YOLOv8n")]);
        layer.hover(202.0, 120.0);
        assert!(layer.tooltip().is_some());
        layer.pointer_left();
        assert!(layer.tooltip().is_none());
    }

    #[test]
    fn visibility_toggle_is_per_view() {
        let mut visibility = VisibilityState::default();
        assert!(visibility.toggle(ChartView::Timeline, "YOLOv8n"));
        assert!(visibility.is_hidden(ChartView::Timeline, "YOLOv8n"));
        assert!(!visibility.is_hidden(ChartView::Aggregated, "YOLOv8n"));
        assert!(!visibility.toggle(ChartView::Timeline, "YOLOv8n"));
        assert!(!visibility.is_hidden(ChartView::Timeline, "YOLOv8n"));
    }
}
