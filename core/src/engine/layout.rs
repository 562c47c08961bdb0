/// Pixel defaults for bar sizing inside one bucket window.
#[derive(Debug, Clone, Copy)]
pub struct BarMetrics {
    pub min_width: f32,
    pub max_width: f32,
    pub base_gap: f32,
    pub min_gap: f32,
    pub inner_pad: f32,
}

impl Default for BarMetrics {
    fn default() -> Self {
        Self {
            min_width: 1.0,
            max_width: 8.0,
            base_gap: 2.0,
            min_gap: 0.0,
            inner_pad: 3.0,
        }
    }
}

/// Horizontal placement of one bar inside its bucket window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarSlot {
    pub x: f32,
    pub width: f32,
}

/// Computes non-overlapping bar geometry for the models present in one
/// bucket, shrinking the gap before the width and the width only as a last
/// resort. When the window is narrower than `lanes * min_width` the layout
/// degrades to minimum-width bars that may overlap instead of failing.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdaptiveBarLayout {
    metrics: BarMetrics,
}

impl AdaptiveBarLayout {
    pub fn new(metrics: BarMetrics) -> Self {
        Self { metrics }
    }

    pub fn metrics(&self) -> BarMetrics {
        self.metrics
    }

    /// Lays out `lanes` bars inside the pixel window `[x_start, x_end]`.
    pub fn layout(&self, x_start: f32, x_end: f32, lanes: usize) -> Vec<BarSlot> {
        if lanes == 0 {
            return Vec::new();
        }
        let m = self.metrics;
        let k = lanes as f32;
        let gap_slots = (lanes - 1) as f32;
        let gap_divisor = gap_slots.max(1.0);

        let available = (x_end - x_start) - 2.0 * m.inner_pad;

        let mut gap = ((available - k * m.min_width) / gap_divisor)
            .floor()
            .min(m.base_gap)
            .max(m.min_gap);
        let mut width = ((available - gap_slots * gap) / k)
            .floor()
            .min(m.max_width)
            .max(m.min_width);

        let mut group_width = k * width + gap_slots * gap;
        if group_width > available {
            gap = ((available - k * width) / gap_divisor).floor().max(m.min_gap);
            group_width = k * width + gap_slots * gap;
        }
        if group_width > available {
            width = ((available - gap_slots * gap) / k).floor().max(m.min_width);
            group_width = k * width + gap_slots * gap;
        }

        // Centered; the lower bound wins for degenerate narrow windows.
        let lo = x_start + m.inner_pad;
        let hi = x_end - m.inner_pad - group_width;
        let x_group_start = (lo + (available - group_width) / 2.0).min(hi).max(lo);

        (0..lanes)
            .map(|i| BarSlot {
                x: x_group_start + i as f32 * (width + gap),
                width,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(x_start: f32, x_end: f32, lanes: usize) -> Vec<BarSlot> {
        AdaptiveBarLayout::default().layout(x_start, x_end, lanes)
    }

    #[test]
    fn three_lanes_in_sixteen_pixels() {
        // available = 16 - 2*3 = 10 -> gap 2, width 2, group exactly 10.
        let slots = layout(0.0, 16.0, 3);
        assert_eq!(slots.len(), 3);
        let width = slots[0].width;
        assert_eq!(width, 2.0);
        assert_eq!(slots[1].x - (slots[0].x + width), 2.0);
        assert!(slots[0].x >= 3.0);
        assert!(slots[2].x + width <= 13.0 + 1e-3);
    }

    #[test]
    fn single_lane_is_centered_and_capped() {
        let slots = layout(0.0, 100.0, 1);
        assert_eq!(slots[0].width, 8.0);
        let center = slots[0].x + slots[0].width / 2.0;
        assert!((center - 50.0).abs() <= 1.0);
    }

    #[test]
    fn bars_never_overlap_nor_escape_the_padded_interior() {
        let metrics = BarMetrics::default();
        for lanes in 1..=12usize {
            let min_span = lanes as f32 * metrics.min_width + 2.0 * metrics.inner_pad;
            for span in [min_span, min_span + 1.0, 13.7, 50.3, 377.0, 10_000.0] {
                if span < min_span {
                    continue;
                }
                let slots = layout(0.0, span, lanes);
                assert_eq!(slots.len(), lanes);
                for pair in slots.windows(2) {
                    assert!(
                        pair[0].x + pair[0].width <= pair[1].x + 1e-3,
                        "overlap at lanes={} span={}",
                        lanes,
                        span
                    );
                }
                let first = slots.first().unwrap();
                let last = slots.last().unwrap();
                assert!(first.x >= metrics.inner_pad - 1e-3);
                assert!(last.x + last.width <= span - metrics.inner_pad + 1e-3);
            }
        }
    }

    #[test]
    fn pathological_narrow_window_degrades_without_panicking() {
        // available = 4 - 6 < 0 while 8 lanes want at least 8px.
        let slots = layout(0.0, 4.0, 8);
        assert_eq!(slots.len(), 8);
        for slot in &slots {
            assert_eq!(slot.width, 1.0);
        }
        // Degraded: bars start at the padded left edge rather than erroring.
        assert_eq!(slots[0].x, 3.0);
    }

    #[test]
    fn tighter_windows_shrink_geometry_not_correctness() {
        let wide = layout(0.0, 26.0, 4);
        let tight = layout(0.0, 20.0, 4);
        let wide_gap = wide[1].x - (wide[0].x + wide[0].width);
        let tight_gap = tight[1].x - (tight[0].x + tight[0].width);
        assert!(tight_gap < wide_gap || tight[0].width <= wide[0].width);
        assert!(tight[0].width >= 1.0);
    }
}
