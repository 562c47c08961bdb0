/// Monotonic square-root mapping from aggregate values to bar heights.
///
/// Area-proportional encoding keeps large counts from visually
/// overwhelming the chart. Any nonzero value maps to at least one pixel so
/// sparse buckets stay visible.
#[derive(Debug, Clone, Copy)]
pub struct ValueScale {
    max_value: f64,
    max_height: f32,
}

impl ValueScale {
    pub fn new(max_value: f64, max_height: f32) -> Self {
        Self {
            max_value: max_value.max(0.0),
            max_height: max_height.max(1.0),
        }
    }

    pub fn height_for(&self, value: f64) -> f32 {
        if value <= 0.0 {
            return 0.0;
        }
        if self.max_value <= 0.0 {
            return 1.0;
        }
        let normalized = (value / self.max_value).clamp(0.0, 1.0);
        let height = (normalized.sqrt() as f32) * self.max_height;
        height.max(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_maps_to_zero() {
        let scale = ValueScale::new(100.0, 120.0);
        assert_eq!(scale.height_for(0.0), 0.0);
    }

    #[test]
    fn nonzero_values_get_at_least_one_pixel() {
        let scale = ValueScale::new(10_000.0, 120.0);
        assert!(scale.height_for(0.0001) >= 1.0);
        assert!(scale.height_for(1.0) >= 1.0);
    }

    #[test]
    fn max_value_fills_the_budget() {
        let scale = ValueScale::new(100.0, 120.0);
        assert!((scale.height_for(100.0) - 120.0).abs() < 1e-3);
    }

    #[test]
    fn mapping_is_monotonic() {
        let scale = ValueScale::new(50.0, 80.0);
        let mut last = 0.0f32;
        for step in 0..=50 {
            let height = scale.height_for(f64::from(step));
            assert!(height >= last);
            last = height;
        }
    }

    #[test]
    fn quadrupling_the_value_doubles_the_height() {
        let scale = ValueScale::new(400.0, 200.0);
        let h1 = scale.height_for(25.0);
        let h2 = scale.height_for(100.0);
        assert!((h2 / h1 - 2.0).abs() < 1e-3);
    }
}
