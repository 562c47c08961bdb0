use crate::prelude::MINUTES_PER_DAY;

pub const DEFAULT_MAX_SCALE: f32 = 8.0;
pub const MIN_TICK_LABEL_SPACING: f32 = 72.0;

/// One axis tick: the pixel center of a bucket window plus its UTC range
/// label.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeTick {
    pub center_x: f32,
    pub start_minute: u32,
    pub label: String,
}

/// Zoom/pan state for the horizontal time axis.
///
/// Screen coordinates compose as `px = translate_x + scale * content_x`
/// (translate, then scale). The day axis never zooms. Pan and zoom are
/// clamped so the visible window stays inside `[0, inner_width]` content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportTransform {
    scale: f32,
    translate_x: f32,
    inner_width: f32,
    max_scale: f32,
}

impl ViewportTransform {
    pub fn new(inner_width: f32) -> Self {
        Self::with_max_scale(inner_width, DEFAULT_MAX_SCALE)
    }

    pub fn with_max_scale(inner_width: f32, max_scale: f32) -> Self {
        Self {
            scale: 1.0,
            translate_x: 0.0,
            inner_width: inner_width.max(1.0),
            max_scale: max_scale.max(1.0),
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn translate_x(&self) -> f32 {
        self.translate_x
    }

    pub fn inner_width(&self) -> f32 {
        self.inner_width
    }

    /// Adopts a new pixel width after a container resize, re-clamping the
    /// pan without resetting the zoom level.
    pub fn set_inner_width(&mut self, inner_width: f32) {
        self.inner_width = inner_width.max(1.0);
        self.clamp_translation();
    }

    pub fn apply(&self, content_x: f32) -> f32 {
        self.translate_x + self.scale * content_x
    }

    pub fn invert(&self, px: f32) -> f32 {
        (px - self.translate_x) / self.scale
    }

    /// Multiplies the scale by `factor`, keeping the content under
    /// `anchor_px` stationary on screen.
    pub fn zoom_at(&mut self, anchor_px: f32, factor: f32) {
        let anchored_content = self.invert(anchor_px);
        self.scale = (self.scale * factor).clamp(1.0, self.max_scale);
        self.translate_x = anchor_px - self.scale * anchored_content;
        self.clamp_translation();
    }

    pub fn pan_by(&mut self, delta_px: f32) {
        self.translate_x += delta_px;
        self.clamp_translation();
    }

    pub fn reset(&mut self) {
        self.scale = 1.0;
        self.translate_x = 0.0;
    }

    fn clamp_translation(&mut self) {
        let min_translate = self.inner_width - self.scale * self.inner_width;
        self.translate_x = self.translate_x.clamp(min_translate, 0.0);
    }

    /// Maps a minute of day into screen pixels under the current transform.
    pub fn minute_to_px(&self, minute: f64) -> f32 {
        let content = (minute / f64::from(MINUTES_PER_DAY)) as f32 * self.inner_width;
        self.apply(content)
    }

    /// Visible `[start, end]` minute-of-day domain, obtained by
    /// inverse-mapping the fixed pixel range.
    pub fn visible_minutes(&self) -> (f64, f64) {
        let to_minutes = |px: f32| {
            f64::from(self.invert(px) / self.inner_width) * f64::from(MINUTES_PER_DAY)
        };
        (to_minutes(0.0), to_minutes(self.inner_width))
    }

    /// Tick set for the current transform: window starts spaced by the
    /// smallest period multiple whose on-screen spacing stays above
    /// `min_label_spacing`, each labelled with its `HH:MM–HH:MM` window.
    pub fn ticks(&self, period_minutes: u32, min_label_spacing: f32) -> Vec<TimeTick> {
        let period = period_minutes.max(1);
        let px_per_minute = self.scale * self.inner_width / MINUTES_PER_DAY as f32;

        let mut step = period;
        while (step as f32) * px_per_minute < min_label_spacing && step < MINUTES_PER_DAY {
            step += period;
        }

        let (start, end) = self.visible_minutes();
        let mut minute = ((start.max(0.0) / f64::from(step)).floor() as u32) * step;
        let mut ticks = Vec::new();
        while f64::from(minute) <= end && minute < MINUTES_PER_DAY {
            ticks.push(TimeTick {
                center_x: self.minute_to_px(f64::from(minute) + f64::from(period) / 2.0),
                start_minute: minute,
                label: window_label(minute, period),
            });
            minute += step;
        }
        ticks
    }
}

/// `HH:MM–HH:MM` (UTC) label for the window starting at `start_minute`;
/// the day boundary formats as `24:00`.
pub fn window_label(start_minute: u32, window_minutes: u32) -> String {
    format!(
        "{}–{}",
        format_minute(start_minute),
        format_minute(start_minute + window_minutes)
    )
}

fn format_minute(minute: u32) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}
