use crate::config::ZoomConfig;

/// Zoom always stays inside `MIN_ZOOM..=MAX_ZOOM`; reset returns to `MIN_ZOOM`.
pub const MIN_ZOOM: f32 = 1.0;
pub const MAX_ZOOM: f32 = 2.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowMode {
    Clipped,
    Scrollable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelOutcome {
    /// No modifier held; the event scrolls as usual.
    PassThrough,
    Zoomed,
}

#[derive(Debug, Clone)]
pub struct ZoomController {
    level: f32,
    pinch_origin: Option<f32>,
    config: ZoomConfig,
}

impl Default for ZoomController {
    fn default() -> Self {
        Self::new(ZoomConfig::default())
    }
}

impl ZoomController {
    pub fn new(config: ZoomConfig) -> Self {
        Self {
            level: MIN_ZOOM,
            pinch_origin: None,
            config,
        }
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn zoom_in(&mut self) -> bool {
        self.set(self.level + self.config.button_step)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.set(self.level - self.config.button_step)
    }

    pub fn reset(&mut self) -> bool {
        self.pinch_origin = None;
        self.set(MIN_ZOOM)
    }

    /// Negative `delta_y` (wheel up) zooms in, one step per event.
    pub fn wheel(&mut self, delta_y: f32, modifier_held: bool) -> WheelOutcome {
        if !modifier_held {
            return WheelOutcome::PassThrough;
        }
        if delta_y < 0.0 {
            self.set(self.level + self.config.wheel_step);
        } else if delta_y > 0.0 {
            self.set(self.level - self.config.wheel_step);
        }
        WheelOutcome::Zoomed
    }

    pub fn pinch_start(&mut self) {
        self.pinch_origin = Some(self.level);
    }

    /// `scale` is relative to the zoom level captured at `pinch_start`.
    pub fn pinch_update(&mut self, scale: f32) -> bool {
        let origin = *self.pinch_origin.get_or_insert(self.level);
        if !scale.is_finite() || scale <= 0.0 {
            return false;
        }
        self.set(origin * scale)
    }

    pub fn pinch_end(&mut self) {
        self.pinch_origin = None;
    }

    pub fn is_zoomed(&self) -> bool {
        self.level > self.config.scroll_threshold
    }

    pub fn overflow_mode(&self) -> OverflowMode {
        if self.is_zoomed() {
            OverflowMode::Scrollable
        } else {
            OverflowMode::Clipped
        }
    }

    /// Pointer-driven page turns are suppressed while zoomed so they never
    /// compete with panning.
    pub fn allows_page_gestures(&self) -> bool {
        !self.is_zoomed()
    }

    fn set(&mut self, value: f32) -> bool {
        if !value.is_finite() {
            return false;
        }
        let clamped = value.clamp(MIN_ZOOM, MAX_ZOOM);
        if zoom_eq(self.level, clamped) {
            return false;
        }
        self.level = clamped;
        true
    }
}

pub(crate) fn zoom_eq(left: f32, right: f32) -> bool {
    (left - right).abs() <= 0.0005
}

#[cfg(test)]
mod tests {
    use super::{OverflowMode, WheelOutcome, ZoomController, zoom_eq};

    #[test]
    fn two_zoom_in_clicks_reach_one_point_three() {
        let mut zoom = ZoomController::default();
        assert!(zoom.zoom_in());
        assert!(zoom.zoom_in());
        assert!(zoom_eq(zoom.level(), 1.30));
    }

    #[test]
    fn adjustments_stay_within_bounds() {
        let mut zoom = ZoomController::default();
        for _ in 0..40 {
            zoom.zoom_in();
            zoom.wheel(-1.0, true);
            assert!((1.0..=2.5).contains(&zoom.level()));
        }
        assert_eq!(zoom.level(), 2.5);

        zoom.pinch_start();
        zoom.pinch_update(10.0);
        assert_eq!(zoom.level(), 2.5);
        zoom.pinch_update(0.01);
        assert_eq!(zoom.level(), 1.0);
        zoom.pinch_update(f32::NAN);
        zoom.pinch_end();
        assert_eq!(zoom.level(), 1.0);

        for _ in 0..40 {
            zoom.zoom_out();
            zoom.wheel(3.0, true);
            assert!((1.0..=2.5).contains(&zoom.level()));
        }
    }

    #[test]
    fn plain_wheel_passes_through() {
        let mut zoom = ZoomController::default();
        assert_eq!(zoom.wheel(-1.0, false), WheelOutcome::PassThrough);
        assert_eq!(zoom.level(), 1.0);

        assert_eq!(zoom.wheel(-1.0, true), WheelOutcome::Zoomed);
        assert!(zoom_eq(zoom.level(), 1.12));
    }

    #[test]
    fn pinch_is_relative_to_gesture_start() {
        let mut zoom = ZoomController::default();
        zoom.zoom_in();
        zoom.pinch_start();
        zoom.pinch_update(1.5);
        assert!(zoom_eq(zoom.level(), 1.725));
        zoom.pinch_update(1.2);
        assert!(zoom_eq(zoom.level(), 1.38));
        zoom.pinch_end();
    }

    #[test]
    fn zoom_above_threshold_switches_overflow_and_blocks_page_gestures() {
        let mut zoom = ZoomController::default();
        assert_eq!(zoom.overflow_mode(), OverflowMode::Clipped);
        assert!(zoom.allows_page_gestures());

        zoom.zoom_in();
        assert_eq!(zoom.overflow_mode(), OverflowMode::Scrollable);
        assert!(!zoom.allows_page_gestures());

        assert!(zoom.reset());
        assert_eq!(zoom.level(), 1.0);
        assert!(zoom.allows_page_gestures());
    }
}
