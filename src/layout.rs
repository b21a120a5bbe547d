use crate::config::LayoutConfig;
use crate::viewport::{DeviceClass, ViewportSize};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    pub desktop_width: f32,
    pub control_reserve: f32,
    pub height_fraction: f32,
}

impl From<&LayoutConfig> for LayoutParams {
    fn from(config: &LayoutConfig) -> Self {
        Self {
            desktop_width: config.desktop_width_px,
            control_reserve: config.control_reserve_px,
            height_fraction: config.height_fraction,
        }
    }
}

/// Height/width ratio of a page. Starts at a configured default and is locked
/// by the first page image that reports real dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AspectRatio {
    Default(f32),
    Locked(f32),
}

impl AspectRatio {
    pub fn value(self) -> f32 {
        match self {
            Self::Default(ratio) | Self::Locked(ratio) => ratio,
        }
    }

    pub fn is_locked(self) -> bool {
        matches!(self, Self::Locked(_))
    }

    /// Locks to `height / width` unless already locked. Returns whether it locked.
    pub fn observe(&mut self, width: u32, height: u32) -> bool {
        if self.is_locked() || width == 0 || height == 0 {
            return false;
        }
        *self = Self::Locked(height as f32 / width as f32);
        true
    }
}

/// Fitted book size in viewport pixels, before zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BookLayout {
    pub width: f32,
    pub height: f32,
    pub fit_scale: f32,
}

/// Pixel footprint after the zoom transform. Navigation hit-testing keeps using
/// the fitted [`BookLayout`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSize {
    pub layout: BookLayout,
    pub zoom: f32,
    pub width: f32,
    pub height: f32,
}

pub fn compute_book_layout(
    viewport: ViewportSize,
    device: DeviceClass,
    aspect_ratio: f32,
    params: LayoutParams,
) -> BookLayout {
    let width = match device {
        DeviceClass::Mobile => viewport.width.max(0.0),
        DeviceClass::Desktop => params.desktop_width,
    };
    let height = width * aspect_ratio;

    let max_height = viewport.height * params.height_fraction - params.control_reserve;
    let fit_scale = if !max_height.is_finite() || max_height <= 0.0 || height <= 0.0 {
        1.0
    } else if height > max_height {
        max_height / height
    } else {
        1.0
    };

    BookLayout {
        width: width * fit_scale,
        height: height * fit_scale,
        fit_scale,
    }
}

pub fn apply_zoom(layout: BookLayout, zoom: f32) -> RenderSize {
    RenderSize {
        layout,
        zoom,
        width: layout.width * zoom,
        height: layout.height * zoom,
    }
}

#[cfg(test)]
mod tests {
    use crate::config::LayoutConfig;
    use crate::viewport::{DeviceClass, ViewportSize};

    use super::{AspectRatio, LayoutParams, apply_zoom, compute_book_layout};

    fn params() -> LayoutParams {
        LayoutParams::from(&LayoutConfig::default())
    }

    #[test]
    fn desktop_layout_uses_base_width_without_rescale() {
        let layout = compute_book_layout(
            ViewportSize::new(1920.0, 1080.0),
            DeviceClass::Desktop,
            709.0 / 500.0,
            params(),
        );
        assert_eq!(layout.width, 620.0);
        assert!((layout.height - 620.0 * 709.0 / 500.0).abs() < 0.01);
        assert!(layout.height <= 1080.0 * 0.9 - 72.0);
        assert_eq!(layout.fit_scale, 1.0);
    }

    #[test]
    fn short_viewport_scales_both_dimensions_to_fit_height() {
        let layout = compute_book_layout(
            ViewportSize::new(1280.0, 600.0),
            DeviceClass::Desktop,
            709.0 / 500.0,
            params(),
        );
        let max_height = 600.0 * 0.9 - 72.0;
        assert!((layout.height - max_height).abs() < 0.01);
        assert!((layout.height / layout.width - 709.0 / 500.0).abs() < 0.0001);
        assert!(layout.fit_scale < 1.0);
    }

    #[test]
    fn mobile_layout_spans_viewport_width() {
        let layout = compute_book_layout(
            ViewportSize::new(390.0, 844.0),
            DeviceClass::Mobile,
            1.5,
            params(),
        );
        assert_eq!(layout.width, 390.0);
        assert_eq!(layout.height, 585.0);
    }

    #[test]
    fn non_positive_height_budget_means_no_constraint() {
        let layout = compute_book_layout(
            ViewportSize::new(1000.0, 50.0),
            DeviceClass::Desktop,
            1.4,
            params(),
        );
        assert_eq!(layout.fit_scale, 1.0);
        assert_eq!(layout.width, 620.0);
    }

    #[test]
    fn zoom_scales_footprint_but_not_fitted_layout() {
        let layout = compute_book_layout(
            ViewportSize::new(1920.0, 1080.0),
            DeviceClass::Desktop,
            1.0,
            params(),
        );
        let render = apply_zoom(layout, 2.0);
        assert_eq!(render.width, 1240.0);
        assert_eq!(render.layout, layout);
    }

    #[test]
    fn aspect_ratio_locks_once() {
        let mut ratio = AspectRatio::Default(1.418);
        assert!(!ratio.observe(0, 100));
        assert!(!ratio.is_locked());

        assert!(ratio.observe(1000, 1500));
        assert_eq!(ratio.value(), 1.5);
        assert!(!ratio.observe(500, 500));
        assert_eq!(ratio, AspectRatio::Locked(1.5));
    }
}
