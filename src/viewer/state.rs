use std::time::Instant;

use crate::event::AppEvent;
use crate::layout::{AspectRatio, RenderSize};
use crate::render::{CropRect, PrefetchRequest};
use crate::source::PageSource;
use crate::viewport::{DeviceClass, ViewportSize};
use crate::zoom::OverflowMode;

use super::loading::LoadPhase;
use super::nav::NavDirection;

/// Everything that can move the viewer from one state to the next.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerInput {
    Resize {
        width: f32,
        height: f32,
    },
    ReplaceSource(PageSource),
    /// A page finished loading, successfully (`dimensions` set) or not.
    ImageSettled {
        generation: u64,
        page: usize,
        dimensions: Option<(u32, u32)>,
    },
    DocumentLoaded {
        generation: u64,
        page_count: usize,
        dimensions: Option<(f32, f32)>,
    },
    DocumentFailed {
        generation: u64,
        message: String,
    },
    ZoomIn,
    ZoomOut,
    ZoomReset,
    Wheel {
        delta_y: f32,
        modifier: bool,
    },
    PinchStart,
    PinchUpdate(f32),
    PinchEnd,
    DoubleClick,
    /// Nav button or key.
    Next,
    Prev,
    /// Pointer gesture on the page; suppressed while zoomed.
    Swipe(NavDirection),
    Pan {
        dx: f32,
        dy: f32,
    },
    TimerFired {
        kind: TimerKind,
        token: u64,
    },
    /// Animation clock; settles running page turns.
    Tick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    SpinnerHide,
    HintHide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    Schedule {
        kind: TimerKind,
        token: u64,
        at: Instant,
    },
    Cancel(TimerKind),
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ViewerOutcome {
    pub redraw: bool,
    pub timers: Vec<TimerCommand>,
    pub prefetch: Vec<PrefetchRequest>,
    pub events: Vec<AppEvent>,
}

impl ViewerOutcome {
    pub(crate) fn redraw() -> Self {
        Self {
            redraw: true,
            ..Self::default()
        }
    }

    pub(crate) fn emit(&mut self, event: AppEvent) {
        self.redraw = true;
        self.events.push(event);
    }

    pub fn is_noop(&self) -> bool {
        !self.redraw && self.timers.is_empty() && self.prefetch.is_empty() && self.events.is_empty()
    }
}

/// Scroll position inside the zoomed footprint, each axis in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanOffset {
    pub x: f32,
    pub y: f32,
}

impl PanOffset {
    pub const CENTER: Self = Self { x: 0.5, y: 0.5 };
}

impl Default for PanOffset {
    fn default() -> Self {
        Self::CENTER
    }
}

/// Read-only view of the viewer for drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerSnapshot {
    pub generation: u64,
    pub viewport: ViewportSize,
    pub device: DeviceClass,
    pub render: RenderSize,
    pub aspect_ratio: AspectRatio,
    pub overflow: OverflowMode,
    pub crop: CropRect,
    pub current_page: usize,
    pub page_count: usize,
    pub is_flipping: bool,
    pub phase: LoadPhase,
    pub hint_visible: bool,
    /// Side nav buttons are desktop-only.
    pub show_nav_buttons: bool,
}
