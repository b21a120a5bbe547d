use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::engine::EngineFactory;
use crate::event::{AppEvent, NavReason};
use crate::layout::{
    AspectRatio, BookLayout, LayoutParams, RenderSize, apply_zoom, compute_book_layout,
};
use crate::render::{CropRect, PrefetchWindow};
use crate::source::PageSource;
use crate::viewport::{DeviceClass, ViewportSize, ViewportTracker};
use crate::zoom::{WheelOutcome, ZoomController, zoom_eq};

use super::hint::SwipeHint;
use super::loading::{GateStep, LoadPhase, LoadingGate};
use super::nav::{NavDirection, NavOutcome, NavigationBridge};
use super::state::{
    PanOffset, TimerCommand, TimerKind, ViewerInput, ViewerOutcome, ViewerSnapshot,
};

/// Album viewer state machine. Every transition happens in [`Viewer::handle`];
/// layout and render size are derived on demand from the root signals.
pub struct Viewer {
    viewport: ViewportTracker,
    layout_params: LayoutParams,
    default_ratio: f32,
    aspect: AspectRatio,
    zoom: ZoomController,
    pan: PanOffset,
    nav: NavigationBridge,
    engine_factory: EngineFactory,
    source: PageSource,
    generation: u64,
    gate: LoadingGate,
    hint: SwipeHint,
    hint_duration: Duration,
    prefetch: PrefetchWindow,
    timers: HashMap<TimerKind, u64>,
    next_token: u64,
}

impl Viewer {
    pub fn new(
        config: &Config,
        viewport: ViewportSize,
        touch_capable: bool,
        engine_factory: EngineFactory,
    ) -> Self {
        Self {
            viewport: ViewportTracker::new(
                viewport,
                touch_capable,
                config.layout.mobile_breakpoint_px,
            ),
            layout_params: LayoutParams::from(&config.layout),
            default_ratio: config.layout.default_aspect_ratio,
            aspect: AspectRatio::Default(config.layout.default_aspect_ratio),
            zoom: ZoomController::new(config.zoom.clone()),
            pan: PanOffset::default(),
            nav: NavigationBridge::default(),
            engine_factory,
            source: PageSource::Images(Vec::new()),
            generation: 0,
            gate: LoadingGate::new(Duration::from_millis(config.loading.min_display_ms)),
            hint: SwipeHint::default(),
            hint_duration: Duration::from_millis(config.hint.display_ms),
            prefetch: PrefetchWindow::new(config.prefetch.radius),
            timers: HashMap::new(),
            next_token: 1,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn source(&self) -> &PageSource {
        &self.source
    }

    pub fn current_page(&self) -> usize {
        self.nav.current_page()
    }

    pub fn page_count(&self) -> usize {
        self.nav.page_count()
    }

    pub fn zoom(&self) -> &ZoomController {
        &self.zoom
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect
    }

    pub fn phase(&self) -> &LoadPhase {
        self.gate.phase()
    }

    pub fn settled_count(&self) -> usize {
        self.gate.settled_count()
    }

    pub fn hint(&self) -> SwipeHint {
        self.hint
    }

    pub fn prefetch(&self) -> &PrefetchWindow {
        &self.prefetch
    }

    pub fn pan(&self) -> PanOffset {
        self.pan
    }

    pub fn device_class(&self) -> DeviceClass {
        self.viewport.device_class()
    }

    /// Locator for `page`: one per page for images, the shared document otherwise.
    pub fn locator(&self, page: usize) -> Option<&str> {
        match &self.source {
            PageSource::Images(pages) => pages.get(page).map(String::as_str),
            PageSource::Document(locator) => Some(locator.as_str()),
        }
    }

    pub fn layout(&self) -> BookLayout {
        compute_book_layout(
            self.viewport.size(),
            self.viewport.device_class(),
            self.aspect.value(),
            self.layout_params,
        )
    }

    pub fn render_size(&self) -> RenderSize {
        apply_zoom(self.layout(), self.zoom.level())
    }

    /// Visible part of the zoomed page.
    pub fn crop(&self) -> CropRect {
        if !self.zoom.is_zoomed() {
            return CropRect::FULL;
        }
        let visible = (1.0 / self.zoom.level()).clamp(0.0, 1.0);
        let slack = 1.0 - visible;
        CropRect {
            x: self.pan.x * slack,
            y: self.pan.y * slack,
            width: visible,
            height: visible,
        }
    }

    pub fn snapshot(&self) -> ViewerSnapshot {
        let device = self.viewport.device_class();
        ViewerSnapshot {
            generation: self.generation,
            viewport: self.viewport.size(),
            device,
            render: self.render_size(),
            aspect_ratio: self.aspect,
            overflow: self.zoom.overflow_mode(),
            crop: self.crop(),
            current_page: self.nav.current_page(),
            page_count: self.nav.page_count(),
            is_flipping: self.nav.is_flipping(),
            phase: self.gate.phase().clone(),
            hint_visible: self.hint.is_visible(),
            show_nav_buttons: !device.is_mobile(),
        }
    }

    pub fn handle(&mut self, input: ViewerInput, now: Instant) -> ViewerOutcome {
        match input {
            ViewerInput::Resize { width, height } => {
                if self.viewport.resize(width, height) {
                    ViewerOutcome::redraw()
                } else {
                    ViewerOutcome::default()
                }
            }
            ViewerInput::ReplaceSource(source) => self.replace_source(source, now),
            ViewerInput::ImageSettled {
                generation,
                page,
                dimensions,
            } => self.image_settled(generation, page, dimensions, now),
            ViewerInput::DocumentLoaded {
                generation,
                page_count,
                dimensions,
            } => self.document_loaded(generation, page_count, dimensions, now),
            ViewerInput::DocumentFailed {
                generation,
                message,
            } => self.document_failed(generation, message),
            ViewerInput::ZoomIn => {
                let changed = self.zoom.zoom_in();
                self.zoom_outcome(changed)
            }
            ViewerInput::ZoomOut => {
                let changed = self.zoom.zoom_out();
                self.zoom_outcome(changed)
            }
            ViewerInput::ZoomReset | ViewerInput::DoubleClick => {
                let changed = self.zoom.reset();
                self.zoom_outcome(changed)
            }
            ViewerInput::Wheel { delta_y, modifier } => self.wheel(delta_y, modifier),
            ViewerInput::PinchStart => {
                self.zoom.pinch_start();
                ViewerOutcome::default()
            }
            ViewerInput::PinchUpdate(scale) => {
                let changed = self.zoom.pinch_update(scale);
                self.zoom_outcome(changed)
            }
            ViewerInput::PinchEnd => {
                self.zoom.pinch_end();
                ViewerOutcome::default()
            }
            ViewerInput::Next => self.navigate(NavDirection::Forward, now),
            ViewerInput::Prev => self.navigate(NavDirection::Backward, now),
            ViewerInput::Swipe(direction) => {
                if !self.zoom.allows_page_gestures() {
                    return ViewerOutcome::default();
                }
                self.navigate(direction, now)
            }
            ViewerInput::Pan { dx, dy } => self.pan_by(dx, dy),
            ViewerInput::TimerFired { kind, token } => self.timer_fired(kind, token, now),
            ViewerInput::Tick => self.tick(now),
        }
    }

    fn replace_source(&mut self, source: PageSource, now: Instant) -> ViewerOutcome {
        let mut outcome = ViewerOutcome::redraw();
        self.generation += 1;
        self.cancel_timer(TimerKind::SpinnerHide, &mut outcome);
        if self.cancel_timer(TimerKind::HintHide, &mut outcome) && self.hint.on_flip() {
            outcome.emit(AppEvent::HintHidden);
        }

        self.nav.unmount();
        self.aspect = AspectRatio::Default(self.default_ratio);
        self.pan = PanOffset::default();
        self.prefetch.reset();

        let known_count = if source.is_empty() {
            Some(0)
        } else {
            source.known_page_count()
        };
        self.source = source;
        self.gate.begin(known_count, now);
        if let Some(count) = known_count.filter(|count| *count > 0) {
            self.nav.mount((self.engine_factory)(count));
        }

        info!(
            generation = self.generation,
            pages = ?known_count,
            document = self.source.is_document(),
            "source list replaced"
        );
        outcome.emit(AppEvent::SourceReplaced {
            generation: self.generation,
            page_count: known_count,
        });
        self.plan_prefetch(&mut outcome);
        outcome
    }

    fn image_settled(
        &mut self,
        generation: u64,
        page: usize,
        dimensions: Option<(u32, u32)>,
        now: Instant,
    ) -> ViewerOutcome {
        let mut outcome = ViewerOutcome::default();
        if generation != self.generation {
            debug!(generation, page, "ignoring page from replaced source list");
            return outcome;
        }

        match dimensions {
            Some((width, height)) => {
                if self.aspect.observe(width, height) {
                    outcome.emit(AppEvent::AspectRatioLocked {
                        ratio: self.aspect.value(),
                    });
                }
            }
            None => warn!(page, "page failed to load; leaving it blank"),
        }
        outcome.redraw = true;

        let step = self.gate.settle(page, now);
        self.apply_gate_step(step, now, &mut outcome);
        outcome
    }

    fn document_loaded(
        &mut self,
        generation: u64,
        page_count: usize,
        dimensions: Option<(f32, f32)>,
        now: Instant,
    ) -> ViewerOutcome {
        if generation != self.generation || self.nav.is_mounted() {
            return ViewerOutcome::default();
        }
        let mut outcome = ViewerOutcome::redraw();

        if page_count > 0 {
            self.nav.mount((self.engine_factory)(page_count));
        }
        let locked = dimensions.is_some_and(|(width, height)| {
            self.aspect
                .observe(width.round() as u32, height.round() as u32)
        });
        if locked {
            outcome.emit(AppEvent::AspectRatioLocked {
                ratio: self.aspect.value(),
            });
        }

        let step = self.gate.set_total(page_count, now);
        self.apply_gate_step(step, now, &mut outcome);
        outcome
    }

    fn document_failed(&mut self, generation: u64, message: String) -> ViewerOutcome {
        let mut outcome = ViewerOutcome::default();
        if generation != self.generation || !self.gate.fail(message.clone()) {
            return outcome;
        }
        warn!(generation, %message, "document failed to load");
        self.cancel_timer(TimerKind::SpinnerHide, &mut outcome);
        outcome.emit(AppEvent::LoadingFailed {
            generation,
            message,
        });
        outcome
    }

    fn apply_gate_step(&mut self, step: GateStep, now: Instant, outcome: &mut ViewerOutcome) {
        match step {
            GateStep::Pending => {}
            GateStep::ReadyAt(at) => {
                if !self.timers.contains_key(&TimerKind::SpinnerHide) {
                    self.schedule_timer(TimerKind::SpinnerHide, at, outcome);
                }
            }
            GateStep::Finished => {
                self.cancel_timer(TimerKind::SpinnerHide, outcome);
                self.finish_loading(now, outcome);
            }
        }
    }

    fn finish_loading(&mut self, now: Instant, outcome: &mut ViewerOutcome) {
        info!(generation = self.generation, "album loaded");
        outcome.emit(AppEvent::LoadingFinished {
            generation: self.generation,
        });

        if self
            .hint
            .on_loaded(self.viewport.device_class(), now, self.hint_duration)
        {
            self.schedule_timer(TimerKind::HintHide, now + self.hint_duration, outcome);
            info!("swipe hint shown");
            outcome.emit(AppEvent::HintShown);
        }
    }

    fn zoom_outcome(&mut self, changed: bool) -> ViewerOutcome {
        let mut outcome = ViewerOutcome::default();
        if !changed {
            return outcome;
        }
        if !self.zoom.is_zoomed() {
            self.pan = PanOffset::default();
        }
        outcome.emit(AppEvent::ZoomChanged {
            level: self.zoom.level(),
        });
        outcome
    }

    fn wheel(&mut self, delta_y: f32, modifier: bool) -> ViewerOutcome {
        let before = self.zoom.level();
        match self.zoom.wheel(delta_y, modifier) {
            WheelOutcome::Zoomed => {
                let changed = !zoom_eq(before, self.zoom.level());
                self.zoom_outcome(changed)
            }
            // Plain wheel scrolls the zoomed page and is inert otherwise.
            WheelOutcome::PassThrough => self.pan_by(0.0, delta_y),
        }
    }

    /// Scrolls the zoomed page by pixel deltas.
    fn pan_by(&mut self, dx: f32, dy: f32) -> ViewerOutcome {
        if !self.zoom.is_zoomed() {
            return ViewerOutcome::default();
        }
        let render = self.render_size();
        let slack_x = render.width - render.layout.width;
        let slack_y = render.height - render.layout.height;
        let before = self.pan;
        if slack_x > 0.0 && dx.is_finite() {
            self.pan.x = (self.pan.x + dx / slack_x).clamp(0.0, 1.0);
        }
        if slack_y > 0.0 && dy.is_finite() {
            self.pan.y = (self.pan.y + dy / slack_y).clamp(0.0, 1.0);
        }
        if self.pan == before {
            return ViewerOutcome::default();
        }
        ViewerOutcome::redraw()
    }

    fn navigate(&mut self, direction: NavDirection, now: Instant) -> ViewerOutcome {
        let mut outcome = ViewerOutcome::default();
        let from = self.nav.current_page();
        let device = self.viewport.device_class();
        let result = match direction {
            NavDirection::Forward => self.nav.next(device, now),
            NavDirection::Backward => self.nav.prev(device, now),
        };

        match result {
            NavOutcome::Ignored | NavOutcome::Unchanged => return outcome,
            NavOutcome::Animating { target } => {
                outcome.emit(AppEvent::PageChanged {
                    from,
                    to: target,
                    reason: NavReason::Step,
                });
            }
            NavOutcome::Jumped { target } => {
                outcome.emit(AppEvent::PageChanged {
                    from,
                    to: target,
                    reason: NavReason::Jump,
                });
                // Direct jumps never raise a flip event, so they count as one here.
                self.dismiss_hint(&mut outcome);
            }
        }
        self.plan_prefetch(&mut outcome);
        outcome
    }

    fn tick(&mut self, now: Instant) -> ViewerOutcome {
        let mut outcome = ViewerOutcome::default();
        let flipping = self.nav.is_flipping();
        let before = self.nav.current_page();
        if let Some(event) = self.nav.poll(now) {
            debug!(page = event.page, "page turn settled");
            self.dismiss_hint(&mut outcome);
            let after = self.nav.current_page();
            if after != before {
                outcome.emit(AppEvent::PageChanged {
                    from: before,
                    to: after,
                    reason: NavReason::Settled,
                });
                self.plan_prefetch(&mut outcome);
            }
        }
        outcome.redraw |= flipping;
        outcome
    }

    fn timer_fired(&mut self, kind: TimerKind, token: u64, now: Instant) -> ViewerOutcome {
        let mut outcome = ViewerOutcome::default();
        if self.timers.get(&kind) != Some(&token) {
            debug!(?kind, token, "ignoring stale timer");
            return outcome;
        }
        self.timers.remove(&kind);

        match kind {
            TimerKind::SpinnerHide => {
                let step = self.gate.poll(now);
                self.apply_gate_step(step, now, &mut outcome);
            }
            TimerKind::HintHide => {
                if self.hint.on_timeout(now) {
                    outcome.emit(AppEvent::HintHidden);
                } else if let SwipeHint::Visible { until } = self.hint {
                    self.schedule_timer(TimerKind::HintHide, until, &mut outcome);
                }
            }
        }
        outcome
    }

    fn dismiss_hint(&mut self, outcome: &mut ViewerOutcome) {
        if self.hint.on_flip() {
            self.cancel_timer(TimerKind::HintHide, outcome);
            outcome.emit(AppEvent::HintHidden);
        }
    }

    fn plan_prefetch(&mut self, outcome: &mut ViewerOutcome) {
        if let PageSource::Images(pages) = &self.source {
            let requests = self.prefetch.plan(self.nav.current_page(), pages);
            outcome.prefetch.extend(requests);
        }
    }

    fn schedule_timer(&mut self, kind: TimerKind, at: Instant, outcome: &mut ViewerOutcome) {
        let token = self.next_token;
        self.next_token += 1;
        self.timers.insert(kind, token);
        outcome
            .timers
            .push(TimerCommand::Schedule { kind, token, at });
    }

    fn cancel_timer(&mut self, kind: TimerKind, outcome: &mut ViewerOutcome) -> bool {
        if self.timers.remove(&kind).is_none() {
            return false;
        }
        outcome.timers.push(TimerCommand::Cancel(kind));
        true
    }
}
