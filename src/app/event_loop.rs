use std::time::{Duration, Instant};

use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::error::AppResult;
use crate::event::DomainEvent;
use crate::render::{LoaderEvent, PageKey, PageLoader};
use crate::ui::{
    UiLayout, draw_chrome, draw_failure_overlay, draw_loading_overlay, draw_nav_button,
    draw_swipe_hint, split_layout, viewport_px,
};
use crate::viewer::{LoadPhase, ViewerInput, ViewerOutcome};

use super::core::App;
use super::event_bus::EventBus;
use super::input::{InputAction, InputMapper};
use super::presenter::PagePresenter;
use super::terminal_session::{TerminalSession, TerminalSurface};
use super::timers::TimerSlots;

struct LoopRuntime {
    session: TerminalSession,
    presenter: PagePresenter,
    mapper: InputMapper,
    loader: PageLoader,
    timers: TimerSlots,
    tick: time::Interval,
    event_rx: UnboundedReceiver<DomainEvent>,
    event_bus: EventBus,
    ui_layout: UiLayout,
    needs_redraw: bool,
}

enum WaitEvent {
    Domain(DomainEvent),
    Loader(LoaderEvent),
    Tick,
    Closed,
}

enum LoopControl {
    Continue,
    Break,
}

impl App {
    pub async fn run(&mut self) -> AppResult<()> {
        let mut runtime = self.initialize_loop_runtime()?;
        let result = self.drive(&mut runtime).await;

        runtime.timers.clear();
        runtime.event_bus.shutdown();
        runtime.session.restore()?;
        result
    }

    fn initialize_loop_runtime(&mut self) -> AppResult<LoopRuntime> {
        let session = TerminalSession::enter()?;
        let presenter = PagePresenter::detect();
        let cell_px = presenter.cell_px();
        info!(
            protocol = presenter.protocol_label(),
            cell_width = cell_px.0,
            cell_height = cell_px.1,
            "viewer starting"
        );

        let (event_bus, event_rx) = EventBus::spawn();
        let timers = TimerSlots::new(event_bus.sender());
        let mut tick = time::interval(Duration::from_millis(self.config.engine.tick_ms));
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut runtime = LoopRuntime {
            session,
            presenter,
            mapper: InputMapper::new(&self.config.engine, cell_px),
            loader: self.new_loader(),
            timers,
            tick,
            event_rx,
            event_bus,
            ui_layout: empty_layout(),
            needs_redraw: true,
        };

        let size = runtime.session.size()?;
        let viewport = viewport_px(size.width, size.height, cell_px);
        let now = Instant::now();
        let resized = self.viewer.handle(
            ViewerInput::Resize {
                width: viewport.width,
                height: viewport.height,
            },
            now,
        );
        self.apply_outcome(&mut runtime, resized);
        let loaded = self.load_initial_source(now);
        self.apply_outcome(&mut runtime, loaded);

        Ok(runtime)
    }

    async fn drive(&mut self, runtime: &mut LoopRuntime) -> AppResult<()> {
        loop {
            self.ensure_current_page_requested(&mut runtime.loader);
            if runtime.needs_redraw {
                runtime.ui_layout = self.render_frame(
                    &mut runtime.session,
                    &mut runtime.presenter,
                    Instant::now(),
                )?;
                runtime.needs_redraw = false;
            }

            let waited = wait_next_event(
                &mut runtime.event_rx,
                &mut runtime.loader,
                &mut runtime.tick,
            )
            .await;
            if matches!(self.handle_waited_event(waited, runtime), LoopControl::Break) {
                return Ok(());
            }
        }
    }

    fn ensure_current_page_requested(&self, loader: &mut PageLoader) {
        let Some((key, locator)) = self.missing_current_page() else {
            return;
        };
        if loader.is_in_flight(&key) {
            return;
        }
        if loader.request(key, &locator) {
            debug!(page = key.page, generation = key.generation, "requested current page");
        }
    }

    fn handle_waited_event(&mut self, waited: WaitEvent, runtime: &mut LoopRuntime) -> LoopControl {
        let now = Instant::now();
        match waited {
            WaitEvent::Domain(DomainEvent::Input(event)) => {
                let actions = runtime.mapper.map(&event, &runtime.ui_layout, now);
                for action in actions {
                    match action {
                        InputAction::Quit => return LoopControl::Break,
                        InputAction::Viewer(input) => {
                            let outcome = self.viewer.handle(input, now);
                            self.apply_outcome(runtime, outcome);
                        }
                    }
                }
            }
            WaitEvent::Domain(DomainEvent::InputError(message)) => {
                warn!(error = %message, "terminal input error");
            }
            WaitEvent::Domain(DomainEvent::Timer { kind, token }) => {
                let outcome = self
                    .viewer
                    .handle(ViewerInput::TimerFired { kind, token }, now);
                self.apply_outcome(runtime, outcome);
            }
            WaitEvent::Loader(event) => {
                let outcome = self.apply_loader_event(event, now);
                self.apply_outcome(runtime, outcome);
            }
            WaitEvent::Tick => {
                let outcome = self.viewer.handle(ViewerInput::Tick, now);
                self.apply_outcome(runtime, outcome);
                // Keeps the spinner moving.
                if matches!(self.viewer.phase(), LoadPhase::Loading { .. }) {
                    runtime.needs_redraw = true;
                }
            }
            WaitEvent::Closed => return LoopControl::Break,
        }
        LoopControl::Continue
    }

    fn apply_outcome(&mut self, runtime: &mut LoopRuntime, outcome: ViewerOutcome) {
        for command in outcome.timers {
            runtime.timers.apply(command);
        }

        if let Some(generation) = self.absorb_events(&outcome.events) {
            runtime.presenter.retain_generation(generation);
            runtime.loader.open(generation, self.viewer.source());
        }

        for request in outcome.prefetch {
            let key = PageKey::new(self.viewer.generation(), request.page);
            if self.cache.contains(&key) || self.failed_pages.contains(&key) {
                continue;
            }
            runtime.loader.request(key, &request.locator);
        }

        if outcome.redraw {
            runtime.needs_redraw = true;
        }
    }

    /// Draws one frame and returns the layout used for hit testing.
    pub(crate) fn render_frame<S: TerminalSurface>(
        &mut self,
        surface: &mut S,
        presenter: &mut PagePresenter,
        now: Instant,
    ) -> AppResult<UiLayout> {
        let snapshot = self.viewer.snapshot();
        let key = PageKey::new(snapshot.generation, snapshot.current_page);
        let cell_px = presenter.cell_px();

        match self.cached_frame(&key) {
            Some(frame) if snapshot.page_count > 0 => {
                presenter.prepare(key, frame, snapshot.crop)?;
            }
            _ => presenter.clear_current(),
        }

        let source_label = self.source_label.clone();
        let mut ui_layout = empty_layout();
        let mut page_result = Ok(false);
        surface.draw(|frame| {
            let layout = split_layout(
                frame.area(),
                snapshot.show_nav_buttons,
                snapshot.render.layout,
                cell_px,
            );
            ui_layout = layout;

            page_result = presenter.render(frame, layout.page);

            if let Some(area) = layout.prev_button {
                draw_nav_button(frame, area, "<", snapshot.current_page > 0);
            }
            if let Some(area) = layout.next_button {
                draw_nav_button(
                    frame,
                    area,
                    ">",
                    snapshot.current_page + 1 < snapshot.page_count,
                );
            }

            match &snapshot.phase {
                LoadPhase::Loading { started_at } => draw_loading_overlay(
                    frame,
                    layout.book_area,
                    now.saturating_duration_since(*started_at).as_millis(),
                ),
                LoadPhase::Failed { message } => {
                    draw_failure_overlay(frame, layout.book_area, message)
                }
                LoadPhase::Idle | LoadPhase::Loaded => {}
            }
            if snapshot.hint_visible {
                draw_swipe_hint(frame, layout.page);
            }

            draw_chrome(frame, layout.status, &snapshot, &source_label);
        })?;

        page_result?;
        Ok(ui_layout)
    }
}

fn empty_layout() -> UiLayout {
    UiLayout {
        prev_button: None,
        book_area: Rect::default(),
        next_button: None,
        page: Rect::default(),
        status: Rect::default(),
    }
}

async fn wait_next_event(
    event_rx: &mut UnboundedReceiver<DomainEvent>,
    loader: &mut PageLoader,
    tick: &mut time::Interval,
) -> WaitEvent {
    tokio::select! {
        biased;
        maybe_event = event_rx.recv() => {
            match maybe_event {
                Some(event) => WaitEvent::Domain(event),
                None => WaitEvent::Closed,
            }
        },
        maybe_loaded = loader.recv() => {
            match maybe_loaded {
                Some(event) => WaitEvent::Loader(event),
                None => WaitEvent::Closed,
            }
        },
        _ = tick.tick() => WaitEvent::Tick,
    }
}
