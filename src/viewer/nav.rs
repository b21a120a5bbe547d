use std::time::Instant;

use crate::engine::{FlipEngine, FlipEvent};
use crate::viewport::DeviceClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// No engine mounted yet.
    Ignored,
    /// Already at the first or last page.
    Unchanged,
    /// Animated turn requested; `current_page` was updated optimistically.
    Animating { target: usize },
    /// Direct jump on touch layouts.
    Jumped { target: usize },
}

/// Forwards page-turn intents to the mounted engine.
#[derive(Default)]
pub struct NavigationBridge {
    engine: Option<Box<dyn FlipEngine>>,
    current_page: usize,
}

impl NavigationBridge {
    pub fn mount(&mut self, engine: Box<dyn FlipEngine>) {
        self.current_page = engine.current_page();
        self.engine = Some(engine);
    }

    pub fn unmount(&mut self) {
        self.engine = None;
        self.current_page = 0;
    }

    pub fn is_mounted(&self) -> bool {
        self.engine.is_some()
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_count(&self) -> usize {
        self.engine.as_ref().map_or(0, |engine| engine.page_count())
    }

    pub fn is_flipping(&self) -> bool {
        self.engine.as_ref().is_some_and(|engine| engine.is_flipping())
    }

    pub fn next(&mut self, device: DeviceClass, now: Instant) -> NavOutcome {
        self.step(NavDirection::Forward, device, now)
    }

    pub fn prev(&mut self, device: DeviceClass, now: Instant) -> NavOutcome {
        self.step(NavDirection::Backward, device, now)
    }

    fn step(&mut self, dir: NavDirection, device: DeviceClass, now: Instant) -> NavOutcome {
        let Some(engine) = self.engine.as_mut() else {
            return NavOutcome::Ignored;
        };
        let page_count = engine.page_count();
        if page_count == 0 {
            return NavOutcome::Ignored;
        }

        let last = page_count - 1;
        let target = match dir {
            NavDirection::Forward => self.current_page.saturating_add(1).min(last),
            NavDirection::Backward => self.current_page.saturating_sub(1),
        };

        if device.is_mobile() {
            if target == self.current_page {
                return NavOutcome::Unchanged;
            }
            engine.turn_to_page(target);
            self.current_page = target;
            return NavOutcome::Jumped { target };
        }

        match dir {
            NavDirection::Forward => engine.flip_next(now),
            NavDirection::Backward => engine.flip_prev(now),
        }
        if target == self.current_page {
            return NavOutcome::Unchanged;
        }
        self.current_page = target;
        NavOutcome::Animating { target }
    }

    /// Pulls a settled turn from the engine and reconciles the page index.
    pub fn poll(&mut self, now: Instant) -> Option<FlipEvent> {
        let event = self.engine.as_mut()?.poll_flip(now)?;
        self.reconcile(event);
        Some(event)
    }

    pub fn reconcile(&mut self, event: FlipEvent) {
        let page_count = self.page_count();
        if page_count == 0 {
            return;
        }
        self.current_page = event.page.min(page_count - 1);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::{NavOutcome, NavigationBridge};
    use crate::engine::FlipEvent;
    use crate::engine::testing::{EngineCall, RecordingEngine};
    use crate::viewport::DeviceClass;

    #[test]
    fn unmounted_bridge_is_a_noop() {
        let mut nav = NavigationBridge::default();
        assert_eq!(nav.next(DeviceClass::Desktop, Instant::now()), NavOutcome::Ignored);
        assert_eq!(nav.prev(DeviceClass::Mobile, Instant::now()), NavOutcome::Ignored);
        assert_eq!(nav.current_page(), 0);
        assert!(nav.poll(Instant::now()).is_none());
    }

    #[test]
    fn desktop_animates_with_optimistic_update_then_reconciles() {
        let (engine, calls) = RecordingEngine::new(24);
        let mut nav = NavigationBridge::default();
        nav.mount(Box::new(engine));

        let now = Instant::now();
        assert_eq!(
            nav.next(DeviceClass::Desktop, now),
            NavOutcome::Animating { target: 1 }
        );
        assert_eq!(nav.current_page(), 1);
        assert_eq!(nav.poll(now), Some(FlipEvent { page: 1 }));
        assert_eq!(nav.current_page(), 1);
        assert_eq!(*calls.lock().expect("calls lock"), vec![EngineCall::FlipNext]);
    }

    #[test]
    fn mobile_jumps_directly() {
        let (engine, calls) = RecordingEngine::new(24);
        let mut nav = NavigationBridge::default();
        nav.mount(Box::new(engine));

        let now = Instant::now();
        assert_eq!(nav.next(DeviceClass::Mobile, now), NavOutcome::Jumped { target: 1 });
        assert_eq!(nav.prev(DeviceClass::Mobile, now), NavOutcome::Jumped { target: 0 });
        assert_eq!(nav.prev(DeviceClass::Mobile, now), NavOutcome::Unchanged);
        assert_eq!(
            *calls.lock().expect("calls lock"),
            vec![EngineCall::TurnToPage(1), EngineCall::TurnToPage(0)]
        );
    }

    #[test]
    fn optimistic_index_is_clamped_to_last_page() {
        let (engine, _calls) = RecordingEngine::new(2);
        let mut nav = NavigationBridge::default();
        nav.mount(Box::new(engine));

        let now = Instant::now();
        nav.next(DeviceClass::Desktop, now);
        nav.poll(now);
        assert_eq!(nav.next(DeviceClass::Desktop, now), NavOutcome::Unchanged);
        assert_eq!(nav.current_page(), 1);
    }
}
