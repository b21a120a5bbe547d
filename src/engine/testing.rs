use std::sync::{Arc, Mutex};
use std::time::Instant;

use super::traits::{FlipEngine, FlipEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EngineCall {
    FlipNext,
    FlipPrev,
    TurnToPage(usize),
}

/// Engine double that records calls and settles turns only when told to.
pub(crate) struct RecordingEngine {
    page_count: usize,
    current: usize,
    pending: Option<usize>,
    calls: Arc<Mutex<Vec<EngineCall>>>,
}

impl RecordingEngine {
    pub(crate) fn new(page_count: usize) -> (Self, Arc<Mutex<Vec<EngineCall>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                page_count,
                current: 0,
                pending: None,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }

    fn record(&self, call: EngineCall) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

impl FlipEngine for RecordingEngine {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn current_page(&self) -> usize {
        self.current
    }

    fn flip_next(&mut self, _now: Instant) {
        self.record(EngineCall::FlipNext);
        if self.current + 1 < self.page_count {
            self.pending = Some(self.current + 1);
        }
    }

    fn flip_prev(&mut self, _now: Instant) {
        self.record(EngineCall::FlipPrev);
        if self.current > 0 {
            self.pending = Some(self.current - 1);
        }
    }

    fn turn_to_page(&mut self, page: usize) {
        self.record(EngineCall::TurnToPage(page));
        self.current = page;
        self.pending = None;
    }

    fn is_flipping(&self) -> bool {
        self.pending.is_some()
    }

    fn poll_flip(&mut self, _now: Instant) -> Option<FlipEvent> {
        let page = self.pending.take()?;
        self.current = page;
        Some(FlipEvent { page })
    }
}
