use std::collections::HashSet;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadPhase {
    /// Nothing to load; the source list is empty.
    Idle,
    Loading { started_at: Instant },
    Loaded,
    Failed { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStep {
    Pending,
    /// Enough pages settled; the spinner may hide once `Instant` is reached.
    ReadyAt(Instant),
    Finished,
}

/// Spinner gate: ready once `min(1, total)` pages settled and the minimum
/// display time has passed, whichever is later.
#[derive(Debug, Clone)]
pub struct LoadingGate {
    phase: LoadPhase,
    settled: HashSet<usize>,
    total: Option<usize>,
    min_display: Duration,
}

impl LoadingGate {
    pub fn new(min_display: Duration) -> Self {
        Self {
            phase: LoadPhase::Idle,
            settled: HashSet::new(),
            total: None,
            min_display,
        }
    }

    pub fn phase(&self) -> &LoadPhase {
        &self.phase
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, LoadPhase::Loading { .. })
    }

    pub fn settled_count(&self) -> usize {
        self.settled.len()
    }

    pub fn required_count(&self) -> Option<usize> {
        self.total.map(|total| total.min(1))
    }

    /// Restarts the gate for a new source list. `total` is `None` while a
    /// document has not reported its page count yet.
    pub fn begin(&mut self, total: Option<usize>, now: Instant) {
        self.settled.clear();
        self.total = total;
        self.phase = if total == Some(0) {
            LoadPhase::Idle
        } else {
            LoadPhase::Loading { started_at: now }
        };
    }

    pub fn set_total(&mut self, total: usize, now: Instant) -> GateStep {
        self.total = Some(total);
        self.evaluate(now)
    }

    /// Counts a finished load, successful or not.
    pub fn settle(&mut self, page: usize, now: Instant) -> GateStep {
        if !self.is_loading() {
            return GateStep::Pending;
        }
        self.settled.insert(page);
        self.evaluate(now)
    }

    pub fn poll(&mut self, now: Instant) -> GateStep {
        self.evaluate(now)
    }

    pub fn fail(&mut self, message: impl Into<String>) -> bool {
        if !self.is_loading() {
            return false;
        }
        self.phase = LoadPhase::Failed {
            message: message.into(),
        };
        true
    }

    fn evaluate(&mut self, now: Instant) -> GateStep {
        let LoadPhase::Loading { started_at } = self.phase else {
            return GateStep::Pending;
        };
        let Some(required) = self.required_count() else {
            return GateStep::Pending;
        };
        if self.settled.len() < required {
            return GateStep::Pending;
        }

        let ready_at = started_at + self.min_display;
        if now < ready_at {
            return GateStep::ReadyAt(ready_at);
        }
        self.phase = LoadPhase::Loaded;
        GateStep::Finished
    }
}
