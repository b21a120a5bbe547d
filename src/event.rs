use crossterm::event::Event;

use crate::viewer::TimerKind;

/// Describes *why* the current page changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavReason {
    /// Animated turn requested on desktop; the index moved optimistically.
    Step,
    /// Direct jump on touch layouts.
    Jump,
    /// The engine reported a settled page that differs from the optimistic one.
    Settled,
}

/// Observable viewer transitions, logged by the event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    PageChanged {
        from: usize,
        to: usize,
        reason: NavReason,
    },
    ZoomChanged {
        level: f32,
    },
    SourceReplaced {
        generation: u64,
        page_count: Option<usize>,
    },
    AspectRatioLocked {
        ratio: f32,
    },
    LoadingFinished {
        generation: u64,
    },
    LoadingFailed {
        generation: u64,
        message: String,
    },
    HintShown,
    HintHidden,
}

#[derive(Debug)]
pub(crate) enum DomainEvent {
    Input(Event),
    InputError(String),
    Timer { kind: TimerKind, token: u64 },
}
