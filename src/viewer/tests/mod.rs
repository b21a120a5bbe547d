
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::engine::page_book_factory;
use crate::viewport::ViewportSize;

use super::{TimerCommand, TimerKind, Viewer, ViewerOutcome};

const FLIPPING_TIME: Duration = Duration::from_millis(1000);

fn viewer(width: f32, height: f32, touch: bool) -> Viewer {
    Viewer::new(
        &Config::default(),
        ViewportSize::new(width, height),
        touch,
        page_book_factory(FLIPPING_TIME),
    )
}

fn scheduled(outcome: &ViewerOutcome, kind: TimerKind) -> Option<(u64, Instant)> {
    outcome.timers.iter().find_map(|command| match command {
        TimerCommand::Schedule {
            kind: scheduled,
            token,
            at,
        } if *scheduled == kind => Some((*token, *at)),
        _ => None,
    })
}

fn cancelled(outcome: &ViewerOutcome, kind: TimerKind) -> bool {
    outcome
        .timers
        .contains(&TimerCommand::Cancel(kind))
}
