mod core;
mod hint;
mod loading;
mod nav;
mod state;

#[cfg(test)]
mod tests;

pub use core::Viewer;
pub use hint::SwipeHint;
pub use loading::{GateStep, LoadPhase, LoadingGate};
pub use nav::{NavDirection, NavOutcome, NavigationBridge};
pub use state::{
    PanOffset, TimerCommand, TimerKind, ViewerInput, ViewerOutcome, ViewerSnapshot,
};
