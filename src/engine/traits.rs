use std::time::Instant;

/// Reported by an engine once a page turn has settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlipEvent {
    pub page: usize,
}

/// Imperative surface of a mounted flip-book engine.
pub trait FlipEngine: Send {
    fn page_count(&self) -> usize;
    fn current_page(&self) -> usize;
    /// Starts an animated turn forward. Ignored while another turn is running.
    fn flip_next(&mut self, now: Instant);
    fn flip_prev(&mut self, now: Instant);
    /// Jumps without animation.
    fn turn_to_page(&mut self, page: usize);
    fn is_flipping(&self) -> bool;
    /// Returns the completion of a turn whose animation has finished by `now`.
    fn poll_flip(&mut self, now: Instant) -> Option<FlipEvent>;
}
