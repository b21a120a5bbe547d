use std::time::{Duration, Instant};

use super::traits::{FlipEngine, FlipEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingTurn {
    target: usize,
    settles_at: Instant,
}

/// Single-page book whose animated turns settle after a fixed flipping time.
#[derive(Debug, Clone)]
pub struct PageBook {
    page_count: usize,
    current: usize,
    flipping_time: Duration,
    pending: Option<PendingTurn>,
}

impl PageBook {
    pub fn new(page_count: usize, flipping_time: Duration) -> Self {
        Self {
            page_count,
            current: 0,
            flipping_time,
            pending: None,
        }
    }

    /// Page the running turn is heading to, if any.
    pub fn turning_to(&self) -> Option<usize> {
        self.pending.map(|pending| pending.target)
    }

    fn start_turn(&mut self, target: usize, now: Instant) {
        if self.pending.is_some() || target == self.current {
            return;
        }
        self.pending = Some(PendingTurn {
            target,
            settles_at: now + self.flipping_time,
        });
    }
}

impl FlipEngine for PageBook {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn current_page(&self) -> usize {
        self.current
    }

    fn flip_next(&mut self, now: Instant) {
        if self.current + 1 >= self.page_count {
            return;
        }
        self.start_turn(self.current + 1, now);
    }

    fn flip_prev(&mut self, now: Instant) {
        if self.current == 0 {
            return;
        }
        self.start_turn(self.current - 1, now);
    }

    fn turn_to_page(&mut self, page: usize) {
        if self.page_count == 0 {
            return;
        }
        self.pending = None;
        self.current = page.min(self.page_count - 1);
    }

    fn is_flipping(&self) -> bool {
        self.pending.is_some()
    }

    fn poll_flip(&mut self, now: Instant) -> Option<FlipEvent> {
        let pending = self.pending?;
        if now < pending.settles_at {
            return None;
        }
        self.pending = None;
        self.current = pending.target;
        Some(FlipEvent {
            page: self.current,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::PageBook;
    use crate::engine::{FlipEngine, FlipEvent};

    #[test]
    fn animated_turn_settles_after_flipping_time() {
        let start = Instant::now();
        let mut book = PageBook::new(4, Duration::from_millis(1000));

        book.flip_next(start);
        assert!(book.is_flipping());
        assert_eq!(book.turning_to(), Some(1));
        assert_eq!(book.poll_flip(start + Duration::from_millis(999)), None);
        assert_eq!(book.current_page(), 0);

        assert_eq!(
            book.poll_flip(start + Duration::from_millis(1000)),
            Some(FlipEvent { page: 1 })
        );
        assert_eq!(book.current_page(), 1);
        assert!(!book.is_flipping());
    }

    #[test]
    fn turns_are_ignored_while_flipping_or_at_edges() {
        let start = Instant::now();
        let mut book = PageBook::new(2, Duration::from_millis(10));

        book.flip_prev(start);
        assert!(!book.is_flipping());

        book.flip_next(start);
        book.flip_next(start);
        assert_eq!(book.turning_to(), Some(1));
        book.poll_flip(start + Duration::from_millis(10));

        book.flip_next(start + Duration::from_millis(20));
        assert!(!book.is_flipping());
        assert_eq!(book.current_page(), 1);
    }

    #[test]
    fn direct_turn_cancels_animation_and_clamps() {
        let start = Instant::now();
        let mut book = PageBook::new(5, Duration::from_millis(10));
        book.flip_next(start);

        book.turn_to_page(99);
        assert_eq!(book.current_page(), 4);
        assert_eq!(book.poll_flip(start + Duration::from_secs(1)), None);
    }
}
