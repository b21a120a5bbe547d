use std::time::{Duration, Instant};

use crate::viewport::DeviceClass;

/// One-time swipe hint. `Spent` is terminal for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SwipeHint {
    #[default]
    Pending,
    Visible {
        until: Instant,
    },
    Spent,
}

impl SwipeHint {
    pub fn is_visible(self) -> bool {
        matches!(self, Self::Visible { .. })
    }

    /// Shows the hint on touch layouts the first time the book is ready.
    pub fn on_loaded(&mut self, device: DeviceClass, now: Instant, duration: Duration) -> bool {
        if *self != Self::Pending || !device.is_mobile() {
            return false;
        }
        *self = Self::Visible {
            until: now + duration,
        };
        true
    }

    pub fn on_flip(&mut self) -> bool {
        self.spend()
    }

    pub fn on_timeout(&mut self, now: Instant) -> bool {
        match *self {
            Self::Visible { until } if now >= until => self.spend(),
            _ => false,
        }
    }

    fn spend(&mut self) -> bool {
        if !self.is_visible() {
            return false;
        }
        *self = Self::Spent;
        true
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::SwipeHint;
    use crate::viewport::DeviceClass;

    const HINT: Duration = Duration::from_millis(4000);

    #[test]
    fn hint_shows_once_on_mobile_and_expires() {
        let now = Instant::now();
        let mut hint = SwipeHint::default();

        assert!(hint.on_loaded(DeviceClass::Mobile, now, HINT));
        assert!(hint.is_visible());
        assert!(!hint.on_timeout(now + Duration::from_millis(3999)));
        assert!(hint.on_timeout(now + HINT));
        assert_eq!(hint, SwipeHint::Spent);

        assert!(!hint.on_loaded(DeviceClass::Mobile, now + HINT * 2, HINT));
        assert_eq!(hint, SwipeHint::Spent);
    }

    #[test]
    fn flip_dismisses_visible_hint() {
        let now = Instant::now();
        let mut hint = SwipeHint::default();
        assert!(!hint.on_flip());

        hint.on_loaded(DeviceClass::Mobile, now, HINT);
        assert!(hint.on_flip());
        assert_eq!(hint, SwipeHint::Spent);
        assert!(!hint.on_timeout(now + HINT));
    }

    #[test]
    fn desktop_never_shows_hint() {
        let mut hint = SwipeHint::default();
        assert!(!hint.on_loaded(DeviceClass::Desktop, Instant::now(), HINT));
        assert_eq!(hint, SwipeHint::Pending);
    }
}
