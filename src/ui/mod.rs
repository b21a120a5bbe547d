mod chrome;
mod layout;
mod overlay;

pub use chrome::{draw_chrome, status_text};
pub use layout::{HitTarget, NAV_BUTTON_WIDTH, UiLayout, hit_test, split_layout, viewport_px};
pub use overlay::{
    draw_failure_overlay, draw_loading_overlay, draw_nav_button, draw_swipe_hint, spinner_frame,
};
