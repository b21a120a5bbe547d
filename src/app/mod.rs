mod core;
mod event_bus;
mod event_loop;
mod input;
mod presenter;
pub(crate) mod terminal_session;
mod timers;


pub use core::App;
