pub mod app;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod event;
pub mod layout;
pub mod logging;
pub mod render;
pub mod server;
pub mod source;
pub mod ui;
pub mod viewer;
pub mod viewport;
pub mod zoom;
