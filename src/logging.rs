use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::LogConfig;
use crate::error::{AppError, AppResult};

const DEFAULT_LOG_FILE: &str = "flipbook.log";

/// Where log lines go. The terminal viewer owns the screen, so it logs to a
/// file; the server logs to stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSink {
    Stderr,
    File,
}

/// `RUST_LOG` wins over the configured level.
pub fn build_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

pub fn log_file_path(config: &LogConfig) -> PathBuf {
    config
        .file
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_FILE))
}

/// Installs the global subscriber. A second call is a no-op.
pub fn init_tracing(config: &LogConfig, sink: LogSink) -> AppResult<()> {
    let filter = build_filter(config);
    let layer = fmt::layer().with_target(true);

    let installed = match sink {
        LogSink::Stderr => tracing_subscriber::registry()
            .with(filter)
            .with(layer.with_writer(std::io::stderr))
            .try_init(),
        LogSink::File => {
            let file = open_log_file(&log_file_path(config))?;
            tracing_subscriber::registry()
                .with(filter)
                .with(layer.with_ansi(false).with_writer(Mutex::new(file)))
                .try_init()
        }
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
    Ok(())
}

fn open_log_file(path: &PathBuf) -> AppResult<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|err| {
            AppError::io_with_context(err, format!("failed to create {}", parent.display()))
        })?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| AppError::io_with_context(err, format!("failed to open {}", path.display())))
}
