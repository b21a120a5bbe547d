use std::path::PathBuf;

use clap::{Parser, Subcommand};

use flipbook::app::App;
use flipbook::config::Config;
use flipbook::error::AppResult;
use flipbook::logging::{LogSink, init_tracing};
use flipbook::server::serve;
use flipbook::source::{is_remote_locator, resolve_source};

#[derive(Debug, Parser)]
#[command(name = "flipbook")]
#[command(about = "Flip-book album viewer and album proxy", long_about = None)]
struct Cli {
    /// Config file; defaults to the user config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
enum Command {
    /// Open an image directory, a PDF file or a PDF URL in the terminal
    View {
        /// Defaults to the configured album URL
        source: Option<String>,
        /// Behave like a touch device: no nav buttons, direct page jumps below the breakpoint
        #[arg(long)]
        touch: bool,
    },
    /// Serve /api/album and the static page assets
    Serve {
        #[arg(long)]
        bind: Option<String>,
        #[arg(long)]
        static_root: Option<PathBuf>,
        #[arg(long)]
        upstream: Option<String>,
    },
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Command::View { source, touch } => {
            init_tracing(&config.log, LogSink::File)?;
            let locator = source.unwrap_or_else(|| config.album.upstream_url.clone());
            let page_source = resolve_source(&locator)?;
            let label = source_label(&locator);
            let mut app = App::new(config, page_source, label, touch);
            app.run().await
        }
        Command::Serve {
            bind,
            static_root,
            upstream,
        } => {
            if let Some(bind) = bind {
                config.album.bind = bind;
            }
            if let Some(static_root) = static_root {
                config.album.static_root = static_root;
            }
            if let Some(upstream) = upstream {
                config.album.upstream_url = upstream;
            }
            init_tracing(&config.log, LogSink::Stderr)?;
            serve(&config.album).await
        }
    }
}

/// Short name for the status bar: the last path or URL segment.
fn source_label(locator: &str) -> String {
    let trimmed = locator.trim_end_matches(['/', '\\']);
    let name = if is_remote_locator(trimmed) {
        trimmed.rsplit('/').next()
    } else {
        std::path::Path::new(trimmed)
            .file_name()
            .and_then(|name| name.to_str())
    };
    match name {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => locator.to_string(),
    }
}
