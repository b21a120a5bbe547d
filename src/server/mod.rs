mod proxy;

use std::net::SocketAddr;

use tracing::info;

use crate::config::AlbumConfig;
use crate::error::{AppError, AppResult};

pub use proxy::{ALBUM_CONTENT_TYPE, AlbumProxy, album_route, routes};

/// Serves `/api/album` and the static pages until Ctrl-C.
pub async fn serve(config: &AlbumConfig) -> AppResult<()> {
    let addr: SocketAddr = config.bind.parse().map_err(|_| {
        AppError::invalid_argument(format!("invalid bind address: {}", config.bind))
    })?;

    let (bound, server) = warp::serve(routes(config.clone()))
        .try_bind_with_graceful_shutdown(addr, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .map_err(|err| AppError::server(format!("failed to bind {addr}: {err}")))?;

    info!(
        addr = %bound,
        upstream = %config.upstream_url,
        static_root = %config.static_root.display(),
        "album server listening"
    );
    server.await;
    info!("album server stopped");
    Ok(())
}
