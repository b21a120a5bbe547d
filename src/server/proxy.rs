use std::convert::Infallible;
use std::sync::Arc;

use tracing::{info, warn};
use warp::http::header::{
    ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE,
};
use warp::http::response::Builder;
use warp::http::{Response, StatusCode};
use warp::hyper::Body;
use warp::{Filter, Rejection, Reply};

use crate::config::AlbumConfig;

pub const ALBUM_CONTENT_TYPE: &str = "application/pdf";

/// Upstream location and download name shared by every album request.
#[derive(Debug, Clone)]
pub struct AlbumProxy {
    client: reqwest::Client,
    upstream_url: Arc<str>,
    filename: Arc<str>,
}

impl AlbumProxy {
    pub fn new(upstream_url: impl Into<Arc<str>>, filename: impl Into<Arc<str>>) -> Self {
        Self {
            client: reqwest::Client::new(),
            upstream_url: upstream_url.into(),
            filename: filename.into(),
        }
    }

    pub fn from_config(config: &AlbumConfig) -> Self {
        Self::new(config.upstream_url.as_str(), config.filename.as_str())
    }

    pub fn upstream_url(&self) -> &str {
        &self.upstream_url
    }

    fn content_disposition(&self) -> String {
        format!("inline; filename={}", self.filename)
    }
}

/// `GET /api/album`, then the static page assets.
pub fn routes(
    config: AlbumConfig,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    album_route(AlbumProxy::from_config(&config)).or(warp::fs::dir(config.static_root))
}

pub fn album_route(
    proxy: AlbumProxy,
) -> impl Filter<Extract = (Response<Body>,), Error = Rejection> + Clone {
    warp::path!("api" / "album")
        .and(warp::get())
        .and(with_proxy(proxy))
        .and_then(handle_album)
}

fn with_proxy(
    proxy: AlbumProxy,
) -> impl Filter<Extract = (AlbumProxy,), Error = Infallible> + Clone {
    warp::any().map(move || proxy.clone())
}

async fn handle_album(proxy: AlbumProxy) -> Result<Response<Body>, Infallible> {
    let upstream = match proxy.client.get(proxy.upstream_url()).send().await {
        Ok(upstream) => upstream,
        Err(err) => {
            warn!(url = proxy.upstream_url(), error = %err, "album upstream unreachable");
            return Ok(bad_gateway());
        }
    };

    // http 1.x on the reqwest side, 0.2 on the warp side.
    let status = StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    info!(url = proxy.upstream_url(), status = status.as_u16(), "proxying album");

    let mut builder = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, ALBUM_CONTENT_TYPE)
        .header(CONTENT_DISPOSITION, proxy.content_disposition())
        .header(ACCESS_CONTROL_ALLOW_ORIGIN, "*");
    if let Some(length) = upstream.content_length() {
        builder = builder.header(CONTENT_LENGTH, length);
    }

    Ok(finish(builder, Body::wrap_stream(upstream.bytes_stream())))
}

fn bad_gateway() -> Response<Body> {
    let builder = Response::builder()
        .status(StatusCode::BAD_GATEWAY)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(ACCESS_CONTROL_ALLOW_ORIGIN, "*");
    finish(builder, Body::from("album upstream unreachable"))
}

fn finish(builder: Builder, body: Body) -> Response<Body> {
    match builder.body(body) {
        Ok(response) => response,
        Err(err) => {
            warn!(error = %err, "failed to assemble album response");
            let mut response = Response::new(Body::empty());
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        }
    }
}
