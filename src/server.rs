//! HTTP surface for the relay: one GET route, permissive CORS on every reply.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::proxy::{ProxyReply, RedditProxy};

pub fn router(proxy: Arc<RedditProxy>) -> Router {
    Router::new()
        .route("/api/reddit", get(relay_feed))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(proxy)
}

/// Serve the relay router on an already-bound listener.
pub async fn serve(listener: tokio::net::TcpListener, proxy: Arc<RedditProxy>) -> Result<()> {
    axum::serve(listener, router(proxy))
        .await
        .context("proxy server failed")
}

async fn relay_feed(State(proxy): State<Arc<RedditProxy>>) -> ProxyReply {
    proxy.handle().await
}

impl IntoResponse for ProxyReply {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut resp = (status, self.body).into_response();
        resp.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(self.content_type),
        );
        if let Some(cache) = self.cache_control {
            resp.headers_mut()
                .insert(header::CACHE_CONTROL, HeaderValue::from_static(cache));
        }
        resp
    }
}
