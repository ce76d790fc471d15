//! Router configuration.
//!
//! Each kind of request the relay understands is one [`Endpoint`]; the
//! router is built by walking that list.

use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    middleware,
    routing::{get, post, MethodRouter},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{download_file, get_file_raw, index, upload_file, AppState};
use super::middleware::security_headers;

/// Request types served by the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Upload/download page.
    Index,
    /// Multipart upload.
    Upload,
    /// Binary download by path segment.
    RetrieveRaw,
    /// Download by query parameter, errors shown on the page.
    RetrieveForm,
}

impl Endpoint {
    /// All endpoints, in routing order.
    pub const ALL: [Endpoint; 4] = [
        Endpoint::Index,
        Endpoint::Upload,
        Endpoint::RetrieveRaw,
        Endpoint::RetrieveForm,
    ];

    /// HTTP method the endpoint answers to.
    pub fn method(&self) -> Method {
        match self {
            Endpoint::Upload => Method::POST,
            Endpoint::Index | Endpoint::RetrieveRaw | Endpoint::RetrieveForm => Method::GET,
        }
    }

    /// Route path in axum syntax.
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Index => "/",
            Endpoint::Upload => "/upload",
            Endpoint::RetrieveRaw => "/file/:filename",
            Endpoint::RetrieveForm => "/download",
        }
    }

    fn handler(&self) -> MethodRouter<Arc<AppState>> {
        match self {
            Endpoint::Index => get(index),
            Endpoint::Upload => post(upload_file),
            Endpoint::RetrieveRaw => get(get_file_raw),
            Endpoint::RetrieveForm => get(download_file),
        }
    }
}

/// Create the main router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let body_limit = app_state.max_upload_size;

    Endpoint::ALL
        .iter()
        .fold(Router::new(), |router, endpoint| {
            tracing::debug!(method = %endpoint.method(), path = endpoint.path(), "Registering route");
            router.route(endpoint.path(), endpoint.handler())
        })
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(security_headers))
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
