//! Static file server for the bundled web front end.

use std::path::Path;

use axum::Router;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

/// Serve `dir`, answering unknown paths with its `index.html`.
pub fn static_router(dir: impl AsRef<Path>) -> Router {
    let dir = dir.as_ref();
    let index = ServeFile::new(dir.join("index.html"));

    Router::new()
        .fallback_service(ServeDir::new(dir).fallback(index))
        .layer(TraceLayer::new_for_http())
}
