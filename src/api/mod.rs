//! HTTP API module: diagnostics, config lookup and integration status.

pub mod handlers;
pub mod routes;
pub mod static_files;

pub use handlers::AppState;
pub use routes::create_router;
pub use static_files::static_router;
