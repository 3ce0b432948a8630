//! Twelve-factor example HTTP service.
//!
//! All settings come from the process environment. Known integration
//! settings are pulled out into a typed record and every other variable is
//! kept as a generic name/value pair:
//!
//! ```text
//! A=1                                   -> configs:      A = 1
//! B=2                                   -> configs:      B = 2
//! POSTGRESQL_DB_CONNECT_STRING=postgres://x
//!                                       -> integrations: postgresql_url
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`status`]: Integration reachability checks
//! - [`api`]: HTTP API for diagnostics, config lookup and status
//! - [`metrics`]: Prometheus request counter
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod status;
pub mod utils;

pub use config::{CharmConfig, ServerConfig};
pub use error::{AppError, Result};
pub use status::{CheckOutcome, Integration, StatusChecker};
