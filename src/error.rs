//! Unified error types for the service.

use thiserror::Error;

/// Unified error type for the service.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Server configuration failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Integration status check error.
    #[error("status error: {0}")]
    Status(#[from] StatusError),

    /// Metrics exporter could not be installed.
    #[error("metrics error: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while checking a downstream integration.
#[derive(Error, Debug)]
pub enum StatusError {
    /// The integration has no connection settings in the environment.
    #[error("integration {integration} is not configured (missing {variable})")]
    MissingIntegration {
        /// Integration name.
        integration: &'static str,
        /// Environment variable that should carry the settings.
        variable: &'static str,
    },

    /// Connecting to or querying the database failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;
