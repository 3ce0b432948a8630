//! Reachability checks for downstream integrations.

use std::sync::Arc;

use serde::Serialize;
use sqlx::{Connection, PgConnection};
use strum::{Display, EnumIter, EnumString};
use tracing::{debug, info, instrument, warn};

use crate::config::{CharmConfig, POSTGRESQL_DB_CONNECT_STRING};
use crate::error::StatusError;

/// External dependency whose reachability can be checked.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Integration {
    /// PostgreSQL database.
    Postgresql,
    /// MySQL database.
    Mysql,
    /// S3-compatible object store.
    S3,
    /// MongoDB database.
    Mongodb,
    /// Redis key-value store.
    Redis,
}

/// Result of a single status check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CheckOutcome {
    /// The integration answered.
    Success {
        /// Optional detail reported by the integration (e.g. server version).
        detail: Option<String>,
    },
    /// The integration was checked and is unreachable or misconfigured.
    Failure {
        /// Why the check failed.
        reason: String,
    },
    /// No check exists for this integration yet.
    Unimplemented,
}

impl CheckOutcome {
    /// Whether the check succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, CheckOutcome::Success { .. })
    }
}

impl From<Result<Option<String>, StatusError>> for CheckOutcome {
    fn from(result: Result<Option<String>, StatusError>) -> Self {
        match result {
            Ok(detail) => CheckOutcome::Success { detail },
            Err(e) => CheckOutcome::Failure {
                reason: e.to_string(),
            },
        }
    }
}

/// Runs status checks against the integrations in a [`CharmConfig`].
///
/// Every check opens its own connection and closes it before returning.
#[derive(Debug, Clone)]
pub struct StatusChecker {
    config: Arc<CharmConfig>,
}

impl StatusChecker {
    /// Create a checker over shared configuration.
    pub fn new(config: Arc<CharmConfig>) -> Self {
        Self { config }
    }

    /// Check one integration.
    #[instrument(skip_all, fields(integration = %integration))]
    pub async fn check(&self, integration: Integration) -> CheckOutcome {
        let outcome = match integration {
            Integration::Postgresql => self.check_postgresql().await.into(),
            Integration::Mysql
            | Integration::S3
            | Integration::Mongodb
            | Integration::Redis => CheckOutcome::Unimplemented,
        };

        match &outcome {
            CheckOutcome::Success { .. } => debug!("Status check passed"),
            CheckOutcome::Failure { reason } => warn!("Status check failed: {}", reason),
            CheckOutcome::Unimplemented => debug!("No status check implemented"),
        }

        outcome
    }

    /// Connect, ask for the server version, and disconnect.
    pub async fn check_postgresql(&self) -> Result<Option<String>, StatusError> {
        let url = self
            .config
            .integrations
            .postgresql_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or(StatusError::MissingIntegration {
                integration: "postgresql",
                variable: POSTGRESQL_DB_CONNECT_STRING,
            })?;

        let mut conn = PgConnection::connect(url).await?;

        let version = sqlx::query_scalar::<_, String>("SELECT version()")
            .fetch_one(&mut conn)
            .await;

        // Close even when the query failed.
        let closed = conn.close().await;
        let version = finish_query(version, closed)?;

        info!("postgresql version {}", version);
        Ok(Some(version))
    }
}

/// Combine a query result with the result of closing its connection.
///
/// Only the query decides the outcome; a failed close is logged.
fn finish_query<T>(
    queried: Result<T, sqlx::Error>,
    closed: Result<(), sqlx::Error>,
) -> Result<T, sqlx::Error> {
    if let Err(e) = closed {
        warn!("Failed to close connection: {}", e);
    }
    queried
}
