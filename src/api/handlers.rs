//! HTTP API handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use metrics::Counter;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{CharmConfig, ConfigEntry};
use crate::status::{CheckOutcome, Integration, StatusChecker};

/// Body returned when a status check passes.
pub const SUCCESS_BODY: &str = "SUCCESS";
/// Body returned when a status check fails.
pub const FAILURE_BODY: &str = "FAILURE";
/// Body returned for integrations without a check.
pub const NOT_IMPLEMENTED_BODY: &str = "Not implemented yet!";

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Configuration loaded at startup.
    pub config: Arc<CharmConfig>,
    /// Integration status checker.
    pub checker: StatusChecker,
    /// Handled requests counter.
    pub requests: Counter,
}

impl AppState {
    /// Create new app state over the loaded configuration.
    pub fn new(config: CharmConfig, requests: Counter) -> Self {
        let config = Arc::new(config);
        Self {
            checker: StatusChecker::new(Arc::clone(&config)),
            config,
            requests,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Query parameters for [`sleep`].
#[derive(Debug, Deserialize)]
pub struct SleepParams {
    /// Seconds to sleep, as sent by the client.
    pub duration: Option<String>,
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Greeting handler, also used for every unmatched path.
pub async fn hello(State(state): State<AppState>, uri: Uri) -> impl IntoResponse {
    state.requests.increment(1);
    debug!("root handler");

    format!("Hello world! Path: {}\n", uri.path())
}

/// Dump the process environment as JSON.
pub async fn env(State(state): State<AppState>) -> impl IntoResponse {
    state.requests.increment(1);

    let vars: Vec<ConfigEntry> = std::env::vars_os()
        .filter_map(|(name, value)| {
            Some(ConfigEntry {
                name: name.into_string().ok()?,
                value: value.into_string().ok()?,
            })
        })
        .collect();

    Json(vars)
}

/// Sleep for `?duration=<seconds>` before answering.
///
/// Any integer is accepted; zero or negative values do not sleep.
pub async fn sleep(Query(params): Query<SleepParams>) -> impl IntoResponse {
    let Some(seconds) = params
        .duration
        .as_deref()
        .and_then(|raw| raw.parse::<i64>().ok())
    else {
        return (StatusCode::BAD_REQUEST, "Bad Request. Wrong duration").into_response();
    };

    // Negative durations return immediately.
    tokio::time::sleep(Duration::from_secs(seconds.max(0).unsigned_abs())).await;
    StatusCode::OK.into_response()
}

/// Look up one generic config value by name.
pub async fn config_value(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.config.get(&name) {
        Some(value) => Json(value.to_string()).into_response(),
        None => (
            StatusCode::BAD_REQUEST,
            format!("Bad Request. Config {} not found.", name),
        )
            .into_response(),
    }
}

/// Report whether an integration is reachable.
pub async fn integration_status(
    State(state): State<AppState>,
    integration: Integration,
) -> impl IntoResponse {
    match state.checker.check(integration).await {
        CheckOutcome::Success { detail } => {
            info!(%integration, detail = detail.as_deref().unwrap_or(""), "status check succeeded");
            (StatusCode::OK, SUCCESS_BODY)
        }
        CheckOutcome::Failure { reason } => {
            warn!(%integration, "status check failed: {}", reason);
            (StatusCode::OK, FAILURE_BODY)
        }
        CheckOutcome::Unimplemented => {
            state.requests.increment(1);
            (StatusCode::NOT_IMPLEMENTED, NOT_IMPLEMENTED_BODY)
        }
    }
}
