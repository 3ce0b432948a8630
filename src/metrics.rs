//! Prometheus metrics for request counting.

use std::net::SocketAddr;

use metrics::{counter, describe_counter, Counter};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{debug, info};

use crate::error::Result;

// === Metric Name Constants ===

/// Handled requests counter metric name.
pub const METRIC_REQUEST_COUNT: &str = "request_count";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_counter!(METRIC_REQUEST_COUNT, "No of request handled");

    debug!("Metrics initialized");
}

/// Install the Prometheus recorder and serve `/metrics` on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn install_exporter(addr: SocketAddr) -> Result<()> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    info!("Prometheus exporter listening on {}", addr);
    Ok(())
}

/// Handle to the request counter, handed to the HTTP layer.
pub fn request_counter() -> Counter {
    counter!(METRIC_REQUEST_COUNT)
}
