//! Observability utilities for the account services.
//!
//! - Prometheus metrics recording and export
//! - Account and token metrics ([`AccountMetrics`])
//! - Axum middleware for automatic request metrics
//!
//! ```rust,ignore
//! use observability::{init_metrics, metrics_handler, middleware::metrics_middleware};
//!
//! init_metrics()?;
//!
//! let app = Router::new()
//!     .route("/metrics", get(metrics_handler))
//!     .layer(axum::middleware::from_fn(metrics_middleware));
//! ```

pub mod accounts;
pub mod middleware;

pub use accounts::{AccountMetrics, OperationTimer, Outcome};
pub use middleware::metrics_middleware;

pub use metrics_exporter_prometheus::BuildError;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::info;

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the global Prometheus recorder.
///
/// Idempotent: later calls return the handle installed by the first one.
pub fn init_metrics() -> Result<&'static PrometheusHandle, BuildError> {
    METRICS_HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new().install_recorder()?;
        info!("Prometheus metrics recorder initialized");
        register_metric_descriptions();
        Ok(handle)
    })
}

/// The installed handle, if [`init_metrics`] has run
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Axum handler for the /metrics endpoint
pub async fn metrics_handler() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

fn register_metric_descriptions() {
    use metrics::{describe_counter, describe_histogram};

    // HTTP metrics
    describe_counter!("http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_counter!(
        "http_requests_errors_total",
        "Total number of HTTP request errors"
    );

    // User metrics
    describe_counter!(
        "user_operations_total",
        "User operations by operation and outcome"
    );
    describe_histogram!(
        "user_operation_duration_seconds",
        "User operation duration in seconds"
    );

    // Token metrics
    describe_counter!("tokens_issued_total", "Auth tokens issued by type");
    describe_counter!(
        "token_verifications_total",
        "Auth token verifications by type and result"
    );
    describe_counter!("tokens_revoked_total", "Auth tokens revoked");
    describe_counter!("tokens_purged_total", "Expired auth tokens purged by the sweeper");
    describe_histogram!(
        "token_sweep_duration_seconds",
        "Expired token sweep duration in seconds"
    );
}
