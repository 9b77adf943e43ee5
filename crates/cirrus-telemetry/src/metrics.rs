//! Prometheus metrics for Cirrus.
//!
//! Serverless functions have no port to scrape, so the recorder is
//! installed without an HTTP listener and metrics are pulled with
//! [`render_metrics`] (typically flushed at the end of an invocation).
//!
//! # Standard Metrics
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `cirrus_requests_total` | Counter | `method`, `status` | Dispatched requests |
//! | `cirrus_request_duration_seconds` | Histogram | `method` | Dispatch latency |
//! | `cirrus_in_flight_requests` | Gauge | - | Requests being dispatched |
//! | `cirrus_unhandled_errors_total` | Counter | `kind` | Errors that reached the boundary |

use std::sync::{Mutex, OnceLock, PoisonError};
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};

use crate::error::TelemetryError;
use crate::TelemetryResult;

/// Request counter name.
pub const REQUESTS_TOTAL: &str = "cirrus_requests_total";
/// Request duration histogram name.
pub const REQUEST_DURATION: &str = "cirrus_request_duration_seconds";
/// In-flight gauge name.
pub const IN_FLIGHT: &str = "cirrus_in_flight_requests";
/// Unhandled error counter name.
pub const UNHANDLED_ERRORS: &str = "cirrus_unhandled_errors_total";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
static INSTALL_LOCK: Mutex<()> = Mutex::new(());

/// Metrics configuration.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Value of the `service` label attached to every metric.
    pub service_name: String,

    /// Histogram buckets for request duration, in seconds.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            service_name: "cirrus".to_string(),
            duration_buckets: vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ],
        }
    }
}

/// A handle for rendering installed metrics.
#[derive(Debug, Clone)]
pub struct MetricsRegistry {
    handle: PrometheusHandle,
}

impl MetricsRegistry {
    /// Wraps a Prometheus handle.
    #[must_use]
    pub fn new(handle: PrometheusHandle) -> Self {
        Self { handle }
    }

    /// Renders all metrics in Prometheus text format.
    #[must_use]
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Installs the global Prometheus recorder.
///
/// Installing twice, including from concurrent first callers, returns the
/// registry of the first installation. A disabled config installs nothing
/// and returns `None`.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidConfig`] for empty buckets and
/// [`TelemetryError::MetricsInit`] if another recorder is installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<Option<MetricsRegistry>> {
    if !config.enabled {
        return Ok(None);
    }
    if let Some(handle) = METRICS_HANDLE.get() {
        return Ok(Some(MetricsRegistry::new(handle.clone())));
    }

    // Only one caller may build and install; the rest see its handle.
    let _install = INSTALL_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(handle) = METRICS_HANDLE.get() {
        return Ok(Some(MetricsRegistry::new(handle.clone())));
    }

    let handle = PrometheusBuilder::new()
        .add_global_label("service", config.service_name.clone())
        .set_buckets_for_metric(
            Matcher::Full(REQUEST_DURATION.to_string()),
            &config.duration_buckets,
        )
        .map_err(|e| TelemetryError::InvalidConfig(e.to_string()))?
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let handle = METRICS_HANDLE.get_or_init(|| handle).clone();
    register_metric_descriptions();

    Ok(Some(MetricsRegistry::new(handle)))
}

/// Renders metrics in Prometheus format.
///
/// Returns `None` if metrics are not initialized.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn register_metric_descriptions() {
    describe_counter!(REQUESTS_TOTAL, "Total number of dispatched requests");
    describe_histogram!(REQUEST_DURATION, "Dispatch duration in seconds");
    describe_gauge!(IN_FLIGHT, "Number of requests currently being dispatched");
    describe_counter!(
        UNHANDLED_ERRORS,
        "Errors rendered by the catch-all boundary, by kind"
    );
}

/// Records a completed request.
///
/// Without an installed recorder this is a no-op.
pub fn record_request(method: &str, status_code: u16, duration: Duration) {
    counter!(
        REQUESTS_TOTAL,
        "method" => method.to_string(),
        "status" => status_code.to_string()
    )
    .increment(1);

    histogram!(REQUEST_DURATION, "method" => method.to_string()).record(duration.as_secs_f64());
}

/// Records an error rendered by the catch-all boundary.
pub fn record_unhandled_error(kind: &str) {
    counter!(UNHANDLED_ERRORS, "kind" => kind.to_string()).increment(1);
}

/// Keeps the in-flight gauge raised for its lifetime.
#[derive(Debug)]
pub struct InFlightGuard {
    _private: (),
}

impl InFlightGuard {
    /// Increments the gauge.
    #[must_use]
    pub fn new() -> Self {
        gauge!(IN_FLIGHT).increment(1.0);
        Self { _private: () }
    }
}

impl Default for InFlightGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!(IN_FLIGHT).decrement(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MetricsConfig::default();
        assert!(config.enabled);
        assert_eq!(config.service_name, "cirrus");
        assert!(!config.duration_buckets.is_empty());
    }

    #[test]
    fn test_disabled_installs_nothing() {
        let config = MetricsConfig {
            enabled: false,
            ..MetricsConfig::default()
        };
        assert!(init_metrics(&config).unwrap().is_none());
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_request("GET", 200, Duration::from_millis(10));
        record_unhandled_error("RuntimeError");
        drop(InFlightGuard::new());
    }
}
