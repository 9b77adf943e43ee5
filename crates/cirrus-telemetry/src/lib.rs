//! Observability for Cirrus services.
//!
//! Two subsystems, both driven by plain configuration structs:
//!
//! - **Logging**: a `tracing-subscriber` pipeline emitting JSON lines or
//!   human-readable output ([`logging`])
//! - **Metrics**: a Prometheus recorder without a listener, rendered on
//!   demand ([`metrics`])
//!
//! The dispatch crates only emit `tracing` events and `metrics` samples;
//! nothing is recorded until this crate installs a subscriber or recorder.
//!
//! # Example
//!
//! ```rust,no_run
//! use cirrus_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let registry = init_telemetry(&TelemetryConfig::default()).ok().flatten();
//! if let Some(registry) = registry {
//!     println!("{}", registry.render());
//! }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig, LogFormat};
pub use metrics::{init_metrics, render_metrics, MetricsConfig, MetricsRegistry};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Configuration for both telemetry subsystems.
#[derive(Debug, Clone, Default)]
pub struct TelemetryConfig {
    /// Logging settings.
    pub logging: LogConfig,
    /// Metrics settings.
    pub metrics: MetricsConfig,
}

impl TelemetryConfig {
    /// Sets the service name on both subsystems.
    #[must_use]
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.logging.service_name.clone_from(&name);
        self.metrics.service_name = name;
        self
    }
}

/// Initializes logging, then metrics.
///
/// Returns the metrics registry when metrics are enabled.
///
/// # Errors
///
/// Returns the first subsystem failure.
pub fn init_telemetry(config: &TelemetryConfig) -> TelemetryResult<Option<MetricsRegistry>> {
    init_logging(&config.logging)?;
    init_metrics(&config.metrics)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_name_applies_to_both() {
        let config = TelemetryConfig::default().with_service_name("orders");
        assert_eq!(config.logging.service_name, "orders");
        assert_eq!(config.metrics.service_name, "orders");
    }
}
