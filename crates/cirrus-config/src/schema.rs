//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections.

use cirrus_telemetry::{LogConfig, LogFormat, MetricsConfig};
use serde::{Deserialize, Serialize};

/// Application section.
///
/// # Example
///
/// ```
/// use cirrus_config::AppConfig;
///
/// let app = AppConfig {
///     name: "orders".to_string(),
///     debug: true,
/// };
/// assert!(app.debug);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Service name, used in logs and as the metrics `service` label.
    #[serde(default = "default_name")]
    pub name: String,

    /// Render unhandled errors with their full report instead of a bare
    /// `500 Internal Server Error`.
    #[serde(default)]
    pub debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            debug: false,
        }
    }
}

fn default_name() -> String {
    "cirrus".to_string()
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (e.g., "info", "cirrus_router=debug,warn").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Emit span open/close events.
    #[serde(default)]
    pub span_events: bool,

    /// Include source file and line number.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::Json,
            span_events: false,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    /// Converts the section into a subscriber configuration.
    #[must_use]
    pub fn to_log_config(&self, service_name: &str) -> LogConfig {
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            format: self.format,
            span_events: self.span_events,
            file_line_info: self.include_location,
            service_name: service_name.to_string(),
            ..LogConfig::default()
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Metrics section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Enable the Prometheus recorder.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Histogram buckets for request duration, in seconds.
    #[serde(default = "default_buckets")]
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            enabled: true,
            duration_buckets: default_buckets(),
        }
    }
}

impl MetricsSection {
    /// Converts the section into a recorder configuration.
    #[must_use]
    pub fn to_metrics_config(&self, service_name: &str) -> MetricsConfig {
        MetricsConfig {
            enabled: self.enabled,
            service_name: service_name.to_string(),
            duration_buckets: self.duration_buckets.clone(),
        }
    }
}

fn default_buckets() -> Vec<f64> {
    MetricsConfig::default().duration_buckets
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_defaults() {
        let app = AppConfig::default();
        assert_eq!(app.name, "cirrus");
        assert!(!app.debug);
    }

    #[test]
    fn test_logging_partial_section() {
        let logging: LoggingConfig = toml::from_str(r#"level = "warn""#).unwrap();
        assert_eq!(logging.level, "warn");
        assert!(logging.enabled);
        assert_eq!(logging.format, LogFormat::Json);
    }

    #[test]
    fn test_logging_unknown_field_rejected() {
        let result: Result<LoggingConfig, _> = toml::from_str(r#"colour = true"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_to_log_config() {
        let logging = LoggingConfig {
            format: LogFormat::Compact,
            include_location: true,
            ..LoggingConfig::default()
        };
        let config = logging.to_log_config("orders");
        assert_eq!(config.format, LogFormat::Compact);
        assert!(config.file_line_info);
        assert_eq!(config.service_name, "orders");
    }

    #[test]
    fn test_to_metrics_config() {
        let metrics = MetricsSection {
            enabled: false,
            duration_buckets: vec![0.1, 1.0],
        };
        let config = metrics.to_metrics_config("orders");
        assert!(!config.enabled);
        assert_eq!(config.duration_buckets, [0.1, 1.0]);
        assert_eq!(config.service_name, "orders");
    }
}
