//! Main configuration types.
//!
//! This module provides the top-level [`CirrusConfig`] struct.

use cirrus_telemetry::{LogFormat, TelemetryConfig};
use serde::{Deserialize, Serialize};

use crate::{AppConfig, ConfigError, LoggingConfig, MetricsSection};

/// Complete Cirrus application configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and the
/// environment.
///
/// # Example
///
/// ```
/// use cirrus_config::CirrusConfig;
///
/// let config = CirrusConfig::default();
/// assert_eq!(config.app.name, "cirrus");
/// assert!(!config.app.debug);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct CirrusConfig {
    /// Application settings.
    #[serde(default)]
    pub app: AppConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metrics settings.
    #[serde(default)]
    pub metrics: MetricsSection,
}

impl CirrusConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - The application name is empty
    /// - The log level is not a valid filter directive
    /// - Duration buckets are empty, non-positive or not increasing
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app.name.trim().is_empty() {
            return Err(ConfigError::invalid_value("app.name", "must not be empty"));
        }

        if self.logging.enabled {
            cirrus_telemetry::logging::create_env_filter(&self.logging.level)
                .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;
        }

        let buckets = &self.metrics.duration_buckets;
        if buckets.is_empty() {
            return Err(ConfigError::invalid_value(
                "metrics.duration_buckets",
                "must not be empty",
            ));
        }
        if buckets.iter().any(|b| !b.is_finite() || *b <= 0.0) {
            return Err(ConfigError::invalid_value(
                "metrics.duration_buckets",
                "must be positive and finite",
            ));
        }
        if buckets.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::invalid_value(
                "metrics.duration_buckets",
                "must be strictly increasing",
            ));
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// - Debug reports for unhandled errors
    /// - Pretty log output at debug level, with source locations
    ///
    /// # Example
    ///
    /// ```
    /// use cirrus_config::CirrusConfig;
    ///
    /// let config = CirrusConfig::development();
    /// assert!(config.app.debug);
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.app.debug = true;

        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.include_location = true;

        config
    }

    /// Create a production configuration preset.
    ///
    /// - No debug reports
    /// - JSON log output at info level
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.app.debug = false;

        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;

        config
    }

    /// Builds the telemetry configuration for this application.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryConfig {
        TelemetryConfig {
            logging: self.logging.to_log_config(&self.app.name),
            metrics: self.metrics.to_metrics_config(&self.app.name),
        }
    }
}
