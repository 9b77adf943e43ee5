//! Typed configuration for Cirrus applications.
//!
//! - TOML and JSON configuration files
//! - `.env` files and environment variable overrides
//! - Strict parsing (unknown fields are errors)
//! - Layered loading (defaults → file → env)
//!
//! # Overview
//!
//! [`CirrusConfig`] holds three sections:
//!
//! - [`AppConfig`] - service name and debug mode
//! - [`LoggingConfig`] - log subscriber settings
//! - [`MetricsSection`] - Prometheus recorder settings
//!
//! # Example
//!
//! ```no_run
//! use cirrus_config::ConfigLoader;
//!
//! # fn main() -> Result<(), cirrus_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_production()
//!     .with_optional_file("cirrus.toml")?
//!     .with_env_prefix("CIRRUS")
//!     .load()?;
//!
//! cirrus_telemetry::init_telemetry(&config.telemetry()).ok();
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [app]
//! name = "orders"
//! debug = false
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//!
//! [metrics]
//! enabled = true
//! duration_buckets = [0.005, 0.05, 0.5, 5.0]
//! ```
//!
//! # Environment Variable Overrides
//!
//! Values can be overridden with variables named `PREFIX__SECTION__KEY`:
//!
//! - `CIRRUS__APP__DEBUG=true`
//! - `CIRRUS__LOGGING__FORMAT=compact`
//! - `CIRRUS__METRICS__DURATION_BUCKETS=0.01,0.1,1`

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::CirrusConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{AppConfig, LoggingConfig, MetricsSection};
