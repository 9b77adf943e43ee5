//! Optional built-in middleware.
//!
//! Neither layer is part of the fixed stack; add them with
//! `AppBuilder::middleware` like any user layer.
//!
//! - [`request_id`] - Generate/propagate request ID
//! - [`telemetry`] - Per-request logs and metrics

pub mod request_id;
pub mod telemetry;

pub use request_id::{RequestIdMiddleware, REQUEST_ID_HEADER};
pub use telemetry::{TelemetryBuilder, TelemetryData, TelemetryMiddleware};
