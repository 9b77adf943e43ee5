//! Per-request logging and metrics.
//!
//! Place this layer inside the exception layer to observe the responses
//! that handlers and exception handlers produce, or outside of it to
//! observe raw errors as well. Errors that are still unresolved are
//! reported with the status they carry, or `500` when they carry none.
//!
//! # Metrics Emitted
//!
//! - `cirrus_requests_total` by method and status
//! - `cirrus_request_duration_seconds` by method
//! - `cirrus_in_flight_requests`
//!
//! # Example
//!
//! ```
//! use cirrus_middleware::stages::TelemetryMiddleware;
//!
//! let telemetry = TelemetryMiddleware::builder("orders")
//!     .environment("production")
//!     .build();
//! assert_eq!(telemetry.service_name(), "orders");
//! ```

use std::time::{Duration, Instant};

use cirrus_core::{Context, Error, Request, Response};
use cirrus_telemetry::metrics::{self, InFlightGuard};
use http::StatusCode;

use crate::middleware::{Middleware, Next};

/// Telemetry middleware that logs and meters every request.
#[derive(Debug, Clone)]
pub struct TelemetryMiddleware {
    service_name: String,
    environment: String,
}

/// What the telemetry layer observed for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryData {
    /// The service name.
    pub service_name: String,
    /// The environment.
    pub environment: String,
    /// The HTTP method.
    pub method: String,
    /// The request path.
    pub path: String,
    /// The HTTP status code.
    pub status_code: u16,
    /// Request duration in milliseconds.
    pub duration_ms: f64,
    /// Kind name of the error, if the inner chain raised one.
    pub error_kind: Option<&'static str>,
}

impl TelemetryMiddleware {
    /// Creates a telemetry middleware for the given service.
    #[must_use]
    pub fn new(service_name: &str) -> Self {
        Self::builder(service_name).build()
    }

    /// Creates a builder for more detailed configuration.
    #[must_use]
    pub fn builder(service_name: &str) -> TelemetryBuilder {
        TelemetryBuilder {
            service_name: service_name.to_string(),
            environment: "unknown".to_string(),
        }
    }

    /// Returns the service name.
    #[must_use]
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Summarizes the outcome of one request.
    ///
    /// A response without an explicit status counts as `200`.
    #[must_use]
    pub fn collect(
        &self,
        request: &Request,
        outcome: &Result<Response, Error>,
        duration: Duration,
    ) -> TelemetryData {
        let (status, error_kind) = match outcome {
            Ok(response) => (response.status().unwrap_or(StatusCode::OK), None),
            Err(error) => (
                error
                    .http()
                    .map_or(StatusCode::INTERNAL_SERVER_ERROR, |http| http.status()),
                Some(error.kind().name()),
            ),
        };

        TelemetryData {
            service_name: self.service_name.clone(),
            environment: self.environment.clone(),
            method: request.method().to_string(),
            path: request.path().to_string(),
            status_code: status.as_u16(),
            duration_ms: duration.as_secs_f64() * 1000.0,
            error_kind,
        }
    }

    fn emit(data: &TelemetryData, duration: Duration) {
        tracing::info!(
            service.name = %data.service_name,
            environment = %data.environment,
            http.method = %data.method,
            http.path = %data.path,
            http.status_code = data.status_code,
            duration_ms = data.duration_ms,
            error.kind = data.error_kind,
            "request completed"
        );
        metrics::record_request(&data.method, data.status_code, duration);
    }
}

impl Middleware for TelemetryMiddleware {
    fn name(&self) -> &'static str {
        "telemetry"
    }

    fn process(&self, request: &Request, ctx: &Context, next: Next<'_>) -> Result<Response, Error> {
        let _in_flight = InFlightGuard::new();
        let start = Instant::now();

        let outcome = next.run(request, ctx);

        let duration = start.elapsed();
        Self::emit(&self.collect(request, &outcome, duration), duration);
        outcome
    }
}

/// Builder for [`TelemetryMiddleware`].
#[derive(Debug)]
pub struct TelemetryBuilder {
    service_name: String,
    environment: String,
}

impl TelemetryBuilder {
    /// Sets the environment label.
    #[must_use]
    pub fn environment(mut self, environment: &str) -> Self {
        self.environment = environment.to_string();
        self
    }

    /// Builds the telemetry middleware.
    #[must_use]
    pub fn build(self) -> TelemetryMiddleware {
        TelemetryMiddleware {
            service_name: self.service_name,
            environment: self.environment,
        }
    }
}
