//! Request ID middleware.
//!
//! Every request gets an identifier that is attached to the tracing span
//! covering the rest of the chain and echoed in the `x-request-id`
//! response header, so callers can correlate responses with logs.
//!
//! IDs are UUID v7: time-ordered and globally unique without coordination.

use cirrus_core::{Context, Error, Request, Response};
use uuid::Uuid;

use crate::middleware::{Middleware, Next};

/// The header name for request ID propagation.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware that generates or propagates request IDs.
///
/// # Behavior
///
/// 1. If incoming IDs are trusted and `x-request-id` holds a UUID, use it
/// 2. Otherwise generate a new UUID v7
/// 3. Run the rest of the chain inside a span carrying the ID
/// 4. Set the ID on a successful response
///
/// Errors pass through untouched; the boundary renders them later.
#[derive(Debug, Clone, Default)]
pub struct RequestIdMiddleware {
    trust_incoming: bool,
}

impl RequestIdMiddleware {
    /// Creates a middleware that always generates a fresh ID.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a middleware that reuses a valid incoming `x-request-id`.
    ///
    /// Use this behind a gateway that already assigns request IDs.
    #[must_use]
    pub fn trust_incoming() -> Self {
        Self {
            trust_incoming: true,
        }
    }

    fn extract_request_id(&self, request: &Request) -> Option<Uuid> {
        if !self.trust_incoming {
            return None;
        }

        request
            .header(REQUEST_ID_HEADER)
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
    }
}

impl Middleware for RequestIdMiddleware {
    fn name(&self) -> &'static str {
        "request_id"
    }

    fn process(&self, request: &Request, ctx: &Context, next: Next<'_>) -> Result<Response, Error> {
        let request_id = self
            .extract_request_id(request)
            .unwrap_or_else(Uuid::now_v7);

        let span = tracing::info_span!("request", request_id = %request_id);
        let _entered = span.enter();

        let response = next.run(request, ctx)?;
        Ok(response.with_header(REQUEST_ID_HEADER, request_id.to_string()))
    }
}
