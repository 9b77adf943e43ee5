//! The catch-all error boundary.

use cirrus_core::{Context, Error, Request, Response, Service, WireResult};
use cirrus_telemetry::metrics;

use crate::exception::ExceptionHandler;
use crate::handlers::{debug_response, internal_error_response, INTERNAL_SERVER_ERROR};
use crate::middleware::{Middleware, Next};

/// The outermost layer: no error gets past it.
///
/// Any error reaching this layer is rendered, in order of preference, by
/// the registered `500`/`ERROR` handler, by the debug report when debug
/// mode is on, or as a plain `500 Internal Server Error`.
#[derive(Debug, Clone, Default)]
pub struct ServerErrorMiddleware {
    handler: Option<ExceptionHandler>,
    debug: bool,
}

impl ServerErrorMiddleware {
    /// Creates the boundary.
    #[must_use]
    pub fn new(handler: Option<ExceptionHandler>, debug: bool) -> Self {
        Self { handler, debug }
    }

    /// Returns true if debug reports are rendered.
    #[must_use]
    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Calls `inner` and renders any error it raises.
    pub fn guard(&self, request: &Request, ctx: &Context, inner: &dyn Service) -> Response {
        match inner.call(request, ctx) {
            Ok(response) => response,
            Err(error) => self.render(request, &error),
        }
    }

    /// Renders an error that escaped every other layer.
    pub fn render(&self, request: &Request, error: &Error) -> Response {
        tracing::error!(
            method = %request.method(),
            path = request.path(),
            kind = %error.kind(),
            error = error.message(),
            "unhandled error"
        );
        metrics::record_unhandled_error(error.kind().name());

        if let Some(handler) = &self.handler {
            handler.handle(request, error)
        } else if self.debug {
            debug_response(error)
        } else {
            internal_error_response()
        }
    }

    /// Renders a failure for an event that never became a request.
    ///
    /// Web events get a full `500`; other events get only a body, since
    /// they have no HTTP status to carry.
    #[must_use]
    pub fn reject(&self, error: &Error, is_web: bool) -> WireResult {
        tracing::error!(kind = %error.kind(), error = error.message(), "event rejected");

        if is_web {
            let response = if self.debug {
                debug_response(error)
            } else {
                internal_error_response()
            };
            return response.into();
        }

        let body = if self.debug {
            error.report()
        } else {
            INTERNAL_SERVER_ERROR.to_string()
        };
        WireResult::body_only(body)
    }
}

impl Middleware for ServerErrorMiddleware {
    fn name(&self) -> &'static str {
        "server_error"
    }

    fn process(&self, request: &Request, ctx: &Context, next: Next<'_>) -> Result<Response, Error> {
        Ok(match next.run(request, ctx) {
            Ok(response) => response,
            Err(error) => self.render(request, &error),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cirrus_core::{service_fn, Body, ErrorKind, RUNTIME_ERROR};
    use http::StatusCode;
    use serde_json::json;

    static ORPHAN: ErrorKind = ErrorKind::root("Orphan");

    fn failing() -> impl Service {
        service_fn(|_: &Request, _: &Context| Err(Error::new(&RUNTIME_ERROR, "kaboom")))
    }

    fn request() -> Request {
        Request::builder().path("/fail").build()
    }

    #[test]
    fn test_default_renders_500() {
        let boundary = ServerErrorMiddleware::default();
        let response = boundary.guard(&request(), &Context::default(), &failing());
        assert_eq!(response.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(
            response.body(),
            Some(&Body::Text(INTERNAL_SERVER_ERROR.into()))
        );
    }

    #[test]
    fn test_debug_renders_report() {
        let boundary = ServerErrorMiddleware::new(None, true);
        let response = boundary.guard(&request(), &Context::default(), &failing());
        let body = response.body().and_then(Body::as_text).unwrap();
        assert!(body.contains("RuntimeError: kaboom"));
    }

    #[test]
    fn test_custom_handler_wins() {
        let handler = ExceptionHandler::new(|_: &Request, err: &Error| {
            (format!("sorry: {}", err.message()), 503)
        });
        let boundary = ServerErrorMiddleware::new(Some(handler), true);
        let response = boundary.guard(&request(), &Context::default(), &failing());
        assert_eq!(response.status(), Some(StatusCode::SERVICE_UNAVAILABLE));
        assert_eq!(response.body(), Some(&Body::Text("sorry: kaboom".into())));
    }

    #[test]
    fn test_catches_kinds_outside_hierarchy() {
        let boundary = ServerErrorMiddleware::default();
        let orphan = service_fn(|_: &Request, _: &Context| Err(Error::new(&ORPHAN, "stray")));
        let response = boundary.guard(&request(), &Context::default(), &orphan);
        assert_eq!(response.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn test_reject_non_web_is_body_only() {
        let boundary = ServerErrorMiddleware::default();
        let wire = boundary.reject(&Error::new(&RUNTIME_ERROR, "no http"), false);
        assert_eq!(
            serde_json::to_value(wire).unwrap(),
            json!({"body": "Internal Server Error"})
        );
    }

    #[test]
    fn test_reject_web() {
        let boundary = ServerErrorMiddleware::default();
        let wire = boundary.reject(&Error::new(&RUNTIME_ERROR, "broken"), true);
        assert_eq!(wire.status_code, Some(500));
    }
}
