//! Default exception handlers.

use cirrus_core::{Error, HttpError, Request, Response};
use http::StatusCode;

/// Body of the generic `500` response.
pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

/// Renders an [`HttpError`]: detail as body, its status and headers.
///
/// `204 No Content` and `304 Not Modified` carry no body.
pub fn render_http_error(http: &HttpError) -> Response {
    let response = Response::new()
        .with_status(http.status())
        .with_headers(http.headers().clone());

    if matches!(http.status(), StatusCode::NO_CONTENT | StatusCode::NOT_MODIFIED) {
        response
    } else {
        response.with_body(http.detail())
    }
}

/// Default handler for errors of kind `HTTP_ERROR`.
///
/// An error of an HTTP kind raised without a status payload renders as a
/// generic `500`.
pub fn http_error_response(_request: &Request, error: &Error) -> Response {
    error
        .http()
        .map_or_else(internal_error_response, render_http_error)
}

/// The generic `500 Internal Server Error` response.
pub fn internal_error_response() -> Response {
    Response::new()
        .with_body(INTERNAL_SERVER_ERROR)
        .with_status(StatusCode::INTERNAL_SERVER_ERROR)
}

/// A `500` response whose body is the full error report.
pub fn debug_response(error: &Error) -> Response {
    Response::new()
        .with_body(error.report())
        .with_status(StatusCode::INTERNAL_SERVER_ERROR)
}
