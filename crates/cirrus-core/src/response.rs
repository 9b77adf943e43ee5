//! Responses and the conversions handlers return through.

use bytes::Bytes;
use http::StatusCode;
use serde::Serialize;
use serde_json::Value;

use crate::headers::Headers;

/// A response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// UTF-8 text, sent verbatim.
    Text(String),
    /// Raw bytes, sent base64-encoded.
    Binary(Bytes),
    /// A structured value, sent as JSON.
    Json(Value),
}

impl Body {
    /// Returns the text if this is a text body.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Binary(Bytes::from(bytes))
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self::Binary(bytes)
    }
}

/// A handler's response.
///
/// Every field is optional: an absent status or empty header map is simply
/// left out of the wire result and the host applies its own defaults.
///
/// # Example
///
/// ```
/// use cirrus_core::Response;
/// use http::StatusCode;
///
/// let response = Response::new()
///     .with_body("created")
///     .with_status(StatusCode::CREATED)
///     .with_header("Location", "/items/7");
///
/// assert_eq!(response.status(), Some(StatusCode::CREATED));
/// assert_eq!(response.headers().get("location"), Some("/items/7"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use]
pub struct Response {
    body: Option<Body>,
    status: Option<StatusCode>,
    headers: Headers,
}

impl Response {
    /// Creates an empty response.
    pub fn new() -> Self {
        Self::default()
    }

    /// A `text/plain` response.
    pub fn text(body: impl Into<String>) -> Self {
        Self::new()
            .with_body(Body::Text(body.into()))
            .with_header("content-type", "text/plain")
    }

    /// A `text/html` response.
    pub fn html(body: impl Into<String>) -> Self {
        Self::new()
            .with_body(Body::Text(body.into()))
            .with_header("content-type", "text/html")
    }

    /// An `application/json` response.
    pub fn json(value: Value) -> Self {
        Self::new()
            .with_body(Body::Json(value))
            .with_header("content-type", "application/json")
    }

    /// A binary response with an explicit media type.
    ///
    /// The wire body is a base64 string with no encoding flag, so the
    /// `content-type` header is what tells a client to decode it.
    pub fn binary(body: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self::new()
            .with_body(Body::Binary(body.into()))
            .with_header("content-type", content_type)
    }

    /// Sets the body.
    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the status.
    pub fn with_status(mut self, status: impl IntoStatus) -> Self {
        self.status = Some(status.into_status());
        self
    }

    /// Sets a header, replacing existing values.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Appends every header of `headers`.
    pub fn with_headers(mut self, headers: impl Into<Headers>) -> Self {
        self.headers.extend(&headers.into());
        self
    }

    /// Returns the body.
    #[must_use]
    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    /// Returns the status.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    /// Returns the headers.
    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the headers for in-place changes.
    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    /// Splits the response into its parts.
    #[must_use]
    pub fn into_parts(self) -> (Option<Body>, Option<StatusCode>, Headers) {
        (self.body, self.status, self.headers)
    }
}

/// Values usable as a response status.
///
/// Integer codes outside `100..=999` become `500 Internal Server Error`.
pub trait IntoStatus {
    /// Converts into a status code.
    fn into_status(self) -> StatusCode;
}

impl IntoStatus for StatusCode {
    fn into_status(self) -> StatusCode {
        self
    }
}

impl IntoStatus for u16 {
    fn into_status(self) -> StatusCode {
        StatusCode::from_u16(self).unwrap_or_else(|_| {
            tracing::warn!(status = self, "invalid status code, using 500");
            StatusCode::INTERNAL_SERVER_ERROR
        })
    }
}

impl IntoStatus for i32 {
    fn into_status(self) -> StatusCode {
        u16::try_from(self).map_or_else(
            |_| {
                tracing::warn!(status = self, "invalid status code, using 500");
                StatusCode::INTERNAL_SERVER_ERROR
            },
            IntoStatus::into_status,
        )
    }
}

/// Values a handler may return.
///
/// Implemented for [`Response`], for anything convertible into a [`Body`]
/// (the value becomes the body with no status or headers), for [`Json`],
/// and for the positional tuples `(body,)`, `(body, status)` and
/// `(body, status, headers)`. No other tuple shape implements it.
///
/// # Example
///
/// ```
/// use cirrus_core::{IntoResponse, Body};
/// use http::StatusCode;
///
/// let response = ("hello", 201, [("x-trace", "abc")]).into_response();
/// assert_eq!(response.body(), Some(&Body::Text("hello".into())));
/// assert_eq!(response.status(), Some(StatusCode::CREATED));
/// assert_eq!(response.headers().get("x-trace"), Some("abc"));
/// ```
pub trait IntoResponse {
    /// Converts into a [`Response`].
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response {
        self
    }
}

impl IntoResponse for Body {
    fn into_response(self) -> Response {
        Response::new().with_body(self)
    }
}

macro_rules! body_into_response {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoResponse for $ty {
                fn into_response(self) -> Response {
                    Response::new().with_body(self)
                }
            }
        )*
    };
}

body_into_response!(String, &'static str, Value, Vec<u8>, Bytes);

impl<B: Into<Body>> IntoResponse for (B,) {
    fn into_response(self) -> Response {
        Response::new().with_body(self.0)
    }
}

impl<B: Into<Body>, S: IntoStatus> IntoResponse for (B, S) {
    fn into_response(self) -> Response {
        Response::new().with_body(self.0).with_status(self.1)
    }
}

impl<B: Into<Body>, S: IntoStatus, H: Into<Headers>> IntoResponse for (B, S, H) {
    fn into_response(self) -> Response {
        Response::new()
            .with_body(self.0)
            .with_status(self.1)
            .with_headers(self.2)
    }
}

/// A serializable value returned as a JSON body.
///
/// A value that fails to serialize becomes an empty `500` response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        match serde_json::to_value(&self.0) {
            Ok(value) => Response::new().with_body(value),
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize JSON response body");
                Response::new().with_status(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_helpers_set_content_type() {
        assert_eq!(
            Response::text("hi").headers().get("content-type"),
            Some("text/plain")
        );
        assert_eq!(
            Response::html("<p>").headers().get("content-type"),
            Some("text/html")
        );
        assert_eq!(
            Response::json(json!([])).headers().get("content-type"),
            Some("application/json")
        );
    }

    #[test]
    fn test_bare_values_have_no_status() {
        let response = "plain".into_response();
        assert_eq!(response.body(), Some(&Body::Text("plain".into())));
        assert_eq!(response.status(), None);
        assert!(response.headers().is_empty());

        let response = json!({"ok": true}).into_response();
        assert_eq!(response.body(), Some(&Body::Json(json!({"ok": true}))));

        let response = vec![0_u8, 159].into_response();
        assert_eq!(
            response.body(),
            Some(&Body::Binary(Bytes::from_static(&[0, 159])))
        );
    }

    #[test]
    fn test_tuples() {
        let response = ("x",).into_response();
        assert_eq!(response.status(), None);

        let response = (String::from("x"), StatusCode::ACCEPTED).into_response();
        assert_eq!(response.status(), Some(StatusCode::ACCEPTED));

        let response = ("x", 200, [("a", "b")]).into_response();
        assert_eq!(response.status(), Some(StatusCode::OK));
        assert_eq!(response.headers().get("a"), Some("b"));
    }

    #[test]
    fn test_invalid_u16_status() {
        let response = ("x", 42_u16).into_response();
        assert_eq!(response.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn test_json_wrapper() {
        #[derive(Serialize)]
        struct Item {
            id: u32,
        }

        let response = Json(Item { id: 3 }).into_response();
        assert_eq!(response.body(), Some(&Body::Json(json!({"id": 3}))));
    }

    #[test]
    fn test_json_wrapper_serialize_failure() {
        let mut map = BTreeMap::new();
        map.insert(vec![1_u8], "non-string key");

        let response = Json(map).into_response();
        assert_eq!(response.body(), None);
        assert_eq!(response.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn test_with_header_replaces() {
        let response = Response::text("a").with_header("Content-Type", "text/csv");
        assert_eq!(response.headers().len(), 1);
        assert_eq!(response.headers().get("content-type"), Some("text/csv"));
    }
}
