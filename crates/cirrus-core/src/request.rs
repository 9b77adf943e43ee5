//! The normalized, immutable request.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;
use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::HttpError;
use crate::event::{Event, HttpEvent};
use crate::headers::Headers;
use crate::params::PathParams;
use crate::query::QueryParams;

/// A request, normalized from a web event.
///
/// Requests are immutable. Everything except the path parameters lives in
/// a shared allocation, so cloning is cheap and the router can derive a
/// request carrying parameters ([`with_path_params`](Self::with_path_params))
/// without copying headers or body.
///
/// # Example
///
/// ```
/// use cirrus_core::Request;
/// use http::Method;
///
/// let request = Request::builder()
///     .method(Method::POST)
///     .path("/items")
///     .header("content-type", "application/json")
///     .body(r#"{"name":"widget"}"#)
///     .build();
///
/// let value: serde_json::Value = request.json().unwrap();
/// assert_eq!(value["name"], "widget");
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    parts: Arc<RequestParts>,
    path_params: PathParams,
}

#[derive(Debug)]
struct RequestParts {
    method: Method,
    path: String,
    query: QueryParams,
    headers: Headers,
    body: String,
    is_base64_encoded: bool,
    parameters: Map<String, Value>,
}

impl Request {
    /// Starts building a request by hand.
    #[must_use]
    pub fn builder() -> RequestBuilder {
        RequestBuilder::default()
    }

    /// Normalizes a web event.
    ///
    /// # Errors
    ///
    /// Returns a 400 [`HttpError`] if the event has no `http` member, the
    /// method is not a valid token, or the query string does not parse.
    pub fn from_event(event: &Event) -> Result<Self, HttpError> {
        let http: &HttpEvent = event
            .http
            .as_ref()
            .ok_or_else(|| HttpError::bad_request("expected a web event"))?;

        let method = Method::from_bytes(http.method.as_bytes())
            .map_err(|_| HttpError::bad_request(format!("invalid method `{}`", http.method)))?;
        let query = match http.query_string.as_deref() {
            Some(raw) => QueryParams::parse(raw)?,
            None => QueryParams::new(),
        };

        Ok(Self::from_parts(RequestParts {
            method,
            path: http.path.clone(),
            query,
            headers: http.headers.clone(),
            body: http.body.clone().unwrap_or_default(),
            is_base64_encoded: http.is_base64_encoded,
            parameters: event.public_parameters(),
        }))
    }

    /// Builds the request seen by middleware and exception handlers when
    /// [`from_event`](Self::from_event) fails.
    ///
    /// Path, headers, body and extra parameters are kept. The method falls
    /// back to `GET` and the query is empty, since those are what failed to
    /// parse.
    #[must_use]
    pub fn from_rejected_event(event: &Event) -> Self {
        let Some(http) = event.http.as_ref() else {
            return Self::builder().build();
        };

        Self::from_parts(RequestParts {
            method: Method::GET,
            path: http.path.clone(),
            query: QueryParams::new(),
            headers: http.headers.clone(),
            body: http.body.clone().unwrap_or_default(),
            is_base64_encoded: http.is_base64_encoded,
            parameters: event.public_parameters(),
        })
    }

    fn from_parts(parts: RequestParts) -> Self {
        Self {
            parts: Arc::new(parts),
            path_params: PathParams::new(),
        }
    }

    /// Returns a request sharing this one's parts with `params` attached.
    #[must_use]
    pub fn with_path_params(&self, params: PathParams) -> Self {
        Self {
            parts: Arc::clone(&self.parts),
            path_params: params,
        }
    }

    /// Returns the method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    /// Returns the path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.parts.path
    }

    /// Returns the path parameters captured by the router.
    #[must_use]
    pub fn path_params(&self) -> &PathParams {
        &self.path_params
    }

    /// Returns one raw path parameter.
    #[must_use]
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name)
    }

    /// Returns the query parameters.
    #[must_use]
    pub fn query(&self) -> &QueryParams {
        &self.parts.query
    }

    /// Returns the headers.
    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.parts.headers
    }

    /// Returns the first value of a header.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.parts.headers.get(name)
    }

    /// Returns the extra event parameters.
    #[must_use]
    pub fn parameters(&self) -> &Map<String, Value> {
        &self.parts.parameters
    }

    /// Returns the body exactly as received.
    #[must_use]
    pub fn raw_body(&self) -> &str {
        &self.parts.body
    }

    /// Returns true if the raw body is base64 text.
    #[must_use]
    pub fn is_base64_encoded(&self) -> bool {
        self.parts.is_base64_encoded
    }

    /// Returns the decoded body bytes.
    ///
    /// # Errors
    ///
    /// Returns a 400 [`HttpError`] if the body is flagged as base64 but
    /// does not decode.
    pub fn body_bytes(&self) -> Result<Bytes, HttpError> {
        if self.parts.is_base64_encoded {
            BASE64
                .decode(self.parts.body.as_bytes())
                .map(Bytes::from)
                .map_err(|e| HttpError::bad_request(format!("invalid base64 body: {e}")))
        } else {
            Ok(Bytes::copy_from_slice(self.parts.body.as_bytes()))
        }
    }

    /// Returns the decoded body as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns a 400 [`HttpError`] if base64 decoding fails or the decoded
    /// bytes are not UTF-8.
    pub fn text(&self) -> Result<String, HttpError> {
        if !self.parts.is_base64_encoded {
            return Ok(self.parts.body.clone());
        }
        let bytes = self.body_bytes()?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| HttpError::bad_request("request body is not valid UTF-8"))
    }

    /// Deserializes a JSON body.
    ///
    /// # Errors
    ///
    /// Returns 415 if the content type is not `application/json`, and 400
    /// if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        if !self.has_content_type("application/json") {
            return Err(HttpError::new(StatusCode::UNSUPPORTED_MEDIA_TYPE));
        }
        let bytes = self.body_bytes()?;
        serde_json::from_slice(&bytes)
            .map_err(|e| HttpError::bad_request(format!("invalid JSON body: {e}")))
    }

    /// Parses an urlencoded form body.
    ///
    /// # Errors
    ///
    /// Returns 400 if the body cannot be decoded.
    pub fn form(&self) -> Result<QueryParams, HttpError> {
        QueryParams::parse(&self.text()?)
    }

    /// Compares the media type of `content-type`, ignoring parameters
    /// such as `charset`.
    fn has_content_type(&self, expected: &str) -> bool {
        self.header("content-type")
            .and_then(|value| value.split(';').next())
            .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(expected))
    }
}

/// Builds a [`Request`] without going through an [`Event`].
#[derive(Debug, Default)]
#[must_use]
pub struct RequestBuilder {
    method: Method,
    path: String,
    query: QueryParams,
    headers: Headers,
    body: String,
    is_base64_encoded: bool,
    parameters: Map<String, Value>,
}

impl RequestBuilder {
    /// Sets the method. Defaults to `GET`.
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the path.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Appends a query pair.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.append(key, value);
        self
    }

    /// Appends a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Sets a plain-text body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self.is_base64_encoded = false;
        self
    }

    /// Sets a binary body, stored base64-encoded.
    pub fn binary_body(mut self, body: impl AsRef<[u8]>) -> Self {
        self.body = BASE64.encode(body);
        self.is_base64_encoded = true;
        self
    }

    /// Adds an extra event parameter.
    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Finishes the request.
    pub fn build(self) -> Request {
        Request::from_parts(RequestParts {
            method: self.method,
            path: self.path,
            query: self.query,
            headers: self.headers,
            body: self.body,
            is_base64_encoded: self.is_base64_encoded,
            parameters: self.parameters,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(http: Value) -> Event {
        serde_json::from_value(json!({ "http": http })).unwrap()
    }

    #[test]
    fn test_rejected_event_keeps_what_parsed() {
        let ev = event(json!({
            "method": "GE T",
            "path": "/orders",
            "headers": {"x-tenant": "acme"},
            "body": "payload"
        }));
        assert!(Request::from_event(&ev).is_err());

        let request = Request::from_rejected_event(&ev);
        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.path(), "/orders");
        assert_eq!(request.header("x-tenant"), Some("acme"));
        assert_eq!(request.raw_body(), "payload");
        assert!(request.query().is_empty());
    }

    #[test]
    fn test_from_event() {
        let ev = event(json!({
            "method": "GET",
            "path": "/search",
            "headers": {"Accept": "text/html"},
            "queryString": "q=rust&page=2"
        }));
        let request = Request::from_event(&ev).unwrap();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.path(), "/search");
        assert_eq!(request.query().get("q"), Some("rust"));
        assert_eq!(request.header("accept"), Some("text/html"));
        assert!(request.path_params().is_empty());
    }

    #[test]
    fn test_from_event_non_web() {
        let ev: Event = serde_json::from_value(json!({"job": "nightly"})).unwrap();
        let err = Request::from_event(&ev).unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_from_event_bad_method() {
        let ev = event(json!({"method": "GE T", "path": "/"}));
        assert_eq!(
            Request::from_event(&ev).unwrap_err().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_parameters_exclude_reserved() {
        let ev: Event = serde_json::from_value(json!({
            "http": {"method": "GET", "path": "/"},
            "__ow_method": "get",
            "user": "ada"
        }))
        .unwrap();
        let request = Request::from_event(&ev).unwrap();
        assert_eq!(request.parameters().len(), 1);
        assert_eq!(request.parameters()["user"], "ada");
    }

    #[test]
    fn test_base64_body() {
        let ev = event(json!({
            "method": "POST",
            "path": "/",
            "body": "aGVsbG8gd29ybGQ=",
            "isBase64Encoded": true
        }));
        let request = Request::from_event(&ev).unwrap();
        assert_eq!(request.text().unwrap(), "hello world");
        assert_eq!(request.body_bytes().unwrap().as_ref(), b"hello world");
    }

    #[test]
    fn test_invalid_base64_is_bad_request() {
        let request = Request::builder().build();
        let request = Request {
            parts: Arc::new(RequestParts {
                body: "!!!".to_string(),
                is_base64_encoded: true,
                ..Arc::try_unwrap(request.parts).unwrap()
            }),
            path_params: PathParams::new(),
        };
        assert_eq!(
            request.body_bytes().unwrap_err().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_json_requires_content_type() {
        let request = Request::builder().body("{}").build();
        assert_eq!(
            request.json::<Value>().unwrap_err().status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
    }

    #[test]
    fn test_json_accepts_charset() {
        let request = Request::builder()
            .header("Content-Type", "application/json; charset=utf-8")
            .body(r#"{"a":1}"#)
            .build();
        assert_eq!(request.json::<Value>().unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_json_malformed() {
        let request = Request::builder()
            .header("content-type", "application/json")
            .body("{not json")
            .build();
        assert_eq!(
            request.json::<Value>().unwrap_err().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_form() {
        let request = Request::builder().body("name=ada&lang=rust").build();
        let form = request.form().unwrap();
        assert_eq!(form.get("name"), Some("ada"));
        assert_eq!(form.get("lang"), Some("rust"));
    }

    #[test]
    fn test_with_path_params_shares_parts() {
        let original = Request::builder().path("/items/7").build();
        let routed = original.with_path_params([("id", "7")].into_iter().collect());

        assert_eq!(routed.path_param("id"), Some("7"));
        assert!(original.path_params().is_empty());
        assert!(Arc::ptr_eq(&original.parts, &routed.parts));
    }
}
