//! Test response wrapper.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use cirrus_core::WireResult;
use http::StatusCode;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::TestError;

/// A dispatched result with helper methods for assertions.
#[derive(Debug, Clone, PartialEq)]
pub struct TestResponse {
    wire: WireResult,
}

impl TestResponse {
    /// Wraps a wire result.
    #[must_use]
    pub fn new(wire: WireResult) -> Self {
        Self { wire }
    }

    /// Returns the wrapped wire result.
    #[must_use]
    pub fn wire(&self) -> &WireResult {
        &self.wire
    }

    /// Returns the wire result as the host would serialize it.
    #[must_use]
    pub fn to_json(&self) -> Value {
        self.wire.clone().into_value()
    }

    /// Returns the status code, if the result carries one.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.wire
            .status_code
            .and_then(|code| StatusCode::from_u16(code).ok())
    }

    /// Returns the raw status code, if the result carries one.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        self.wire.status_code
    }

    /// Returns true if the status is successful (2xx).
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status().is_some_and(|s| s.is_success())
    }

    /// Returns true if the status is a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| s.is_client_error())
    }

    /// Returns true if the status is a server error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| s.is_server_error())
    }

    /// Returns the headers, if the result carries any.
    #[must_use]
    pub fn headers(&self) -> Option<&IndexMap<String, String>> {
        self.wire.headers.as_ref()
    }

    /// Gets a header value by name, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers()?
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the Content-Type header value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Returns the raw body value.
    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        self.wire.body.as_ref()
    }

    /// Returns the body as a string.
    ///
    /// Non-string JSON bodies are rendered as JSON text.
    pub fn text(&self) -> Result<String, TestError> {
        match self.body() {
            Some(Value::String(text)) => Ok(text.clone()),
            Some(other) => Ok(other.to_string()),
            None => Err(TestError::BodyRead("response has no body".to_string())),
        }
    }

    /// Decodes a base64 body.
    pub fn bytes(&self) -> Result<Bytes, TestError> {
        let text = self.text()?;
        STANDARD
            .decode(text)
            .map(Bytes::from)
            .map_err(|e| TestError::BodyRead(format!("invalid base64: {e}")))
    }

    /// Deserializes the body.
    ///
    /// A structured body is deserialized directly; a string body is
    /// parsed as JSON text.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TestError> {
        match self.body() {
            Some(Value::String(text)) => Ok(serde_json::from_str(text)?),
            Some(value) => Ok(T::deserialize(value)?),
            None => Err(TestError::BodyRead("response has no body".to_string())),
        }
    }

    /// Returns the body as a JSON value.
    pub fn json_value(&self) -> Result<Value, TestError> {
        self.json()
    }

    /// Asserts the status code.
    ///
    /// # Panics
    ///
    /// Panics if the status differs.
    #[track_caller]
    pub fn assert_status(&self, expected: u16) -> &Self {
        assert_eq!(
            self.status_code(),
            Some(expected),
            "unexpected status, body: {:?}",
            self.body()
        );
        self
    }

    /// Asserts a header value.
    ///
    /// # Panics
    ///
    /// Panics if the header is missing or differs.
    #[track_caller]
    pub fn assert_header(&self, name: &str, expected: &str) -> &Self {
        assert_eq!(self.header(name), Some(expected), "header `{name}`");
        self
    }

    /// Asserts the text body.
    ///
    /// # Panics
    ///
    /// Panics if the body is missing or differs.
    #[track_caller]
    pub fn assert_text(&self, expected: &str) -> &Self {
        assert_eq!(self.text().ok().as_deref(), Some(expected));
        self
    }
}

impl From<WireResult> for TestResponse {
    fn from(wire: WireResult) -> Self {
        Self::new(wire)
    }
}
