//! Invocation input: the raw event and the host context.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::headers::Headers;

/// A single function invocation payload.
///
/// Web events carry an [`HttpEvent`] under `http`. Every other top-level
/// key is an extra parameter made available to handlers through
/// [`Request::parameters`](crate::Request::parameters), except keys starting
/// with `__`, which are reserved for the host and dropped.
///
/// # Example
///
/// ```
/// use cirrus_core::Event;
///
/// let event: Event = serde_json::from_value(serde_json::json!({
///     "http": {"method": "GET", "path": "/items/1", "headers": {}},
///     "tenant": "acme",
///     "__ow_user": "guest"
/// }))
/// .unwrap();
///
/// assert!(event.is_web());
/// assert_eq!(event.parameters["tenant"], "acme");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// The HTTP portion of a web event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpEvent>,

    /// All other top-level event keys.
    #[serde(flatten)]
    pub parameters: Map<String, Value>,
}

impl Event {
    /// Creates a web event.
    #[must_use]
    pub fn web(http: HttpEvent) -> Self {
        Self {
            http: Some(http),
            parameters: Map::new(),
        }
    }

    /// Returns true if the event carries an `http` member.
    #[must_use]
    pub fn is_web(&self) -> bool {
        self.http.is_some()
    }

    /// Returns the extra parameters without reserved `__` keys.
    #[must_use]
    pub fn public_parameters(&self) -> Map<String, Value> {
        self.parameters
            .iter()
            .filter(|(k, _)| !k.starts_with("__") && k.as_str() != "http")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// The HTTP member of a web event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpEvent {
    /// Request method, e.g. `"GET"`.
    pub method: String,

    /// Request path, e.g. `"/items/42"`.
    pub path: String,

    /// Request headers.
    #[serde(default)]
    pub headers: Headers,

    /// Raw query string without the leading `?`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_string: Option<String>,

    /// Raw body. Base64 text when `is_base64_encoded` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,

    /// Whether `body` is base64-encoded.
    #[serde(default)]
    pub is_base64_encoded: bool,
}

impl HttpEvent {
    /// Creates an HTTP event with no headers, query or body.
    #[must_use]
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }
}

/// The host's invocation context.
///
/// Opaque to the dispatch core and passed through every middleware layer
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context(Value);

impl Context {
    /// Wraps a JSON value.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Returns the wrapped value.
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the context and returns the wrapped value.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for Context {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
