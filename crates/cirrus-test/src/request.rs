//! Test request building.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use cirrus_core::{Context, Event, Headers, HttpEvent};
use http::{header, Method};
use serde::Serialize;
use serde_json::Value;

use crate::error::TestError;

/// A built test invocation: the event plus the context it runs with.
#[derive(Debug, Clone, PartialEq)]
pub struct TestRequest {
    /// The event handed to the application.
    pub event: Event,
    /// The invocation context.
    pub context: Context,
}

impl TestRequest {
    /// Creates a new GET request.
    pub fn get(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::GET, uri)
    }

    /// Creates a new POST request.
    pub fn post(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::POST, uri)
    }

    /// Creates a new PUT request.
    pub fn put(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::PUT, uri)
    }

    /// Creates a new PATCH request.
    pub fn patch(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::PATCH, uri)
    }

    /// Creates a new DELETE request.
    pub fn delete(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::DELETE, uri)
    }

    /// Creates a new OPTIONS request.
    pub fn options(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::OPTIONS, uri)
    }

    /// Creates a new HEAD request.
    pub fn head(uri: impl AsRef<str>) -> TestRequestBuilder {
        TestRequestBuilder::new(Method::HEAD, uri)
    }

    /// Serializes the event as the host would deliver it.
    pub fn to_json(&self) -> Result<Value, TestError> {
        Ok(serde_json::to_value(&self.event)?)
    }
}

/// Builder for constructing test requests.
///
/// The URI may carry a query string (`/items?page=2`); it is split off
/// into the event's `queryString`.
///
/// # Example
///
/// ```
/// use cirrus_test::TestRequest;
///
/// let request = TestRequest::post("/users?notify=1")
///     .header("x-tenant", "acme")
///     .json(&serde_json::json!({"name": "Alice"}))
///     .build()
///     .unwrap();
///
/// let http = request.event.http.unwrap();
/// assert_eq!(http.path, "/users");
/// assert_eq!(http.query_string.as_deref(), Some("notify=1"));
/// assert_eq!(http.headers.get("content-type"), Some("application/json"));
/// ```
#[must_use]
#[derive(Debug, Clone)]
pub struct TestRequestBuilder {
    method: Method,
    path: String,
    query: Vec<String>,
    headers: Headers,
    body: Option<String>,
    is_base64_encoded: bool,
    parameters: serde_json::Map<String, Value>,
    context: Context,
    error: Option<String>,
}

impl TestRequestBuilder {
    /// Creates a new request builder.
    pub fn new(method: Method, uri: impl AsRef<str>) -> Self {
        let uri = uri.as_ref();
        let (path, query) = match uri.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (uri, None),
        };

        Self {
            method,
            path: path.to_string(),
            query: query
                .filter(|q| !q.is_empty())
                .map(str::to_string)
                .into_iter()
                .collect(),
            headers: Headers::new(),
            body: None,
            is_base64_encoded: false,
            parameters: serde_json::Map::new(),
            context: Context::default(),
            error: None,
        }
    }

    /// Appends a header value.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Sets the Content-Type header.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.headers
            .insert(header::CONTENT_TYPE.as_str(), content_type);
        self
    }

    /// Sets the Authorization header with a Bearer token.
    pub fn bearer_token(mut self, token: impl AsRef<str>) -> Self {
        self.headers.insert(
            header::AUTHORIZATION.as_str(),
            format!("Bearer {}", token.as_ref()),
        );
        self
    }

    /// Appends one urlencoded query pair.
    pub fn query(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        match serde_urlencoded::to_string([(key.as_ref(), value.as_ref())]) {
            Ok(pair) => self.query.push(pair),
            Err(e) => self.fail(e.to_string()),
        }
        self
    }

    /// Sets a raw query string, replacing any pairs added so far.
    pub fn raw_query(mut self, query: impl Into<String>) -> Self {
        self.query = vec![query.into()];
        self
    }

    /// Sets a text body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self.is_base64_encoded = false;
        self
    }

    /// Sets a binary body, base64-encoded on the event.
    pub fn binary(mut self, body: impl AsRef<[u8]>) -> Self {
        self.body = Some(STANDARD.encode(body));
        self.is_base64_encoded = true;
        self
    }

    /// Sets a JSON body and `content-type: application/json`.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => {
                self = self.content_type("application/json").body(body);
            }
            Err(e) => self.fail(e.to_string()),
        }
        self
    }

    /// Sets a urlencoded form body.
    pub fn form<T: Serialize>(mut self, value: &T) -> Self {
        match serde_urlencoded::to_string(value) {
            Ok(body) => {
                self = self
                    .content_type("application/x-www-form-urlencoded")
                    .body(body);
            }
            Err(e) => self.fail(e.to_string()),
        }
        self
    }

    /// Adds an extra top-level event parameter.
    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Sets the invocation context.
    pub fn context(mut self, context: impl Into<Context>) -> Self {
        self.context = context.into();
        self
    }

    pub(crate) fn default_headers(mut self, defaults: &Headers) -> Self {
        for (name, value) in defaults.iter() {
            if !self.headers.contains(name) {
                self.headers.append(name, value);
            }
        }
        self
    }

    pub(crate) fn default_context(mut self, context: &Context) -> Self {
        if self.context == Context::default() {
            self.context = context.clone();
        }
        self
    }

    /// Builds the request.
    ///
    /// # Errors
    ///
    /// Returns [`TestError::RequestBuild`] if a body or query value could
    /// not be encoded.
    pub fn build(self) -> Result<TestRequest, TestError> {
        if let Some(error) = self.error {
            return Err(TestError::RequestBuild(error));
        }

        let query_string = if self.query.is_empty() {
            None
        } else {
            Some(self.query.join("&"))
        };

        let http = HttpEvent {
            method: self.method.to_string(),
            path: self.path,
            headers: self.headers,
            query_string,
            body: self.body,
            is_base64_encoded: self.is_base64_encoded,
        };

        Ok(TestRequest {
            event: Event {
                http: Some(http),
                parameters: self.parameters,
            },
            context: self.context,
        })
    }

    fn fail(&mut self, error: String) {
        self.error.get_or_insert(error);
    }
}
