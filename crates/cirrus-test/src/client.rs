//! In-process test client.

use std::fmt;
use std::sync::Arc;

use cirrus::App;
use cirrus_core::{Context, Headers};
use http::Method;
use serde::Serialize;
use serde_json::Value;

use crate::error::TestError;
use crate::request::{TestRequest, TestRequestBuilder};
use crate::response::TestResponse;

/// Dispatches synthetic events through a built [`App`].
///
/// Requests go through the full dispatch path: event parsing, the error
/// boundary, every middleware layer, exception resolution, and routing.
///
/// # Example
///
/// ```
/// use cirrus::prelude::*;
/// use cirrus_test::TestClient;
///
/// let app = App::builder()
///     .get("/ping", |_: &Request| Ok("pong"))
///     .build()
///     .unwrap();
///
/// let client = TestClient::new(app);
/// let response = client.get("/ping").send();
/// assert_eq!(response.status_code(), Some(200));
/// assert_eq!(response.text().unwrap(), "pong");
/// ```
#[must_use]
#[derive(Clone)]
pub struct TestClient {
    app: Arc<App>,
    default_headers: Headers,
    context: Context,
}

impl TestClient {
    /// Creates a client for `app`.
    pub fn new(app: App) -> Self {
        Self::from_arc(Arc::new(app))
    }

    /// Creates a client sharing an already shared app.
    pub fn from_arc(app: Arc<App>) -> Self {
        Self {
            app,
            default_headers: Headers::new(),
            context: Context::default(),
        }
    }

    /// Returns the app under test.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Adds a header sent with every request that doesn't set it.
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.append(name, value);
        self
    }

    /// Sets the context used by requests that don't set their own.
    pub fn with_context(mut self, context: impl Into<Context>) -> Self {
        self.context = context.into();
        self
    }

    /// Creates a GET request builder.
    pub fn get(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::get(uri))
    }

    /// Creates a POST request builder.
    pub fn post(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::post(uri))
    }

    /// Creates a PUT request builder.
    pub fn put(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::put(uri))
    }

    /// Creates a PATCH request builder.
    pub fn patch(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::patch(uri))
    }

    /// Creates a DELETE request builder.
    pub fn delete(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::delete(uri))
    }

    /// Creates an OPTIONS request builder.
    pub fn options(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::options(uri))
    }

    /// Creates a HEAD request builder.
    pub fn head(&self, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequest::head(uri))
    }

    /// Creates a request builder with a custom method.
    pub fn request(&self, method: Method, uri: impl AsRef<str>) -> TestClientRequest<'_> {
        TestClientRequest::new(self, TestRequestBuilder::new(method, uri))
    }

    /// Dispatches a built request.
    pub fn dispatch(&self, request: &TestRequest) -> TestResponse {
        self.app.dispatch(&request.event, &request.context).into()
    }

    /// Hands a raw JSON event to the app, as the host would.
    pub fn handle_raw(&self, event: Value) -> Value {
        self.app.handle(event, &self.context)
    }
}

impl fmt::Debug for TestClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestClient")
            .field("app", &self.app.name())
            .field("default_headers", &self.default_headers)
            .finish_non_exhaustive()
    }
}

/// A request builder bound to a test client.
#[must_use]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    builder: TestRequestBuilder,
}

impl<'a> TestClientRequest<'a> {
    fn new(client: &'a TestClient, builder: TestRequestBuilder) -> Self {
        Self { client, builder }
    }

    /// Appends a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.builder = self.builder.header(name, value);
        self
    }

    /// Sets the Content-Type header.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.builder = self.builder.content_type(content_type);
        self
    }

    /// Sets the Authorization header with a Bearer token.
    pub fn bearer_token(mut self, token: impl AsRef<str>) -> Self {
        self.builder = self.builder.bearer_token(token);
        self
    }

    /// Adds an encoded query pair.
    pub fn query(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.builder = self.builder.query(key, value);
        self
    }

    /// Sets the text body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.builder = self.builder.body(body);
        self
    }

    /// Sets a binary body, sent base64-encoded.
    pub fn binary(mut self, body: impl AsRef<[u8]>) -> Self {
        self.builder = self.builder.binary(body);
        self
    }

    /// Sets a JSON body.
    pub fn json<T: Serialize>(mut self, value: &T) -> Self {
        self.builder = self.builder.json(value);
        self
    }

    /// Sets a form-encoded body.
    pub fn form<T: Serialize>(mut self, value: &T) -> Self {
        self.builder = self.builder.form(value);
        self
    }

    /// Adds an extra top-level event parameter.
    pub fn parameter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.builder = self.builder.parameter(key, value);
        self
    }

    /// Sets the invocation context for this request.
    pub fn context(mut self, context: impl Into<Context>) -> Self {
        self.builder = self.builder.context(context);
        self
    }

    /// Sends the request.
    ///
    /// # Panics
    ///
    /// Panics if the request could not be built.
    #[track_caller]
    pub fn send(self) -> TestResponse {
        match self.try_send() {
            Ok(response) => response,
            Err(e) => panic!("failed to build test request: {e}"),
        }
    }

    /// Sends the request, returning build failures.
    ///
    /// # Errors
    ///
    /// Returns an error if a body or query value could not be encoded.
    pub fn try_send(self) -> Result<TestResponse, TestError> {
        let request = self
            .builder
            .default_headers(&self.client.default_headers)
            .default_context(&self.client.context)
            .build()?;
        Ok(self.client.dispatch(&request))
    }
}
