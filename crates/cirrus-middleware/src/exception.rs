//! Exception handler registry and the middleware that applies it.
//!
//! Handlers are keyed either by HTTP status code or by [`ErrorKind`].
//! Resolution of a raised [`Error`]:
//!
//! 1. an error carrying an [`HttpError`](cirrus_core::HttpError) payload
//!    whose status is registered resolves to that handler
//! 2. otherwise the error's kind and then each ancestor, most-derived
//!    first, is looked up and the first hit wins
//! 3. otherwise nothing resolves and the error keeps propagating
//!
//! A handler registered for a broad kind is therefore the fallback for
//! every kind below it that has no handler of its own.

use std::fmt;
use std::sync::Arc;

use cirrus_core::{Context, Error, ErrorKind, IntoResponse, Request, Response, ERROR, HTTP_ERROR};
use http::StatusCode;
use indexmap::IndexMap;

use crate::handlers::http_error_response;
use crate::middleware::{Middleware, Next};

/// What an exception handler is registered against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKey {
    /// An HTTP status code, matched against the error's `HttpError` payload.
    Status(StatusCode),
    /// An error kind, matched against the error's kind and its ancestors.
    Kind(&'static ErrorKind),
}

impl HandlerKey {
    /// Returns true for the keys the catch-all boundary owns: status `500`
    /// and the root kind [`ERROR`].
    #[must_use]
    pub fn is_boundary(&self) -> bool {
        match self {
            Self::Status(status) => *status == StatusCode::INTERNAL_SERVER_ERROR,
            Self::Kind(kind) => *kind == &ERROR,
        }
    }
}

impl From<StatusCode> for HandlerKey {
    fn from(status: StatusCode) -> Self {
        Self::Status(status)
    }
}

impl From<&'static ErrorKind> for HandlerKey {
    fn from(kind: &'static ErrorKind) -> Self {
        Self::Kind(kind)
    }
}

impl fmt::Display for HandlerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(status) => write!(f, "{}", status.as_u16()),
            Self::Kind(kind) => write!(f, "{kind}"),
        }
    }
}

/// A function that renders a resolved error into a response.
///
/// Exception handlers are infallible: whatever they return is the response.
#[derive(Clone)]
pub struct ExceptionHandler(Arc<dyn Fn(&Request, &Error) -> Response + Send + Sync>);

impl ExceptionHandler {
    /// Wraps a function returning anything convertible into a response.
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn(&Request, &Error) -> R + Send + Sync + 'static,
        R: IntoResponse,
    {
        Self(Arc::new(move |request, error| f(request, error).into_response()))
    }

    /// Renders `error`.
    #[must_use]
    pub fn handle(&self, request: &Request, error: &Error) -> Response {
        (self.0)(request, error)
    }
}

impl fmt::Debug for ExceptionHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ExceptionHandler")
    }
}

/// A registry of exception handlers.
///
/// # Example
///
/// ```
/// use cirrus_core::{Error, ErrorKind, Request, RUNTIME_ERROR};
/// use cirrus_middleware::ExceptionHandlers;
///
/// static DB_ERROR: ErrorKind = ErrorKind::new("DbError", &RUNTIME_ERROR);
///
/// let mut handlers = ExceptionHandlers::new();
/// handlers.insert(&RUNTIME_ERROR, |_: &Request, _: &Error| ("runtime", 500));
///
/// let err = Error::new(&DB_ERROR, "connection reset");
/// assert!(handlers.resolve(&err).is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExceptionHandlers {
    handlers: IndexMap<HandlerKey, ExceptionHandler>,
}

impl ExceptionHandlers {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the `HTTP_ERROR` default renderer.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut handlers = Self::new();
        handlers.insert(&HTTP_ERROR, http_error_response);
        handlers
    }

    /// Registers a handler, replacing any handler under the same key.
    pub fn insert<K, F, R>(&mut self, key: K, handler: F) -> &mut Self
    where
        K: Into<HandlerKey>,
        F: Fn(&Request, &Error) -> R + Send + Sync + 'static,
        R: IntoResponse,
    {
        self.insert_handler(key, ExceptionHandler::new(handler))
    }

    /// Registers an already wrapped handler.
    pub fn insert_handler(&mut self, key: impl Into<HandlerKey>, handler: ExceptionHandler) -> &mut Self {
        self.handlers.insert(key.into(), handler);
        self
    }

    /// Registers `handler` only if nothing is registered under `key`.
    pub fn insert_default(&mut self, key: impl Into<HandlerKey>, handler: ExceptionHandler) -> &mut Self {
        self.handlers.entry(key.into()).or_insert(handler);
        self
    }

    /// Removes the handler registered under `key`.
    pub fn remove(&mut self, key: impl Into<HandlerKey>) -> Option<ExceptionHandler> {
        self.handlers.shift_remove(&key.into())
    }

    /// Returns the handler registered exactly under `key`.
    #[must_use]
    pub fn get(&self, key: impl Into<HandlerKey>) -> Option<&ExceptionHandler> {
        self.handlers.get(&key.into())
    }

    /// Returns true if a handler is registered exactly under `key`.
    #[must_use]
    pub fn contains(&self, key: impl Into<HandlerKey>) -> bool {
        self.handlers.contains_key(&key.into())
    }

    /// Finds the handler for a raised error.
    #[must_use]
    pub fn resolve(&self, error: &Error) -> Option<&ExceptionHandler> {
        if let Some(http) = error.http() {
            if let Some(handler) = self.handlers.get(&HandlerKey::Status(http.status())) {
                return Some(handler);
            }
        }

        error
            .kind()
            .ancestors()
            .find_map(|kind| self.handlers.get(&HandlerKey::Kind(kind)))
    }

    /// Splits off the handlers the catch-all boundary owns.
    ///
    /// Returns the last-registered handler keyed by status `500` or kind
    /// [`ERROR`], and a registry with every other entry.
    #[must_use]
    pub fn split_boundary(self) -> (Option<ExceptionHandler>, Self) {
        let mut boundary = None;
        let mut rest = IndexMap::with_capacity(self.handlers.len());
        for (key, handler) in self.handlers {
            if key.is_boundary() {
                boundary = Some(handler);
            } else {
                rest.insert(key, handler);
            }
        }
        (boundary, Self { handlers: rest })
    }

    /// Iterates the registered keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &HandlerKey> {
        self.handlers.keys()
    }

    /// Returns the number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// Resolves errors raised by the inner chain against a registry.
///
/// Resolved errors become responses; unresolved ones propagate to the
/// next enclosing layer unchanged.
#[derive(Debug, Clone, Default)]
pub struct ExceptionMiddleware {
    handlers: ExceptionHandlers,
}

impl ExceptionMiddleware {
    /// Creates the middleware around a registry.
    #[must_use]
    pub fn new(handlers: ExceptionHandlers) -> Self {
        Self { handlers }
    }

    /// Returns the registry.
    #[must_use]
    pub fn handlers(&self) -> &ExceptionHandlers {
        &self.handlers
    }
}

impl Middleware for ExceptionMiddleware {
    fn name(&self) -> &'static str {
        "exception"
    }

    fn process(&self, request: &Request, ctx: &Context, next: Next<'_>) -> Result<Response, Error> {
        let error = match next.run(request, ctx) {
            Ok(response) => return Ok(response),
            Err(error) => error,
        };

        let Some(handler) = self.handlers.resolve(&error) else {
            tracing::debug!(kind = %error.kind(), "no exception handler, propagating");
            return Err(error);
        };

        match error.http().map(cirrus_core::HttpError::status) {
            Some(status) if status.is_client_error() => tracing::warn!(
                method = %request.method(),
                path = request.path(),
                status = status.as_u16(),
                detail = error.message(),
                "request rejected"
            ),
            _ => tracing::info!(
                method = %request.method(),
                path = request.path(),
                kind = %error.kind(),
                error = error.message(),
                "error resolved by exception handler"
            ),
        }

        Ok(handler.handle(request, &error))
    }
}
