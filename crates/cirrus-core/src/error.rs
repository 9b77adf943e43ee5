//! Error types for Cirrus.
//!
//! Request-time failures are carried by [`Error`]. Every error has an
//! [`ErrorKind`], and kinds form a closed, static hierarchy: each kind names
//! its parent, and the chain always ends at the universal root [`ERROR`].
//! Exception handlers are registered against kinds (or status codes), and
//! resolution walks from the raised kind towards the root, so a handler for
//! a broad kind also catches every kind below it.
//!
//! # Built-in kinds
//!
//! | Kind | Parent | Raised by |
//! |---|---|---|
//! | [`ERROR`] | none | anything unanticipated (`anyhow::Error`) |
//! | [`HTTP_ERROR`] | [`ERROR`] | [`HttpError`], routing failures |
//! | [`RUNTIME_ERROR`] | [`ERROR`] | application code |
//! | [`IO_ERROR`] | [`ERROR`] | `std::io::Error` |
//! | [`VALUE_ERROR`] | [`ERROR`] | `serde_json::Error` |
//!
//! # Declaring kinds
//!
//! Kinds are compared by identity, so they must be declared as `static`
//! items (a `const` would be duplicated at every use site):
//!
//! ```
//! use cirrus_core::{Error, ErrorKind, RUNTIME_ERROR};
//!
//! static STORAGE_ERROR: ErrorKind = ErrorKind::new("StorageError", &RUNTIME_ERROR);
//! static NOT_CACHED: ErrorKind = ErrorKind::new("NotCached", &STORAGE_ERROR);
//!
//! let err = Error::new(&NOT_CACHED, "key evicted");
//! assert!(err.is(&STORAGE_ERROR));
//! assert!(err.is(&RUNTIME_ERROR));
//! assert!(!err.is(&cirrus_core::HTTP_ERROR));
//! ```

use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error as StdError;
use std::fmt;
use std::hash::{Hash, Hasher};

use http::StatusCode;
use thiserror::Error;

use crate::headers::Headers;

/// Result type alias using [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A node in the static error-kind hierarchy.
///
/// Equality and hashing use the address of the `static`, never the name, so
/// two kinds with the same name in different modules stay distinct.
pub struct ErrorKind {
    name: &'static str,
    parent: Option<&'static ErrorKind>,
}

impl ErrorKind {
    /// Declares a root kind with no parent.
    ///
    /// Only [`ERROR`] should normally be a root; a kind that does not descend
    /// from it is invisible to the catch-all boundary's registry lookup
    /// (the boundary still renders it as a 500).
    #[must_use]
    pub const fn root(name: &'static str) -> Self {
        Self { name, parent: None }
    }

    /// Declares a kind below `parent`.
    #[must_use]
    pub const fn new(name: &'static str, parent: &'static ErrorKind) -> Self {
        Self {
            name,
            parent: Some(parent),
        }
    }

    /// Returns the display name of this kind.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the direct parent kind, if any.
    #[must_use]
    pub const fn parent(&self) -> Option<&'static ErrorKind> {
        self.parent
    }

    /// Iterates this kind and then each ancestor, most-derived first.
    pub fn ancestors(&'static self) -> Ancestors {
        Ancestors { next: Some(self) }
    }

    /// Returns true if this kind is `other` or descends from it.
    #[must_use]
    pub fn is_a(&'static self, other: &ErrorKind) -> bool {
        self.ancestors().any(|kind| kind == other)
    }
}

impl PartialEq for ErrorKind {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl Eq for ErrorKind {}

impl Hash for ErrorKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self, state);
    }
}

impl fmt::Debug for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Iterator over a kind and its ancestors. See [`ErrorKind::ancestors`].
#[derive(Debug, Clone)]
pub struct Ancestors {
    next: Option<&'static ErrorKind>,
}

impl Iterator for Ancestors {
    type Item = &'static ErrorKind;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent;
        Some(current)
    }
}

/// The universal root kind. A handler registered here catches everything.
pub static ERROR: ErrorKind = ErrorKind::root("Error");

/// Typed HTTP errors carrying a status code.
pub static HTTP_ERROR: ErrorKind = ErrorKind::new("HttpError", &ERROR);

/// General application failures.
pub static RUNTIME_ERROR: ErrorKind = ErrorKind::new("RuntimeError", &ERROR);

/// I/O failures.
pub static IO_ERROR: ErrorKind = ErrorKind::new("IoError", &ERROR);

/// Encoding and decoding failures of values.
pub static VALUE_ERROR: ErrorKind = ErrorKind::new("ValueError", &ERROR);

/// An HTTP error with an explicit status code.
///
/// Raising one from a handler (via `?` or `Err(..into())`) produces a
/// response with that status, the detail as body and the given headers,
/// unless an exception handler registered for the status code or for
/// [`HTTP_ERROR`] renders it differently.
///
/// # Example
///
/// ```
/// use cirrus_core::HttpError;
/// use http::StatusCode;
///
/// let err = HttpError::new(StatusCode::NOT_FOUND);
/// assert_eq!(err.detail(), "Not Found");
///
/// let err = HttpError::new(StatusCode::CONFLICT).with_detail("version mismatch");
/// assert_eq!(err.to_string(), "409 Conflict: version mismatch");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{status}: {detail}")]
pub struct HttpError {
    status: StatusCode,
    detail: String,
    headers: Headers,
}

impl HttpError {
    /// Creates an error whose detail is the status' canonical reason.
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            detail: status.canonical_reason().unwrap_or_default().to_string(),
            headers: Headers::new(),
        }
    }

    /// A `404 Not Found` error.
    #[must_use]
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND)
    }

    /// A `405 Method Not Allowed` error carrying the `Allow` header.
    #[must_use]
    pub fn method_not_allowed(allow: impl Into<String>) -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED).with_header("Allow", allow)
    }

    /// A `400 Bad Request` error with the given detail.
    #[must_use]
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST).with_detail(detail)
    }

    /// Replaces the detail message. An empty detail keeps the canonical reason.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        if !detail.is_empty() {
            self.detail = detail;
        }
        self
    }

    /// Appends a header to send with the rendered response.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the detail message.
    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Returns the headers to send with the rendered response.
    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }
}

/// An error raised while handling a request.
///
/// `Error` deliberately does not implement [`std::error::Error`], so that
/// the `From` conversions below can coexist with `?` on foreign errors. Use
/// [`Error::source`] to walk the underlying cause.
pub struct Error {
    inner: Box<ErrorImpl>,
}

struct ErrorImpl {
    kind: &'static ErrorKind,
    message: String,
    http: Option<HttpError>,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
    backtrace: Backtrace,
}

impl Error {
    /// Creates an error of the given kind.
    #[must_use]
    pub fn new(kind: &'static ErrorKind, message: impl Into<String>) -> Self {
        Self {
            inner: Box::new(ErrorImpl {
                kind,
                message: message.into(),
                http: None,
                source: None,
                backtrace: Backtrace::capture(),
            }),
        }
    }

    /// Creates an HTTP error tagged with a custom kind.
    ///
    /// `kind` should descend from [`HTTP_ERROR`] so that handlers registered
    /// for HTTP errors keep catching it.
    #[must_use]
    pub fn http_with_kind(kind: &'static ErrorKind, http: HttpError) -> Self {
        let mut err = Self::new(kind, http.detail().to_string());
        err.inner.http = Some(http);
        err
    }

    /// Attaches an underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.inner.source = Some(Box::new(source));
        self
    }

    /// Returns the kind of this error.
    #[must_use]
    pub fn kind(&self) -> &'static ErrorKind {
        self.inner.kind
    }

    /// Returns true if this error's kind is `kind` or descends from it.
    #[must_use]
    pub fn is(&self, kind: &ErrorKind) -> bool {
        self.inner.kind.is_a(kind)
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.inner.message
    }

    /// Returns the HTTP payload, if this error carries a status code.
    #[must_use]
    pub fn http(&self) -> Option<&HttpError> {
        self.inner.http.as_ref()
    }

    /// Returns the underlying cause, if any.
    #[must_use]
    pub fn source(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        self.inner.source.as_deref()
    }

    /// Returns the backtrace captured at construction.
    ///
    /// Capture follows `RUST_BACKTRACE` / `RUST_LIB_BACKTRACE`.
    #[must_use]
    pub fn backtrace(&self) -> &Backtrace {
        &self.inner.backtrace
    }

    /// Renders kind, message, cause chain and backtrace (when captured).
    ///
    /// Used as the response body by the debug-mode error boundary.
    #[must_use]
    pub fn report(&self) -> String {
        let mut out = format!("{self}\n");

        let mut cause: Option<&(dyn StdError + 'static)> = self
            .source()
            .map(|s| s as &(dyn StdError + 'static));
        if cause.is_some() {
            out.push_str("\nCaused by:\n");
        }
        let mut depth = 0;
        while let Some(err) = cause {
            out.push_str(&format!("    {depth}: {err}\n"));
            depth += 1;
            cause = err.source();
        }

        if self.backtrace().status() == BacktraceStatus::Captured {
            out.push_str(&format!("\nStack backtrace:\n{}", self.backtrace()));
        }
        out
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.inner.kind, self.inner.message)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.inner.kind)
            .field("message", &self.inner.message)
            .field("http", &self.inner.http)
            .field("source", &self.inner.source)
            .finish_non_exhaustive()
    }
}

impl From<HttpError> for Error {
    fn from(http: HttpError) -> Self {
        Self::http_with_kind(&HTTP_ERROR, http)
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        let message = err.to_string();
        let source: Box<dyn StdError + Send + Sync + 'static> = err.into();
        let mut out = Self::new(&ERROR, message);
        out.inner.source = Some(source);
        out
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::new(&IO_ERROR, err.to_string()).with_source(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::new(&VALUE_ERROR, err.to_string()).with_source(err)
    }
}
