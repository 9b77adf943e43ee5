//! # Cirrus Middleware
//!
//! Middleware composition and exception resolution for Cirrus.
//!
//! A middleware wraps an inner [`Service`](cirrus_core::Service) and may
//! transform the request's outcome, short-circuit it, or catch the error
//! it raises. Middleware are composed into a [`Stack`] around the router.
//!
//! ## Fixed Stack
//!
//! ```text
//! ServerErrorMiddleware → user middleware → ExceptionMiddleware → Router
//!          ↑                                         │
//!          └─────── unresolved errors ───────────────┘
//! ```
//!
//! | Layer | Purpose |
//! |-------|---------|
//! | [`ServerErrorMiddleware`] | Catch-all boundary; always renders a response |
//! | user middleware | Listed outermost first |
//! | [`ExceptionMiddleware`] | Resolves errors through [`ExceptionHandlers`] |
//!
//! ## Exception Resolution
//!
//! [`ExceptionHandlers`] maps status codes and error kinds to handlers.
//! An error carrying an HTTP status is looked up by status first, then
//! its kind and each ancestor kind is tried in turn.
//!
//! ```
//! use cirrus_core::{Error, ErrorKind, Request, RUNTIME_ERROR};
//! use cirrus_middleware::ExceptionHandlers;
//!
//! static TIMEOUT: ErrorKind = ErrorKind::new("Timeout", &RUNTIME_ERROR);
//!
//! let mut handlers = ExceptionHandlers::with_defaults();
//! handlers.insert(&RUNTIME_ERROR, |_: &Request, err: &Error| (err.message().to_string(), 503));
//!
//! let err = Error::new(&TIMEOUT, "upstream too slow");
//! assert!(handlers.resolve(&err).is_some());
//! ```

#![doc(html_root_url = "https://docs.rs/cirrus-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod errors;
pub mod exception;
pub mod handlers;
pub mod middleware;
pub mod stack;
pub mod stages;

pub use errors::ServerErrorMiddleware;
pub use exception::{ExceptionHandler, ExceptionHandlers, ExceptionMiddleware, HandlerKey};
pub use middleware::{FnMiddleware, Middleware, Next};
pub use stack::{BoxedMiddleware, Stack, StackBuilder};
pub use stages::{RequestIdMiddleware, TelemetryMiddleware};
