//! Core middleware trait and types.
//!
//! This module defines the [`Middleware`] trait that every layer of the
//! stack implements. A middleware sees the request on the way in, decides
//! whether to call the rest of the chain through [`Next`], and sees the
//! result (or the raised error) on the way out.
//!
//! # Example
//!
//! ```
//! use cirrus_core::{Context, Error, Request, Response};
//! use cirrus_middleware::{Middleware, Next};
//!
//! struct PoweredBy;
//!
//! impl Middleware for PoweredBy {
//!     fn name(&self) -> &'static str {
//!         "powered_by"
//!     }
//!
//!     fn process(&self, request: &Request, ctx: &Context, next: Next<'_>) -> Result<Response, Error> {
//!         let response = next.run(request, ctx)?;
//!         Ok(response.with_header("x-powered-by", "cirrus"))
//!     }
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use cirrus_core::{Context, Error, Request, Response, Service};

/// A layer wrapped around an inner service.
///
/// # Invariants
///
/// - A middleware calls `next.run()` at most once
/// - Returning `Ok` without calling `next` short-circuits the chain
/// - Returning `Err` hands the error to the next enclosing layer
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name of this layer, used in logs and introspection.
    fn name(&self) -> &'static str;

    /// Processes a request.
    fn process(&self, request: &Request, ctx: &Context, next: Next<'_>) -> Result<Response, Error>;
}

impl<M: Middleware + ?Sized> Middleware for Arc<M> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn process(&self, request: &Request, ctx: &Context, next: Next<'_>) -> Result<Response, Error> {
        (**self).process(request, ctx, next)
    }
}

/// The rest of the chain below a middleware.
///
/// Consumed by [`run`](Self::run), so it can only be called once.
pub struct Next<'a> {
    inner: &'a dyn Service,
}

impl<'a> Next<'a> {
    /// Wraps the inner service.
    pub fn new(inner: &'a dyn Service) -> Self {
        Self { inner }
    }

    /// Calls the inner service.
    pub fn run(self, request: &Request, ctx: &Context) -> Result<Response, Error> {
        self.inner.call(request, ctx)
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Next")
    }
}

/// One link of a built chain: a middleware owning the link below it.
pub(crate) struct Link {
    middleware: Arc<dyn Middleware>,
    next: Box<dyn Service>,
}

impl Link {
    pub(crate) fn new(middleware: Arc<dyn Middleware>, next: Box<dyn Service>) -> Self {
        Self { middleware, next }
    }
}

impl Service for Link {
    fn call(&self, request: &Request, ctx: &Context) -> Result<Response, Error> {
        self.middleware
            .process(request, ctx, Next::new(self.next.as_ref()))
    }
}

/// A middleware built from a closure.
///
/// # Example
///
/// ```
/// use cirrus_core::{Context, Request};
/// use cirrus_middleware::{FnMiddleware, Middleware, Next};
///
/// let timing = FnMiddleware::new("timing", |req: &Request, ctx: &Context, next: Next<'_>| {
///     let start = std::time::Instant::now();
///     let response = next.run(req, ctx);
///     tracing::debug!(elapsed = ?start.elapsed(), "request finished");
///     response
/// });
/// assert_eq!(timing.name(), "timing");
/// ```
pub struct FnMiddleware<F> {
    name: &'static str,
    func: F,
}

impl<F> FnMiddleware<F>
where
    F: Fn(&Request, &Context, Next<'_>) -> Result<Response, Error> + Send + Sync + 'static,
{
    /// Creates a function-based middleware.
    pub fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

impl<F> fmt::Debug for FnMiddleware<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMiddleware")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(&Request, &Context, Next<'_>) -> Result<Response, Error> + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process(&self, request: &Request, ctx: &Context, next: Next<'_>) -> Result<Response, Error> {
        (self.func)(request, ctx, next)
    }
}
