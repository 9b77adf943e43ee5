//! The service abstraction shared by the router and every middleware layer.

use std::sync::Arc;

use crate::error::Error;
use crate::event::Context;
use crate::request::Request;
use crate::response::Response;

/// Anything that answers a request within an invocation context.
///
/// The router, each route and each middleware link are services, which is
/// what lets layers wrap each other without knowing what is inside.
pub trait Service: Send + Sync + 'static {
    /// Answers a request or raises an error.
    fn call(&self, request: &Request, ctx: &Context) -> Result<Response, Error>;
}

impl<S: Service + ?Sized> Service for Arc<S> {
    fn call(&self, request: &Request, ctx: &Context) -> Result<Response, Error> {
        (**self).call(request, ctx)
    }
}

impl<S: Service + ?Sized> Service for Box<S> {
    fn call(&self, request: &Request, ctx: &Context) -> Result<Response, Error> {
        (**self).call(request, ctx)
    }
}

/// Adapts a closure into a [`Service`].
///
/// ```
/// use cirrus_core::{service_fn, Context, Request, Response, Service};
///
/// let svc = service_fn(|req: &Request, _: &Context| Ok(Response::text(req.path())));
/// let response = svc.call(&Request::builder().path("/a").build(), &Context::default()).unwrap();
/// assert!(response.body().is_some());
/// ```
pub fn service_fn<F>(f: F) -> ServiceFn<F>
where
    F: Fn(&Request, &Context) -> Result<Response, Error> + Send + Sync + 'static,
{
    ServiceFn(f)
}

/// A [`Service`] built from a closure. See [`service_fn`].
#[derive(Clone, Copy)]
pub struct ServiceFn<F>(F);

impl<F> std::fmt::Debug for ServiceFn<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ServiceFn")
    }
}

impl<F> Service for ServiceFn<F>
where
    F: Fn(&Request, &Context) -> Result<Response, Error> + Send + Sync + 'static,
{
    fn call(&self, request: &Request, ctx: &Context) -> Result<Response, Error> {
        (self.0)(request, ctx)
    }
}
