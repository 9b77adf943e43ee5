//! The dispatch entry point.

use std::fmt;
use std::sync::Arc;

use cirrus_core::{
    service_fn, Context, Error, Event, HttpError, Request, Service, WireResult, VALUE_ERROR,
};
use cirrus_middleware::{BoxedMiddleware, ServerErrorMiddleware, Stack};
use serde_json::Value;

use crate::builder::AppBuilder;

/// A built application: the full middleware stack around the router.
///
/// Immutable once built. An `App` is `Send + Sync` and meant to be built
/// once per process and shared by every invocation.
pub struct App {
    name: String,
    boundary: ServerErrorMiddleware,
    stack: Stack,
    /// The stack's layers, kept to re-wrap events that never reach the router.
    layers: Vec<BoxedMiddleware>,
}

impl App {
    pub(crate) fn new(
        name: String,
        boundary: ServerErrorMiddleware,
        stack: Stack,
        layers: Vec<BoxedMiddleware>,
    ) -> Self {
        Self {
            name,
            boundary,
            stack,
            layers,
        }
    }

    /// Creates an application builder.
    #[must_use]
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    /// Returns the application name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if unhandled errors render as debug reports.
    #[must_use]
    pub fn is_debug(&self) -> bool {
        self.boundary.debug()
    }

    /// Returns the layer names, outermost first.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        std::iter::once("server_error")
            .chain(self.stack.stage_names().iter().copied())
            .collect()
    }

    /// Dispatches one event.
    ///
    /// Never fails: every error is rendered by a handler or the boundary.
    ///
    /// - A non-web event yields `{"body": "Internal Server Error"}`
    /// - A web event with an invalid method or query string raises a `400`
    ///   through the full stack, so middleware and exception handlers see it
    /// - Anything else runs through the stack
    pub fn dispatch(&self, event: &Event, ctx: &Context) -> WireResult {
        let span = tracing::info_span!(
            "dispatch",
            app = %self.name,
            method = event.http.as_ref().map(|h| h.method.as_str()),
            path = event.http.as_ref().map(|h| h.path.as_str()),
        );
        let _entered = span.enter();

        if !event.is_web() {
            let error = Error::new(&VALUE_ERROR, "event has no `http` member");
            return self.boundary.reject(&error, false);
        }

        let request = match Request::from_event(event) {
            Ok(request) => request,
            Err(http) => {
                tracing::warn!(status = http.status().as_u16(), detail = http.detail(), "malformed web event");
                let request = Request::from_rejected_event(event);
                return self.boundary.guard(&request, ctx, &self.rejecting(http)).into();
            }
        };

        self.boundary.guard(&request, ctx, &self.stack).into()
    }

    /// The stack's layers around a service that raises `http` in place of
    /// routing.
    fn rejecting(&self, http: HttpError) -> Stack {
        self.layers
            .iter()
            .fold(Stack::builder(), |stack, layer| stack.layer_arc(Arc::clone(layer)))
            .build(service_fn(move |_: &Request, _: &Context| Err(http.clone().into())))
    }

    /// Dispatches a raw JSON event and returns the raw JSON result.
    ///
    /// An event that does not deserialize is rejected like a non-web
    /// event, or with a `500` if it has an `http` member.
    pub fn handle(&self, event: Value, ctx: &Context) -> Value {
        let is_web = event.get("http").is_some_and(Value::is_object);
        match serde_json::from_value::<Event>(event) {
            Ok(event) => self.dispatch(&event, ctx).into_value(),
            Err(err) => self.boundary.reject(&Error::from(err), is_web).into_value(),
        }
    }

    /// Calls the stack directly, without the catch-all boundary.
    ///
    /// Errors no exception handler claims are returned as-is.
    pub fn call(&self, request: &Request, ctx: &Context) -> Result<cirrus_core::Response, Error> {
        self.stack.call(request, ctx)
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("name", &self.name)
            .field("boundary", &self.boundary)
            .field("stack", &self.stack)
            .finish_non_exhaustive()
    }
}
