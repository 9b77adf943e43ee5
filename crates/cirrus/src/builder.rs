//! Application wiring.

use std::fmt;
use std::sync::Arc;

use cirrus_config::CirrusConfig;
use cirrus_core::{Error, IntoResponse, Request, HTTP_ERROR};
use cirrus_middleware::handlers::http_error_response;
use cirrus_middleware::{
    BoxedMiddleware, ExceptionHandler, ExceptionHandlers, ExceptionMiddleware, HandlerKey,
    Middleware, ServerErrorMiddleware, Stack,
};
use cirrus_router::{MethodRouter, Route, Router, RouterError};
use http::Method;

use crate::app::App;
use crate::error::BuildError;

macro_rules! route_fn {
    ($($fn_name:ident => $method:ident),* $(,)?) => {
        $(
            #[doc = concat!("Registers a `", stringify!($method), "` route.")]
            #[must_use]
            pub fn $fn_name<F, R>(self, path: &str, handler: F) -> Self
            where
                F: Fn(&Request) -> Result<R, Error> + Send + Sync + 'static,
                R: IntoResponse,
            {
                self.route(path, [Method::$method], handler)
            }
        )*
    };
}

/// Collects routes, middleware and exception handlers for an [`App`].
///
/// Registration never fails on the spot: the first invalid route is kept
/// and returned by [`build`](Self::build).
///
/// # Example
///
/// ```
/// use cirrus::prelude::*;
///
/// let app = App::builder()
///     .get("/items/{id:int}", |req: &Request| {
///         let id: i64 = req.path_params().get_as("id")?;
///         Ok((format!("item {id}"), 200))
///     })
///     .build()
///     .unwrap();
///
/// let wire = app.dispatch(&Event::web(HttpEvent::new("GET", "/items/42")), &Context::default());
/// assert_eq!(wire.status_code, Some(200));
/// ```
#[derive(Default)]
pub struct AppBuilder {
    name: Option<String>,
    router: Router,
    middleware: Vec<BoxedMiddleware>,
    handlers: ExceptionHandlers,
    debug: bool,
    error: Option<BuildError>,
}

impl AppBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder with settings taken from a loaded configuration.
    ///
    /// Only `app.name` and `app.debug` shape the application. Logging and
    /// metrics are process-wide, so the caller installs them once from
    /// [`CirrusConfig::telemetry`] before dispatching:
    ///
    /// ```no_run
    /// use cirrus::config::ConfigLoader;
    /// use cirrus::prelude::*;
    ///
    /// let config = ConfigLoader::new().with_env_prefix("ORDERS").load().unwrap();
    /// let metrics = cirrus::telemetry::init_telemetry(&config.telemetry()).unwrap();
    ///
    /// let app = AppBuilder::from_config(&config)
    ///     .get("/health", |_: &Request| Ok("ok"))
    ///     .build()
    ///     .unwrap();
    /// # let _ = (app, metrics);
    /// ```
    #[must_use]
    pub fn from_config(config: &CirrusConfig) -> Self {
        Self::new()
            .name(config.app.name.clone())
            .debug(config.app.debug)
    }

    /// Sets the application name recorded on dispatch spans.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Registers a handler for `path` under every method in `methods`.
    #[must_use]
    pub fn route<F, R>(mut self, path: &str, methods: impl IntoIterator<Item = Method>, handler: F) -> Self
    where
        F: Fn(&Request) -> Result<R, Error> + Send + Sync + 'static,
        R: IntoResponse,
    {
        if let Err(error) = self.router.route(path, methods, handler) {
            self.record(error);
        }
        self
    }

    route_fn! {
        get => GET,
        post => POST,
        put => PUT,
        patch => PATCH,
        delete => DELETE,
    }

    /// Registers per-method handlers for `path`.
    #[must_use]
    pub fn endpoint(mut self, path: &str, methods: MethodRouter) -> Self {
        if let Err(error) = self.router.endpoint(path, methods) {
            self.record(error);
        }
        self
    }

    /// Registers an already compiled route.
    #[must_use]
    pub fn add_route(mut self, route: Route) -> Self {
        self.router.add_route(route);
        self
    }

    /// Adds a user middleware as the outermost user layer.
    ///
    /// Layers added later wrap layers added earlier.
    #[must_use]
    pub fn middleware<M: Middleware>(mut self, middleware: M) -> Self {
        self.middleware.insert(0, Arc::new(middleware));
        self
    }

    /// Registers an exception handler for a status code or error kind.
    ///
    /// Handlers for status `500` or kind [`ERROR`](cirrus_core::ERROR)
    /// replace the catch-all boundary's rendering.
    #[must_use]
    pub fn exception_handler<K, F, R>(mut self, key: K, handler: F) -> Self
    where
        K: Into<HandlerKey>,
        F: Fn(&Request, &Error) -> R + Send + Sync + 'static,
        R: IntoResponse,
    {
        self.handlers.insert(key, handler);
        self
    }

    /// Enables debug reports for unhandled errors.
    #[must_use]
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Assembles the stack.
    ///
    /// ```text
    /// ServerErrorMiddleware → user middleware → ExceptionMiddleware → Router
    /// ```
    ///
    /// # Errors
    ///
    /// Returns the first route registration error.
    pub fn build(self) -> Result<App, BuildError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let (boundary, mut handlers) = self.handlers.split_boundary();
        handlers.insert_default(&HTTP_ERROR, ExceptionHandler::new(http_error_response));

        let mut layers = self.middleware;
        layers.push(Arc::new(ExceptionMiddleware::new(handlers)));

        let stack = layers
            .iter()
            .fold(Stack::builder(), |stack, layer| stack.layer_arc(Arc::clone(layer)))
            .build(self.router);

        tracing::debug!(stages = ?stack.stage_names(), "application built");

        Ok(App::new(
            self.name.unwrap_or_else(|| "cirrus".to_string()),
            ServerErrorMiddleware::new(boundary, self.debug),
            stack,
            layers,
        ))
    }

    fn record(&mut self, error: RouterError) {
        tracing::error!(error = %error, "route registration failed");
        if self.error.is_none() {
            self.error = Some(error.into());
        }
    }
}

impl fmt::Debug for AppBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppBuilder")
            .field("name", &self.name)
            .field("routes", &self.router.len())
            .field(
                "middleware",
                &self.middleware.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("debug", &self.debug)
            .field("error", &self.error)
            .finish()
    }
}
