//! A single compiled route.

use cirrus_core::{BoxHandler, Context, Error, Handler, HttpError, PathParams, Request, Response, Service};
use http::Method;

use crate::error::RouterError;
use crate::method_router::MethodRouter;
use crate::pattern::PathPattern;

/// A path pattern with its method bindings.
///
/// A route is also a [`Service`] on its own: called directly it raises
/// `404` when the path does not match and `405` when the method is not
/// bound, exactly as the [`Router`](crate::Router) does.
#[derive(Debug, Clone)]
pub struct Route {
    pattern: PathPattern,
    methods: MethodRouter,
}

impl Route {
    /// Creates a route sharing one handler across `methods`.
    ///
    /// Repeated methods are bound once.
    ///
    /// # Errors
    ///
    /// Returns a [`RouterError`] if the pattern does not compile or
    /// `methods` is empty.
    ///
    /// # Example
    ///
    /// ```rust
    /// use cirrus_core::{BoxHandler, Error, Request};
    /// use cirrus_router::Route;
    /// use http::Method;
    ///
    /// let handler = BoxHandler::from_fn(|_: &Request| Ok::<_, Error>("ok"));
    /// let route = Route::new("/health", [Method::GET, Method::HEAD], handler).unwrap();
    /// assert_eq!(route.allow_header(), "GET, HEAD");
    /// ```
    pub fn new(
        path: &str,
        methods: impl IntoIterator<Item = Method>,
        handler: impl Handler,
    ) -> Result<Self, RouterError> {
        let handler = BoxHandler::new(handler);
        let bindings = methods
            .into_iter()
            .fold(MethodRouter::new(), |router, method| {
                if router.allows(&method) {
                    router
                } else {
                    router.with_handler(method, handler.clone())
                }
            });
        Self::endpoint(path, bindings)
    }

    /// Creates a route with distinct handlers per method.
    ///
    /// # Errors
    ///
    /// Returns a [`RouterError`] if the pattern does not compile or no
    /// method is bound.
    pub fn endpoint(path: &str, methods: MethodRouter) -> Result<Self, RouterError> {
        let pattern = PathPattern::compile(path)?;
        if methods.is_empty() {
            return Err(RouterError::NoMethods {
                pattern: path.to_string(),
            });
        }
        Ok(Self { pattern, methods })
    }

    /// Returns the compiled pattern.
    #[must_use]
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Returns the pattern text.
    #[must_use]
    pub fn path(&self) -> &str {
        self.pattern.as_str()
    }

    /// Returns the method bindings.
    #[must_use]
    pub fn method_router(&self) -> &MethodRouter {
        &self.methods
    }

    /// Iterates the allowed methods in binding order.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.methods()
    }

    /// Returns the `Allow` header value for this route.
    #[must_use]
    pub fn allow_header(&self) -> String {
        self.methods.allow_header()
    }

    /// Matches a path against this route's pattern.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<PathParams> {
        self.pattern.matches(path)
    }

    /// Returns the handler bound to `method`.
    #[must_use]
    pub fn handler_for(&self, method: &Method) -> Option<&BoxHandler> {
        self.methods.handler_for(method)
    }

    /// Builds the `405` error for this route.
    #[must_use]
    pub fn method_not_allowed(&self) -> HttpError {
        HttpError::method_not_allowed(self.allow_header())
    }
}

impl Service for Route {
    fn call(&self, request: &Request, _ctx: &Context) -> Result<Response, Error> {
        let params = self
            .match_path(request.path())
            .ok_or_else(HttpError::not_found)?;
        let handler = self
            .handler_for(request.method())
            .ok_or_else(|| self.method_not_allowed())?;
        handler.call(&request.with_path_params(params))
    }
}
