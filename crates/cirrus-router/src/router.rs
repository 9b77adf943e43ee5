//! The ordered route table.

use cirrus_core::{BoxHandler, Context, Error, Handler, HttpError, PathParams, Request, Response, Service};
use http::Method;

use crate::error::RouterError;
use crate::method_router::MethodRouter;
use crate::route::Route;

/// The outcome of matching a path and method.
#[derive(Debug)]
pub enum RouteMatch<'a> {
    /// No route's pattern matches the path.
    None,
    /// The first route whose pattern matches does not allow the method.
    Partial {
        /// That route.
        route: &'a Route,
    },
    /// A route matches both path and method.
    Full {
        /// The matched route.
        route: &'a Route,
        /// The handler bound to the method.
        handler: &'a BoxHandler,
        /// Parameters captured from the path.
        params: PathParams,
    },
}

/// The discriminant of a [`RouteMatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    /// See [`RouteMatch::None`].
    None,
    /// See [`RouteMatch::Partial`].
    Partial,
    /// See [`RouteMatch::Full`].
    Full,
}

impl RouteMatch<'_> {
    /// Returns which variant this is.
    #[must_use]
    pub fn kind(&self) -> MatchKind {
        match self {
            Self::None => MatchKind::None,
            Self::Partial { .. } => MatchKind::Partial,
            Self::Full { .. } => MatchKind::Full,
        }
    }
}

/// An ordered list of routes.
///
/// Routes are tried in registration order and the first one whose path
/// pattern matches decides the outcome, whatever its methods. A later route
/// with the same path never sees requests the first one rejects with `405`.
///
/// # Example
///
/// ```rust
/// use cirrus_core::{Error, Request};
/// use cirrus_router::{MatchKind, Router};
/// use http::Method;
///
/// let mut router = Router::new();
/// router
///     .route("/users/{id:int}", [Method::GET], |_: &Request| Ok::<_, Error>("user"))
///     .unwrap();
///
/// assert_eq!(router.match_route("/users/7", &Method::GET).kind(), MatchKind::Full);
/// assert_eq!(router.match_route("/users/7", &Method::POST).kind(), MatchKind::Partial);
/// assert_eq!(router.match_route("/users/me", &Method::GET).kind(), MatchKind::None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a compiled route.
    pub fn add_route(&mut self, route: Route) -> &mut Self {
        self.routes.push(route);
        self
    }

    /// Compiles and appends a route sharing one handler across `methods`.
    ///
    /// # Errors
    ///
    /// Returns a [`RouterError`] if the route is invalid.
    pub fn route<F, R>(
        &mut self,
        path: &str,
        methods: impl IntoIterator<Item = Method>,
        handler: F,
    ) -> Result<&mut Self, RouterError>
    where
        F: Fn(&Request) -> Result<R, Error> + Send + Sync + 'static,
        R: cirrus_core::IntoResponse,
    {
        let route = Route::new(path, methods, BoxHandler::from_fn(handler))?;
        Ok(self.add_route(route))
    }

    /// Compiles and appends a route with per-method handlers.
    ///
    /// # Errors
    ///
    /// Returns a [`RouterError`] if the route is invalid.
    pub fn endpoint(&mut self, path: &str, methods: MethodRouter) -> Result<&mut Self, RouterError> {
        let route = Route::endpoint(path, methods)?;
        Ok(self.add_route(route))
    }

    /// Matches a path and method.
    #[must_use]
    pub fn match_route(&self, path: &str, method: &Method) -> RouteMatch<'_> {
        for route in &self.routes {
            let Some(params) = route.match_path(path) else {
                continue;
            };
            return match route.handler_for(method) {
                Some(handler) => RouteMatch::Full {
                    route,
                    handler,
                    params,
                },
                None => RouteMatch::Partial { route },
            };
        }
        RouteMatch::None
    }

    /// Returns the routes in registration order.
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Returns the number of routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Service for Router {
    fn call(&self, request: &Request, _ctx: &Context) -> Result<Response, Error> {
        match self.match_route(request.path(), request.method()) {
            RouteMatch::Full {
                route,
                handler,
                params,
            } => {
                tracing::debug!(
                    method = %request.method(),
                    path = request.path(),
                    route = route.path(),
                    "route matched"
                );
                handler.call(&request.with_path_params(params))
            }
            RouteMatch::Partial { route } => {
                tracing::debug!(
                    method = %request.method(),
                    path = request.path(),
                    route = route.path(),
                    allow = %route.allow_header(),
                    "method not allowed"
                );
                Err(route.method_not_allowed().into())
            }
            RouteMatch::None => {
                tracing::debug!(method = %request.method(), path = request.path(), "no route matched");
                Err(HttpError::not_found().into())
            }
        }
    }
}
