//! Per-method handler binding for a single path.
//!
//! [`MethodRouter`] binds handlers to methods in the order they are given.
//! That order is the route's allowed-method set, and the order in which the
//! methods are listed in the `Allow` header of a `405` response.

use cirrus_core::{BoxHandler, Error, Handler, IntoResponse, Request};
use http::Method;

/// Maps methods to handlers for one route.
///
/// # Example
///
/// ```rust
/// use cirrus_core::{Error, Request};
/// use cirrus_router::MethodRouter;
/// use http::Method;
///
/// let methods = MethodRouter::new()
///     .get(|_: &Request| Ok::<_, Error>("list"))
///     .post(|_: &Request| Ok::<_, Error>(("created", 201)));
///
/// assert!(methods.handler_for(&Method::GET).is_some());
/// assert!(methods.handler_for(&Method::DELETE).is_none());
/// assert_eq!(methods.allow_header(), "GET, POST");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MethodRouter {
    handlers: Vec<(Method, BoxHandler)>,
}

macro_rules! method_fn {
    ($($fn_name:ident => $method:ident),* $(,)?) => {
        $(
            #[doc = concat!("Binds a `", stringify!($method), "` handler.")]
            #[must_use]
            pub fn $fn_name<F, R>(self, handler: F) -> Self
            where
                F: Fn(&Request) -> Result<R, Error> + Send + Sync + 'static,
                R: IntoResponse,
            {
                self.on(Method::$method, handler)
            }
        )*
    };
}

impl MethodRouter {
    /// Creates a method router with no bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    method_fn! {
        get => GET,
        head => HEAD,
        post => POST,
        put => PUT,
        patch => PATCH,
        delete => DELETE,
        options => OPTIONS,
    }

    /// Binds a closure to an arbitrary method.
    #[must_use]
    pub fn on<F, R>(self, method: Method, handler: F) -> Self
    where
        F: Fn(&Request) -> Result<R, Error> + Send + Sync + 'static,
        R: IntoResponse,
    {
        self.with_handler(method, BoxHandler::from_fn(handler))
    }

    /// Binds any [`Handler`] to a method.
    ///
    /// Rebinding a method replaces its handler but keeps its position.
    #[must_use]
    pub fn with_handler(mut self, method: Method, handler: impl Handler) -> Self {
        let handler = BoxHandler::new(handler);
        match self.handlers.iter_mut().find(|(m, _)| *m == method) {
            Some(slot) => slot.1 = handler,
            None => self.handlers.push((method, handler)),
        }
        self
    }

    /// Returns the handler bound to `method`.
    #[must_use]
    pub fn handler_for(&self, method: &Method) -> Option<&BoxHandler> {
        self.handlers
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, h)| h)
    }

    /// Returns true if `method` is bound.
    #[must_use]
    pub fn allows(&self, method: &Method) -> bool {
        self.handler_for(method).is_some()
    }

    /// Iterates the bound methods in binding order.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.handlers.iter().map(|(m, _)| m)
    }

    /// Returns the `Allow` header value: bound methods joined by `", "`.
    #[must_use]
    pub fn allow_header(&self) -> String {
        self.methods()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Adds the bindings of `other` whose methods are not bound here yet.
    pub fn merge(&mut self, other: MethodRouter) {
        for (method, handler) in other.handlers {
            if !self.allows(&method) {
                self.handlers.push((method, handler));
            }
        }
    }

    /// Returns the number of bound methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if no method is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
