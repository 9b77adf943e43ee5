//! Ordered middleware composition.
//!
//! A [`Stack`] is an immutable chain of middleware around one inner
//! service. Layers are listed outermost first: for the list `[A, B]`
//! around service `R`, a request travels `A → B → R → B → A`.
//!
//! The chain is built from the inner service outward. Each layer is bound
//! to a [`Link`](crate::middleware::Link) that owns the link below it, so
//! the built stack is a single owned value with no shared mutable state.

use std::fmt;
use std::sync::Arc;

use cirrus_core::{Context, Error, Request, Response, Service};

use crate::middleware::{Link, Middleware};

/// A type-erased middleware that can be stored in a list.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// A built middleware chain.
///
/// # Example
///
/// ```
/// use cirrus_core::{service_fn, Context, Request, Response, Service};
/// use cirrus_middleware::{FnMiddleware, Stack};
///
/// let stack = Stack::builder()
///     .layer(FnMiddleware::new("outer", |req: &Request, ctx: &Context, next| next.run(req, ctx)))
///     .layer(FnMiddleware::new("inner", |req: &Request, ctx: &Context, next| next.run(req, ctx)))
///     .build(service_fn(|_: &Request, _: &Context| Ok(Response::text("done"))));
///
/// assert_eq!(stack.stage_names(), ["outer", "inner"]);
/// assert!(stack.call(&Request::builder().build(), &Context::default()).is_ok());
/// ```
pub struct Stack {
    chain: Box<dyn Service>,
    names: Vec<&'static str>,
}

impl Stack {
    /// Creates a new stack builder.
    #[must_use]
    pub fn builder() -> StackBuilder {
        StackBuilder::new()
    }

    /// Returns the layer names, outermost first.
    #[must_use]
    pub fn stage_names(&self) -> &[&'static str] {
        &self.names
    }

    /// Returns the number of layers.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.names.len()
    }
}

impl Service for Stack {
    fn call(&self, request: &Request, ctx: &Context) -> Result<Response, Error> {
        self.chain.call(request, ctx)
    }
}

impl fmt::Debug for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stack")
            .field("stages", &self.names)
            .finish_non_exhaustive()
    }
}

/// Collects layers for a [`Stack`].
#[derive(Default, Clone)]
pub struct StackBuilder {
    layers: Vec<BoxedMiddleware>,
}

impl StackBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a layer inside the ones already listed.
    #[must_use]
    pub fn layer<M: Middleware>(mut self, middleware: M) -> Self {
        self.layers.push(Arc::new(middleware));
        self
    }

    /// Appends an already shared layer inside the ones already listed.
    #[must_use]
    pub fn layer_arc(mut self, middleware: BoxedMiddleware) -> Self {
        self.layers.push(middleware);
        self
    }

    /// Inserts a layer outside the ones already listed.
    #[must_use]
    pub fn prepend<M: Middleware>(mut self, middleware: M) -> Self {
        self.layers.insert(0, Arc::new(middleware));
        self
    }

    /// Returns the number of layers collected so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns true if no layer was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Wraps `inner` in the collected layers.
    #[must_use]
    pub fn build(self, inner: impl Service) -> Stack {
        let names = self.layers.iter().map(|m| m.name()).collect();

        let mut chain: Box<dyn Service> = Box::new(inner);
        for middleware in self.layers.into_iter().rev() {
            chain = Box::new(Link::new(middleware, chain));
        }

        Stack { chain, names }
    }
}

impl fmt::Debug for StackBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackBuilder")
            .field("stages", &self.layers.iter().map(|m| m.name()).collect::<Vec<_>>())
            .finish()
    }
}
