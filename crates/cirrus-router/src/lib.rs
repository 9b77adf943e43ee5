//! Ordered path and method router for Cirrus.
//!
//! Routes are kept in registration order and matched linearly. The first
//! route whose path pattern matches decides the result:
//!
//! - method bound → [`RouteMatch::Full`], the handler runs with the captured
//!   path parameters
//! - method not bound → [`RouteMatch::Partial`], a `405` carrying an `Allow`
//!   header is raised
//! - no pattern matches → [`RouteMatch::None`], a `404` is raised
//!
//! # Features
//!
//! - **Path Parameters**: `/users/{id}`, with `str`, `int` and `path` converters
//! - **Method Binding**: one shared handler per route, or per-method handlers
//!   through [`MethodRouter`]
//! - **Compile Once**: patterns are validated at registration and the errors
//!   surface as [`RouterError`]
//!
//! # Example
//!
//! ```rust
//! use cirrus_core::{Context, Error, Request, Service};
//! use cirrus_router::{MethodRouter, Router};
//! use http::Method;
//!
//! let mut router = Router::new();
//! router
//!     .endpoint(
//!         "/items/{id:int}",
//!         MethodRouter::new()
//!             .get(|req: &Request| Ok::<_, Error>(format!("item {}", req.path_param("id").unwrap_or_default())))
//!             .delete(|_: &Request| Ok::<_, Error>(("", 204))),
//!     )
//!     .unwrap();
//!
//! let request = Request::builder().path("/items/42").build();
//! let response = router.call(&request, &Context::default()).unwrap();
//! assert_eq!(response.body().and_then(|b| b.as_text()), Some("item 42"));
//! ```

#![doc(html_root_url = "https://docs.rs/cirrus-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod method_router;
mod pattern;
mod route;
mod router;

pub use error::RouterError;
pub use method_router::MethodRouter;
pub use pattern::{Converter, PathPattern};
pub use route::Route;
pub use router::{MatchKind, RouteMatch, Router};
