//! # Cirrus
//!
//! **Synchronous request dispatch for serverless HTTP functions**
//!
//! Cirrus turns one serverless invocation event into a normalized
//! [`Request`](cirrus_core::Request), routes it by path and method, runs
//! the handler inside a middleware stack, resolves raised errors into
//! responses, and serializes the outcome as a `{body, statusCode, headers}`
//! wire result.
//!
//! ## Quick Start
//!
//! ```
//! use cirrus::prelude::*;
//! use serde_json::json;
//!
//! let app = App::builder()
//!     .get("/items/{id}", |req: &Request| {
//!         Ok((format!("item {}", req.path_param("id").unwrap_or_default()), 200))
//!     })
//!     .build()
//!     .unwrap();
//!
//! let out = app.handle(
//!     json!({"http": {"method": "POST", "path": "/items/42"}}),
//!     &Context::default(),
//! );
//! assert_eq!(
//!     out,
//!     json!({"body": "Method Not Allowed", "statusCode": 405, "headers": {"Allow": "GET"}})
//! );
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Event → ServerErrorMiddleware → user middleware → ExceptionMiddleware → Router → handler
//!                                                                                    ↓
//! WireResult ←──────────────────────── Response ←────────────────────────────────────┘
//! ```

#![doc(html_root_url = "https://docs.rs/cirrus/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod app;
mod builder;
mod error;

pub use app::App;
pub use builder::AppBuilder;
pub use error::BuildError;

pub use cirrus_config as config;
pub use cirrus_core as core;
pub use cirrus_middleware as middleware;
pub use cirrus_router as router;
pub use cirrus_telemetry as telemetry;

/// Prelude module for convenient imports.
///
/// ```
/// use cirrus::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{App, AppBuilder, BuildError};

    pub use cirrus_core::{
        Body, Context, Error, ErrorKind, Event, HttpError, HttpEvent, IntoResponse, Json, Request,
        Response, WireResult, ERROR, HTTP_ERROR, IO_ERROR, RUNTIME_ERROR, VALUE_ERROR,
    };

    pub use cirrus_middleware::{
        FnMiddleware, Middleware, Next, RequestIdMiddleware, TelemetryMiddleware,
    };

    pub use cirrus_router::MethodRouter;

    pub use http::{Method, StatusCode};
}
