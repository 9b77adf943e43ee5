//! # Cirrus Core
//!
//! Value types shared by every Cirrus crate:
//!
//! - [`Event`] / [`HttpEvent`] / [`Context`] - the raw invocation input
//! - [`Request`] - the normalized, immutable request
//! - [`Response`] and [`IntoResponse`] - what handlers return
//! - [`WireResult`] and [`to_wire`] - the `{body, statusCode, headers}` output
//! - [`Error`], [`ErrorKind`] and [`HttpError`] - raised errors and their kind hierarchy
//! - [`Handler`] and [`Service`] - the call shapes routes and middleware implement
//!
//! Nothing here routes or dispatches; see `cirrus-router` and
//! `cirrus-middleware` for that.

#![doc(html_root_url = "https://docs.rs/cirrus-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod event;
mod handler;
mod headers;
mod params;
mod query;
mod request;
mod response;
mod service;
mod wire;

pub use error::{
    Ancestors, Error, ErrorKind, HttpError, Result, ERROR, HTTP_ERROR, IO_ERROR, RUNTIME_ERROR,
    VALUE_ERROR,
};
pub use event::{Context, Event, HttpEvent};
pub use handler::{BoxHandler, Handler};
pub use headers::Headers;
pub use params::PathParams;
pub use query::QueryParams;
pub use request::{Request, RequestBuilder};
pub use response::{Body, IntoResponse, IntoStatus, Json, Response};
pub use service::{service_fn, Service, ServiceFn};
pub use wire::{to_wire, WireResult};
