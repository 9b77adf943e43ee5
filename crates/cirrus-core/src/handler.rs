//! Route handlers.
//!
//! A [`Handler`] turns a routed [`Request`] into a [`Response`] or raises an
//! [`Error`]. Any closure or function of shape
//! `Fn(&Request) -> Result<impl IntoResponse, Error>` is a handler.

use std::fmt;
use std::sync::Arc;

use crate::error::Error;
use crate::request::Request;
use crate::response::{IntoResponse, Response};

/// A request handler bound to a route.
///
/// # Example
///
/// ```rust
/// use cirrus_core::{Error, Handler, HttpError, Request};
/// use http::StatusCode;
///
/// fn show(request: &Request) -> Result<(String, u16), Error> {
///     let id: u32 = request.path_params().get_as("id")?;
///     if id == 0 {
///         return Err(HttpError::new(StatusCode::NOT_FOUND).into());
///     }
///     Ok((format!("item {id}"), 200))
/// }
///
/// let request = Request::builder()
///     .build()
///     .with_path_params([("id", "9")].into_iter().collect());
/// let response = show.call(&request).unwrap();
/// assert_eq!(response.status(), Some(StatusCode::OK));
/// ```
pub trait Handler: Send + Sync + 'static {
    /// Handles a request.
    fn call(&self, request: &Request) -> Result<Response, Error>;
}

impl<F, R> Handler for F
where
    F: Fn(&Request) -> Result<R, Error> + Send + Sync + 'static,
    R: IntoResponse,
{
    fn call(&self, request: &Request) -> Result<Response, Error> {
        self(request).map(IntoResponse::into_response)
    }
}

/// A shared, type-erased handler.
#[derive(Clone)]
pub struct BoxHandler(Arc<dyn Handler>);

impl BoxHandler {
    /// Erases a handler.
    pub fn new(handler: impl Handler) -> Self {
        Self(Arc::new(handler))
    }

    /// Erases a closure, letting its argument and error types be inferred.
    pub fn from_fn<F, R>(f: F) -> Self
    where
        F: Fn(&Request) -> Result<R, Error> + Send + Sync + 'static,
        R: IntoResponse,
    {
        Self::new(f)
    }

    /// Returns true if both point at the same handler.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Handler for BoxHandler {
    fn call(&self, request: &Request) -> Result<Response, Error> {
        self.0.call(request)
    }
}

impl fmt::Debug for BoxHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BoxHandler")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{HttpError, RUNTIME_ERROR};
    use crate::response::Body;
    use http::StatusCode;

    fn hello(_: &Request) -> Result<&'static str, Error> {
        Ok("hello")
    }

    #[test]
    fn test_fn_item_is_handler() {
        let response = hello.call(&Request::builder().build()).unwrap();
        assert_eq!(response.body(), Some(&Body::Text("hello".into())));
    }

    #[test]
    fn test_closure_is_handler() {
        let handler = BoxHandler::new(|req: &Request| -> Result<_, Error> {
            Ok((req.path().to_string(), 200))
        });
        let response = handler
            .call(&Request::builder().path("/echo").build())
            .unwrap();
        assert_eq!(response.body(), Some(&Body::Text("/echo".into())));
    }

    #[test]
    fn test_errors_propagate() {
        let handler = BoxHandler::new(|_: &Request| -> Result<Response, Error> {
            Err(HttpError::new(StatusCode::IM_A_TEAPOT).into())
        });
        let err = handler.call(&Request::builder().build()).unwrap_err();
        assert_eq!(err.http().map(HttpError::status), Some(StatusCode::IM_A_TEAPOT));

        let handler = BoxHandler::new(|_: &Request| -> Result<Response, Error> {
            Err(Error::new(&RUNTIME_ERROR, "nope"))
        });
        assert!(handler.call(&Request::builder().build()).unwrap_err().is(&RUNTIME_ERROR));
    }

    #[test]
    fn test_box_handler_clone_shares() {
        let a = BoxHandler::new(hello);
        let b = a.clone();
        assert!(a.ptr_eq(&b));
    }
}
