//! # Cirrus Test
//!
//! In-process testing for Cirrus applications. Requests are turned into
//! synthetic invocation events and dispatched through a built
//! [`App`](cirrus::App) exactly as the host would, with no host runtime.
//!
//! ## Example
//!
//! ```
//! use cirrus::prelude::*;
//! use cirrus_test::TestClient;
//! use serde_json::json;
//!
//! let app = App::builder()
//!     .post("/users", |req: &Request| {
//!         let user: serde_json::Value = req.json()?;
//!         Ok((user, 201))
//!     })
//!     .build()
//!     .unwrap();
//!
//! let client = TestClient::new(app);
//! let response = client
//!     .post("/users")
//!     .json(&json!({"name": "Alice"}))
//!     .send();
//!
//! assert_eq!(response.status_code(), Some(201));
//! assert_eq!(response.json_value().unwrap()["name"], "Alice");
//! ```

#![doc(html_root_url = "https://docs.rs/cirrus-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::{TestRequest, TestRequestBuilder};
pub use response::TestResponse;
