//! Application build errors.

use cirrus_router::RouterError;
use thiserror::Error;

/// Errors surfaced by [`AppBuilder::build`](crate::AppBuilder::build).
///
/// These are configuration mistakes; none of them can occur while
/// dispatching.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A route failed to compile.
    #[error("invalid route: {0}")]
    Route(#[from] RouterError),
}
