//! Route registration errors.

use thiserror::Error;

/// An invalid route definition.
///
/// Raised while routes are registered, never while requests are served.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// A parameter names a converter other than `str`, `int` or `path`.
    #[error("unknown converter `{converter}` in route pattern `{pattern}`")]
    UnknownConverter {
        /// The offending pattern.
        pattern: String,
        /// The converter name.
        converter: String,
    },

    /// The same parameter name appears twice.
    #[error("duplicate parameter `{name}` in route pattern `{pattern}`")]
    DuplicateParam {
        /// The offending pattern.
        pattern: String,
        /// The repeated name.
        name: String,
    },

    /// Braces are unbalanced, empty, or mixed with literal text in one segment.
    #[error("invalid route pattern `{pattern}`: {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A `path` parameter is followed by further segments.
    #[error("`path` parameter `{name}` must be the last segment of `{pattern}`")]
    PathNotLast {
        /// The offending pattern.
        pattern: String,
        /// The parameter name.
        name: String,
    },

    /// A route was given no methods.
    #[error("route `{pattern}` has no methods")]
    NoMethods {
        /// The offending pattern.
        pattern: String,
    },
}

impl RouterError {
    pub(crate) fn invalid(pattern: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.into(),
        }
    }
}
