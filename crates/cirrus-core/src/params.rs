//! Path parameters captured by the router.
//!
//! Storage uses a small vector so the common case of one to four
//! parameters never touches the heap.

use std::str::FromStr;

use http::StatusCode;
use smallvec::SmallVec;

use crate::error::HttpError;

/// Number of parameters stored inline.
const INLINE_PARAMS: usize = 4;

/// Named values captured from a templated route path.
///
/// Values are kept as the raw path text. Typed access goes through
/// [`get_as`](Self::get_as).
///
/// # Example
///
/// ```rust
/// use cirrus_core::PathParams;
///
/// let mut params = PathParams::new();
/// params.push("userId", "123");
/// params.push("action", "view");
///
/// assert_eq!(params.get("userId"), Some("123"));
/// assert_eq!(params.get_as::<i64>("userId").ok(), Some(123));
/// assert_eq!(params.get("unknown"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PathParams {
    inner: SmallVec<[(String, String); INLINE_PARAMS]>,
}

impl PathParams {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parameter set with the given capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: SmallVec::with_capacity(capacity),
        }
    }

    /// Adds a parameter.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Returns the raw value of a parameter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Parses a parameter into `T`.
    ///
    /// # Errors
    ///
    /// Returns a 400 [`HttpError`] if the parameter is missing or does not
    /// parse. A missing parameter is a routing mistake, but surfacing it as a
    /// client error keeps handlers free of panics.
    pub fn get_as<T: FromStr>(&self, name: &str) -> Result<T, HttpError> {
        let raw = self.get(name).ok_or_else(|| {
            HttpError::new(StatusCode::BAD_REQUEST)
                .with_detail(format!("missing path parameter `{name}`"))
        })?;
        raw.parse().map_err(|_| {
            HttpError::new(StatusCode::BAD_REQUEST)
                .with_detail(format!("invalid path parameter `{name}`: {raw}"))
        })
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Iterates `(name, value)` pairs in pattern order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<'a> IntoIterator for &'a PathParams {
    type Item = (&'a str, &'a str);
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, (String, String)>,
        fn(&'a (String, String)) -> (&'a str, &'a str),
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PathParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            inner: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
