//! Route path patterns.
//!
//! A pattern is a `/`-separated path in which whole segments may be
//! templated as `{name}` or `{name:converter}`:
//!
//! | Converter | Matches |
//! |---|---|
//! | `str` (default) | one non-empty segment |
//! | `int` | one segment of ASCII digits that fits an `i64` |
//! | `path` | the non-empty remainder of the path, slashes included |
//!
//! Patterns are compiled once when a route is registered. Matching is
//! exact: `/items` does not match `/items/`.

use std::fmt;

use cirrus_core::PathParams;

use crate::error::RouterError;

/// How a templated segment accepts text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Converter {
    /// One non-empty segment.
    Str,
    /// One segment of ASCII digits parsing as `i64`.
    Int,
    /// The remainder of the path.
    Path,
}

impl Converter {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "str" => Some(Self::Str),
            "int" => Some(Self::Int),
            "path" => Some(Self::Path),
            _ => None,
        }
    }

    fn accepts(self, text: &str) -> bool {
        match self {
            Self::Str | Self::Path => !text.is_empty(),
            Self::Int => {
                !text.is_empty()
                    && text.bytes().all(|b| b.is_ascii_digit())
                    && text.parse::<i64>().is_ok()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Static(String),
    Param { name: String, converter: Converter },
}

/// A compiled route path.
///
/// # Example
///
/// ```rust
/// use cirrus_router::PathPattern;
///
/// let pattern = PathPattern::compile("/orgs/{org}/repos/{id:int}").unwrap();
///
/// let params = pattern.matches("/orgs/acme/repos/42").unwrap();
/// assert_eq!(params.get("org"), Some("acme"));
/// assert_eq!(params.get("id"), Some("42"));
///
/// assert!(pattern.matches("/orgs/acme/repos/latest").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
    param_count: usize,
}

impl PathPattern {
    /// Compiles a pattern.
    ///
    /// # Errors
    ///
    /// Returns a [`RouterError`] for unknown converters, duplicate names,
    /// malformed or partially templated segments, and a `path` parameter
    /// that is not the final segment.
    pub fn compile(pattern: &str) -> Result<Self, RouterError> {
        let parts: Vec<&str> = pattern.split('/').collect();
        let last = parts.len() - 1;
        let mut segments = Vec::with_capacity(parts.len());
        let mut names: Vec<&str> = Vec::new();

        for (index, part) in parts.iter().enumerate() {
            let Some(inner) = part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) else {
                if part.contains(['{', '}']) {
                    return Err(RouterError::invalid(
                        pattern,
                        format!("segment `{part}` is partially templated"),
                    ));
                }
                segments.push(Segment::Static((*part).to_string()));
                continue;
            };

            if inner.contains(['{', '}']) {
                return Err(RouterError::invalid(
                    pattern,
                    format!("nested braces in `{part}`"),
                ));
            }

            let (name, converter_name) = inner.split_once(':').unwrap_or((inner, "str"));
            if !is_identifier(name) {
                return Err(RouterError::invalid(
                    pattern,
                    format!("`{name}` is not a valid parameter name"),
                ));
            }
            let converter =
                Converter::parse(converter_name).ok_or_else(|| RouterError::UnknownConverter {
                    pattern: pattern.to_string(),
                    converter: converter_name.to_string(),
                })?;
            if names.contains(&name) {
                return Err(RouterError::DuplicateParam {
                    pattern: pattern.to_string(),
                    name: name.to_string(),
                });
            }
            if converter == Converter::Path && index != last {
                return Err(RouterError::PathNotLast {
                    pattern: pattern.to_string(),
                    name: name.to_string(),
                });
            }

            names.push(name);
            segments.push(Segment::Param {
                name: name.to_string(),
                converter,
            });
        }

        Ok(Self {
            source: pattern.to_string(),
            segments,
            param_count: names.len(),
        })
    }

    /// Matches a request path, returning the captured parameters.
    #[must_use]
    pub fn matches(&self, path: &str) -> Option<PathParams> {
        let mut params = PathParams::with_capacity(self.param_count);
        let mut remaining = Some(path);

        for segment in &self.segments {
            let current = remaining?;

            if let Segment::Param {
                name,
                converter: Converter::Path,
            } = segment
            {
                if !Converter::Path.accepts(current) {
                    return None;
                }
                params.push(name.as_str(), current);
                return Some(params);
            }

            let (head, tail) = match current.split_once('/') {
                Some((head, tail)) => (head, Some(tail)),
                None => (current, None),
            };

            match segment {
                Segment::Static(literal) if literal == head => {}
                Segment::Param { name, converter } if converter.accepts(head) => {
                    params.push(name.as_str(), head);
                }
                _ => return None,
            }
            remaining = tail;
        }

        remaining.is_none().then_some(params)
    }

    /// Returns the pattern text as registered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns true if the pattern has no parameters.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.param_count == 0
    }

    /// Iterates the parameter names in order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param { name, .. } => Some(name.as_str()),
            Segment::Static(_) => None,
        })
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_static_exact() {
        let pattern = PathPattern::compile("/users").unwrap();
        assert!(pattern.is_static());
        assert!(pattern.matches("/users").is_some());
        assert!(pattern.matches("/users/").is_none());
        assert!(pattern.matches("/user").is_none());
        assert!(pattern.matches("users").is_none());
    }

    #[test]
    fn test_root() {
        let pattern = PathPattern::compile("/").unwrap();
        assert!(pattern.matches("/").is_some());
        assert!(pattern.matches("").is_none());
        assert!(pattern.matches("/a").is_none());
    }

    #[test]
    fn test_str_param() {
        let pattern = PathPattern::compile("/users/{id}").unwrap();
        assert_eq!(pattern.matches("/users/abc").unwrap().get("id"), Some("abc"));
        assert!(pattern.matches("/users/").is_none());
        assert!(pattern.matches("/users/a/b").is_none());
    }

    #[test]
    fn test_int_param() {
        let pattern = PathPattern::compile("/n/{n:int}").unwrap();
        assert_eq!(pattern.matches("/n/0042").unwrap().get("n"), Some("0042"));
        assert!(pattern.matches("/n/-1").is_none());
        assert!(pattern.matches("/n/1.5").is_none());
        assert!(pattern.matches("/n/99999999999999999999").is_none());
    }

    #[test]
    fn test_path_param() {
        let pattern = PathPattern::compile("/files/{rest:path}").unwrap();
        assert_eq!(
            pattern.matches("/files/img/logo.png").unwrap().get("rest"),
            Some("img/logo.png")
        );
        assert_eq!(
            pattern.matches("/files/dir/").unwrap().get("rest"),
            Some("dir/")
        );
        assert!(pattern.matches("/files/").is_none());
        assert!(pattern.matches("/files").is_none());
    }

    #[test]
    fn test_param_names() {
        let pattern = PathPattern::compile("/a/{x}/b/{y:int}").unwrap();
        assert_eq!(pattern.param_names().collect::<Vec<_>>(), ["x", "y"]);
        assert_eq!(pattern.to_string(), "/a/{x}/b/{y:int}");
    }

    #[test]
    fn test_unknown_converter() {
        assert!(matches!(
            PathPattern::compile("/x/{id:uuid}"),
            Err(RouterError::UnknownConverter { converter, .. }) if converter == "uuid"
        ));
    }

    #[test]
    fn test_duplicate_param() {
        assert!(matches!(
            PathPattern::compile("/{id}/{id:int}"),
            Err(RouterError::DuplicateParam { name, .. }) if name == "id"
        ));
    }

    #[test]
    fn test_partial_template_rejected() {
        for bad in ["/items/{id", "/items/id}", "/items/pre{id}", "/{a{b}}", "/{}", "/{1x}"] {
            assert!(
                matches!(PathPattern::compile(bad), Err(RouterError::InvalidPattern { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_path_must_be_last() {
        assert!(matches!(
            PathPattern::compile("/{p:path}/tail"),
            Err(RouterError::PathNotLast { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_static_matches_only_itself(
            segments in prop::collection::vec("[a-z0-9_.-]{1,8}", 0..5),
            other in "/[a-z0-9/]{0,20}",
        ) {
            let path = format!("/{}", segments.join("/"));
            let pattern = PathPattern::compile(&path).unwrap();
            prop_assert!(pattern.matches(&path).is_some());
            prop_assert_eq!(pattern.matches(&other).is_some(), other == path);
        }

        #[test]
        fn prop_str_param_captures_segment(value in "[^/]{1,16}") {
            let pattern = PathPattern::compile("/items/{id}").unwrap();
            let path = format!("/items/{value}");
            let params = pattern.matches(&path).unwrap();
            prop_assert_eq!(params.get("id"), Some(value.as_str()));
        }

        #[test]
        fn prop_int_param_accepts_i64(n in 0_i64..=i64::MAX) {
            let pattern = PathPattern::compile("/n/{n:int}").unwrap();
            let path = format!("/n/{n}");
            let text = n.to_string();
            let params = pattern.matches(&path).unwrap();
            prop_assert_eq!(params.get("n"), Some(text.as_str()));
        }
    }
}
