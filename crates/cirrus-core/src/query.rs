//! Query-string and form multimap.

use crate::error::HttpError;

/// An ordered multimap of decoded `application/x-www-form-urlencoded` pairs.
///
/// Used both for the request query string and for form bodies. Unlike
/// [`Headers`](crate::Headers), keys are case-sensitive and [`get`](Self::get)
/// returns the *last* value, so `?page=1&page=2` reads as `page=2`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Creates an empty multimap.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses an urlencoded string. A leading `?` is ignored.
    ///
    /// # Errors
    ///
    /// Returns a 400 [`HttpError`] if the input is not valid urlencoding.
    pub fn parse(input: &str) -> Result<Self, HttpError> {
        let input = input.strip_prefix('?').unwrap_or(input);
        serde_urlencoded::from_str::<Vec<(String, String)>>(input)
            .map(|pairs| Self { pairs })
            .map_err(|e| HttpError::bad_request(format!("invalid urlencoded data: {e}")))
    }

    /// Returns the last value for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates every value for `key` in order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if `key` is present.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Appends a pair.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Iterates all pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns true if there are no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Re-encodes the pairs as an urlencoded string.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        serde_urlencoded::to_string(&self.pairs).unwrap_or_default()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            pairs: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_get_last() {
        let q = QueryParams::parse("page=1&sort=asc&page=2").unwrap();
        assert_eq!(q.get("page"), Some("2"));
        assert_eq!(q.get_all("page").collect::<Vec<_>>(), ["1", "2"]);
        assert_eq!(q.get("sort"), Some("asc"));
        assert_eq!(q.get("missing"), None);
    }

    #[test]
    fn test_parse_decodes() {
        let q = QueryParams::parse("?name=J%C3%BCrgen+M&tag=a%26b").unwrap();
        assert_eq!(q.get("name"), Some("Jürgen M"));
        assert_eq!(q.get("tag"), Some("a&b"));
    }

    #[test]
    fn test_parse_empty() {
        assert!(QueryParams::parse("").unwrap().is_empty());
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let q = QueryParams::parse("Key=1").unwrap();
        assert!(q.contains("Key"));
        assert!(!q.contains("key"));
    }

    #[test]
    fn test_to_query_string() {
        let q: QueryParams = [("a", "1 2"), ("b", "x")].into_iter().collect();
        assert_eq!(q.to_query_string(), "a=1+2&b=x");
    }
}
