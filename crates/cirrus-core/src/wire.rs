//! The wire result handed back to the host.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::response::{Body, IntoResponse, Response};

/// The serialized outcome of one invocation.
///
/// Absent fields are omitted entirely, never written as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WireResult {
    /// The body. Binary bodies are base64 strings.
    ///
    /// The wire shape has no `isBase64Encoded` flag, so a base64 body looks
    /// like any text body. Use [`Response::binary`] to send the media type
    /// along with it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,

    /// The status code.
    #[serde(rename = "statusCode", default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    /// Headers, one joined value per name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<IndexMap<String, String>>,
}

impl WireResult {
    /// A result carrying only a body.
    #[must_use]
    pub fn body_only(body: impl Into<Value>) -> Self {
        Self {
            body: Some(body.into()),
            ..Self::default()
        }
    }

    /// Returns true if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_none() && self.status_code.is_none() && self.headers.is_none()
    }

    /// Converts into a JSON value; an empty result becomes `null`.
    #[must_use]
    pub fn into_value(self) -> Value {
        if self.is_empty() {
            return Value::Null;
        }
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl From<Response> for WireResult {
    fn from(response: Response) -> Self {
        let (body, status, headers) = response.into_parts();
        Self {
            body: body.map(body_to_value),
            status_code: status.map(|s| s.as_u16()),
            headers: (!headers.is_empty()).then(|| headers.to_wire_map()),
        }
    }
}

fn body_to_value(body: Body) -> Value {
    match body {
        Body::Text(text) => Value::String(text),
        Body::Binary(bytes) => Value::String(BASE64.encode(bytes)),
        Body::Json(value) => value,
    }
}

/// Normalizes any handler return value into a [`WireResult`].
///
/// ```
/// use cirrus_core::{to_wire, Response};
/// use serde_json::json;
///
/// let wire = to_wire(Response::new().with_body("x").with_status(200));
/// assert_eq!(serde_json::to_value(wire).unwrap(), json!({"body": "x", "statusCode": 200}));
/// ```
pub fn to_wire(value: impl IntoResponse) -> WireResult {
    WireResult::from(value.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::Json;
    use bytes::Bytes;
    use http::StatusCode;
    use serde_json::json;

    fn wire_json(value: impl IntoResponse) -> Value {
        serde_json::to_value(to_wire(value)).unwrap()
    }

    #[test]
    fn test_response_shape() {
        assert_eq!(
            wire_json(Response::new().with_body("x").with_status(200)),
            json!({"body": "x", "statusCode": 200})
        );
    }

    #[test]
    fn test_single_tuple_shape() {
        assert_eq!(wire_json(("x",)), json!({"body": "x"}));
    }

    #[test]
    fn test_triple_tuple_shape() {
        assert_eq!(
            wire_json(("x", 200, [("a", "b")])),
            json!({"body": "x", "statusCode": 200, "headers": {"a": "b"}})
        );
    }

    #[test]
    fn test_empty_response_omits_everything() {
        let wire = to_wire(Response::new());
        assert!(wire.is_empty());
        assert_eq!(serde_json::to_string(&wire).unwrap(), "{}");
        assert_eq!(wire.into_value(), Value::Null);
    }

    #[test]
    fn test_status_without_body() {
        assert_eq!(
            wire_json(Response::new().with_status(StatusCode::NO_CONTENT)),
            json!({"statusCode": 204})
        );
    }

    #[test]
    fn test_binary_body_is_base64() {
        assert_eq!(
            wire_json(Bytes::from_static(b"hello")),
            json!({"body": "aGVsbG8="})
        );
    }

    #[test]
    fn test_binary_response_carries_media_type() {
        assert_eq!(
            wire_json(Response::binary(Bytes::from_static(b"\x89PNG"), "image/png")),
            json!({"body": "iVBORw==", "headers": {"content-type": "image/png"}})
        );
    }

    #[test]
    fn test_json_body_is_structured() {
        assert_eq!(
            wire_json(Json(vec![1, 2, 3])),
            json!({"body": [1, 2, 3]})
        );
    }

    #[test]
    fn test_duplicate_headers_joined() {
        let response = Response::new()
            .with_headers([("Vary", "Accept"), ("Vary", "Origin")]);
        assert_eq!(
            wire_json(response),
            json!({"headers": {"Vary": "Accept, Origin"}})
        );
    }

    #[test]
    fn test_deserialize_round_trip() {
        let wire: WireResult =
            serde_json::from_value(json!({"body": "x", "statusCode": 404})).unwrap();
        assert_eq!(wire.status_code, Some(404));
        assert_eq!(wire.headers, None);
    }
}
