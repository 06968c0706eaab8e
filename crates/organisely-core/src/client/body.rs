//! Response body parsing by declared content type.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// A response body, parsed according to its `content-type`.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// Zero-length body (e.g. 204 No Content).
    Empty,
    Json(Value),
    Text(String),
    Bytes(Vec<u8>),
}

impl ResponseBody {
    /// `application/json` → [`ResponseBody::Json`] (falling back to text when the
    /// payload is not valid JSON), `text/*` → [`ResponseBody::Text`], anything
    /// else → [`ResponseBody::Bytes`].
    pub fn parse(content_type: Option<&str>, bytes: Vec<u8>) -> Self {
        if bytes.is_empty() {
            return ResponseBody::Empty;
        }

        let content_type = content_type.unwrap_or_default().to_ascii_lowercase();
        if content_type.contains("application/json") {
            return match serde_json::from_slice(&bytes) {
                Ok(value) => ResponseBody::Json(value),
                Err(_) => ResponseBody::Text(String::from_utf8_lossy(&bytes).into_owned()),
            };
        }
        if content_type.contains("text/") {
            return ResponseBody::Text(String::from_utf8_lossy(&bytes).into_owned());
        }
        ResponseBody::Bytes(bytes)
    }

    /// JSON object view, when the body is one.
    pub fn as_object(&self) -> Option<&serde_json::Map<String, Value>> {
        match self {
            ResponseBody::Json(value) => value.as_object(),
            _ => None,
        }
    }

    /// Body as a JSON value for error details; `None` for empty or binary bodies.
    pub fn to_details(&self) -> Option<Value> {
        match self {
            ResponseBody::Json(value) => Some(value.clone()),
            ResponseBody::Text(text) => Some(Value::String(text.clone())),
            ResponseBody::Empty | ResponseBody::Bytes(_) => None,
        }
    }

    /// Decode into a typed payload. An empty body decodes as JSON `null`,
    /// so `()` and `Option<_>` accept it.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, serde_json::Error> {
        let value = match self {
            ResponseBody::Empty => Value::Null,
            ResponseBody::Json(value) => value,
            ResponseBody::Text(text) => Value::String(text),
            ResponseBody::Bytes(bytes) => Value::Array(bytes.into_iter().map(Value::from).collect()),
        };
        serde_json::from_value(value)
    }
}
