//! JSON extraction helpers and GraphQL envelope decoding.
//!
//! GraphQL endpoints answer with an envelope of the form
//! `{"data": {"<operation>": ...}}` or, on failure,
//! `{"errors": [{"message": "..."}], ...}`. [`decode_graphql`] unwraps that
//! envelope into a typed value.
//!
//! # Examples
//!
//! ```rust
//! use multisrc::net::json;
//! use serde_json::json;
//!
//! let data = json!({ "data": { "works": [{ "stub": "a" }, { "stub": "b" }] } });
//!
//! let stub = json::extract_path(&data, "data.works.0.stub").unwrap();
//! assert_eq!(stub.as_str(), Some("a"));
//! assert_eq!(json::extract_array(&data, "data.works").len(), 2);
//! ```

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Extracts a value from nested JSON using dot notation.
///
/// Numeric segments index into arrays (`"works.0.stub"`).
pub fn extract_path(json: &Value, path: &str) -> Option<Value> {
    let mut current = json;

    for key in path.split('.') {
        current = match current {
            Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
            _ => current.get(key)?,
        };
    }

    Some(current.clone())
}

/// Extracts and deserializes a value from a nested JSON path.
///
/// # Errors
///
/// * [`Error::Parse`](crate::Error::Parse) - If the path doesn't exist
/// * [`Error::Json`](crate::Error::Json) - If deserialization fails
pub fn extract_as<T>(json: &Value, path: &str) -> crate::Result<T>
where
    T: DeserializeOwned,
{
    extract_path(json, path)
        .ok_or_else(|| crate::Error::parse(format!("Path not found: {}", path)))
        .and_then(|v| serde_json::from_value(v).map_err(Into::into))
}

/// Extracts an array from a nested JSON path, empty if missing or not an array.
pub fn extract_array(json: &Value, path: &str) -> Vec<Value> {
    extract_path(json, path)
        .and_then(|v| v.as_array().cloned())
        .unwrap_or_default()
}

/// Builds `{endpoint}?query=<urlencoded query>`.
///
/// Whitespace runs in the query are collapsed to single spaces first.
///
/// ```rust
/// use multisrc::net::json::graphql_url;
///
/// let url = graphql_url("https://api.example.com", "{\n  work(stub: \"a\") {\n    name\n  }\n}");
/// assert_eq!(
///     url,
///     "https://api.example.com?query=%7B%20work%28stub%3A%20%22a%22%29%20%7B%20name%20%7D%20%7D"
/// );
/// ```
pub fn graphql_url(endpoint: &str, query: &str) -> String {
    let compact = query.split_whitespace().collect::<Vec<_>>().join(" ");
    format!("{}?query={}", endpoint, urlencoding::encode(&compact))
}

/// Decodes `data.<operation>` out of a GraphQL response body.
///
/// # Errors
///
/// * [`Error::Api`](crate::Error::Api) - With the first error's `message` when
///   the envelope has an `errors` key
/// * [`Error::Parse`](crate::Error::Parse) - When `data.<operation>` is missing
/// * [`Error::Json`](crate::Error::Json) - When the body or payload can't be decoded
///
/// ```rust
/// use multisrc::{Error, net::json::decode_graphql};
///
/// let ok: Vec<u32> = decode_graphql(br#"{"data":{"ids":[1,2]}}"#, "ids").unwrap();
/// assert_eq!(ok, vec![1, 2]);
///
/// let err = decode_graphql::<Vec<u32>>(br#"{"errors":[{"message":"boom"}]}"#, "ids").unwrap_err();
/// assert!(matches!(err, Error::Api(msg) if msg == "boom"));
/// ```
pub fn decode_graphql<T>(body: &[u8], operation: &str) -> crate::Result<T>
where
    T: DeserializeOwned,
{
    let envelope: Value = serde_json::from_slice(body)?;

    if let Some(errors) = envelope.get("errors") {
        let message = errors
            .get(0)
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
            .unwrap_or("unknown GraphQL error");
        return Err(crate::Error::api(message));
    }

    let payload = envelope
        .get("data")
        .and_then(|data| data.get(operation))
        .ok_or_else(|| crate::Error::parse(format!("Missing data.{} in response", operation)))?;

    T::deserialize(payload).map_err(Into::into)
}
