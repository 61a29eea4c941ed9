//! JSON encoding for response bodies.

use std::fmt::Debug;

use serde::Serialize;
use thiserror::Error;

/// Encoding a value as JSON failed.
#[derive(Debug, Error)]
#[error("failed to encode {type_name} as json: {source}")]
pub struct JsonError {
    type_name: &'static str,
    #[source]
    source: serde_json::Error,
}

impl JsonError {
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

/// Encodes `value` as compact JSON.
///
/// On failure a warning carrying the offending value is logged here, at the
/// call site, and the error is returned for the caller to handle.
pub fn encode<T: Serialize + Debug + ?Sized>(value: &T) -> Result<String, JsonError> {
    serde_json::to_string(value).map_err(|e| failed(value, e))
}

/// Encodes `value` as indented JSON. Fails like [`encode`].
pub fn encode_pretty<T: Serialize + Debug + ?Sized>(value: &T) -> Result<String, JsonError> {
    serde_json::to_string_pretty(value).map_err(|e| failed(value, e))
}

fn failed<T: Debug + ?Sized>(value: &T, source: serde_json::Error) -> JsonError {
    let type_name = std::any::type_name::<T>();
    tracing::warn!(data = ?value, error = %source, "json encode failed for {type_name}");
    JsonError { type_name, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[derive(Debug, Serialize)]
    struct Post {
        id: u32,
        title: String,
    }

    #[test]
    fn test_encode() {
        let post = Post {
            id: 1,
            title: "Hello".into(),
        };
        assert_eq!(encode(&post).unwrap(), r#"{"id":1,"title":"Hello"}"#);
        assert!(encode_pretty(&post).unwrap().contains("\n  \"id\": 1"));
    }

    #[test]
    fn test_non_string_map_keys_fail() {
        let data = BTreeMap::from([((1, 2), "pair")]);

        let err = encode(&data).unwrap_err();

        assert!(err.type_name().contains("BTreeMap"));
        assert!(err.to_string().starts_with("failed to encode"));
    }
}
