//! Upload Parameters
//!
//! Scalar parameter maps, their canonical form, and the cache key derived from it.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::{RegistryError, Result};

/// Namespace prefix for cached signatures.
pub const SIGNATURE_KEY_PREFIX: &str = "cld:sig:";

// == Param Value ==
/// A single JSON scalar parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Int(n) => write!(f, "{}", n),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(value.into())
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

// == Upload Params ==
/// Upload parameters, always held in key order.
///
/// Key order is a property of the type, so two maps built from the same
/// pairs in any insertion order serialise identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UploadParams(BTreeMap<String, ParamValue>);

impl UploadParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParamValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    // == Canonical Form ==
    /// Compact JSON of the key-sorted map.
    pub fn canonical(&self) -> String {
        // Serialising a BTreeMap of scalars cannot fail
        serde_json::to_string(&self.0).unwrap_or_default()
    }

    // == Cache Key ==
    /// `cld:sig:<hex sha256 of the canonical form>`.
    pub fn cache_key(&self) -> String {
        let digest = Sha256::digest(self.canonical().as_bytes());
        format!("{}{}", SIGNATURE_KEY_PREFIX, hex::encode(digest))
    }

    // == String To Sign ==
    /// `k1=v1&k2=v2` over non-empty values, in key order.
    pub fn to_sign(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| (k, v.to_string()))
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<K: Into<String>, V: Into<ParamValue>> FromIterator<(K, V)> for UploadParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

impl TryFrom<Value> for UploadParams {
    type Error = RegistryError;

    /// Accepts a JSON object of string, integer, or boolean values.
    fn try_from(value: Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(RegistryError::InvalidRequest(
                "upload params must be a JSON object".to_string(),
            ));
        };

        let mut params = Self::new();
        for (key, value) in map {
            let value = match value {
                Value::Bool(b) => ParamValue::Bool(b),
                Value::String(s) => ParamValue::Text(s),
                Value::Number(n) => match n.as_i64() {
                    Some(n) => ParamValue::Int(n),
                    None => {
                        return Err(RegistryError::InvalidRequest(format!(
                            "param '{}' must be an integer",
                            key
                        )))
                    }
                },
                _ => {
                    return Err(RegistryError::InvalidRequest(format!(
                        "param '{}' must be a string, integer or boolean",
                        key
                    )))
                }
            };
            params.insert(key, value);
        }
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_sorts_keys() {
        let params = UploadParams::new().with("b", 2).with("a", 1);
        assert_eq!(params.canonical(), r#"{"a":1,"b":2}"#);
    }

    #[test]
    fn test_cache_key_independent_of_insertion_order() {
        let ab = UploadParams::new().with("a", 1).with("b", 2);
        let ba = UploadParams::new().with("b", 2).with("a", 1);

        assert_eq!(ab.cache_key(), ba.cache_key());
        assert!(ab.cache_key().starts_with(SIGNATURE_KEY_PREFIX));
        assert_eq!(ab.cache_key().len(), SIGNATURE_KEY_PREFIX.len() + 64);
    }

    #[test]
    fn test_cache_key_differs_by_value_type() {
        let int = UploadParams::new().with("a", 1);
        let text = UploadParams::new().with("a", "1");
        assert_ne!(int.cache_key(), text.cache_key());
    }

    #[test]
    fn test_to_sign_skips_empty_values() {
        let params = UploadParams::new()
            .with("folder", "")
            .with("use_filename", true)
            .with("overwrite", false)
            .with("timestamp", 1_700_000_000);

        assert_eq!(
            params.to_sign(),
            "overwrite=false&timestamp=1700000000&use_filename=true"
        );
    }

    #[test]
    fn test_try_from_json_object() {
        let params = UploadParams::try_from(json!({
            "folder": "demo",
            "use_filename": true,
            "eager": 3
        }))
        .unwrap();

        assert_eq!(params.len(), 3);
        assert_eq!(params.get("eager"), Some(&ParamValue::Int(3)));
    }

    #[test]
    fn test_try_from_rejects_non_scalars() {
        assert!(UploadParams::try_from(json!({"tags": ["a"]})).is_err());
        assert!(UploadParams::try_from(json!({"ratio": 1.5})).is_err());
        assert!(UploadParams::try_from(json!({"x": null})).is_err());
        assert!(UploadParams::try_from(json!([1, 2])).is_err());
    }

    #[test]
    fn test_deserialize_untagged() {
        let params: UploadParams =
            serde_json::from_str(r#"{"folder":"x","overwrite":false,"n":4}"#).unwrap();
        assert_eq!(params.get("overwrite"), Some(&ParamValue::Bool(false)));
        assert_eq!(params.get("n"), Some(&ParamValue::Int(4)));
        assert_eq!(params.get("folder"), Some(&ParamValue::Text("x".into())));
    }
}
