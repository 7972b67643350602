//! Content Fingerprints
//!
//! Stable SHA-256 identities for configurations and rendered documents.
//! The reconcile loop diffs fingerprints to skip regenerating user-data
//! that has not changed.

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::config::Configuration;

/// SHA-256 of raw bytes as a lowercase hex string.
pub fn sha256_hex(data: &[u8]) -> String {
    Sha256::digest(data)
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

/// Canonical JSON: object keys sorted recursively, no insignificant
/// whitespace. Equal values canonicalize to equal strings regardless of
/// input key order.
pub fn canonical_json(value: &Value) -> String {
    serde_json::to_string(&canonicalize(value)).unwrap_or_default()
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, Value> = map
                .iter()
                .map(|(key, value)| (key, canonicalize(value)))
                .collect();
            serde_json::to_value(sorted).unwrap_or(Value::Null)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// Fingerprint of a configuration, stable across field ordering in the
/// serialized input.
pub fn config_fingerprint(config: &Configuration) -> Result<String, serde_json::Error> {
    let value = serde_json::to_value(config)?;
    Ok(sha256_hex(canonical_json(&value).as_bytes()))
}

/// Fingerprint of a rendered boot document.
pub fn document_fingerprint(document: &str) -> String {
    sha256_hex(document.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_json_sorts_keys() {
        let value = json!({"z": 1, "a": 2, "m": {"b": 1, "a": 2}});
        assert_eq!(canonical_json(&value), r#"{"a":2,"m":{"a":2,"b":1},"z":1}"#);
    }

    #[test]
    fn test_config_fingerprint_stable() {
        let config: Configuration =
            serde_json::from_str(r#"{"memoryTopology": "2", "systemMemory": "6x"}"#).unwrap();

        let first = config_fingerprint(&config).unwrap();
        let second = config_fingerprint(&config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_different_documents_differ() {
        assert_ne!(document_fingerprint("a"), document_fingerprint("b"));
    }
}
