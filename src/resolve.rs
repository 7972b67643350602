//! Legacy/Map Resolver - Canonical Key-Value Set
//!
//! Merges the generic configuration map and the legacy scalar fields into
//! one flat key-value set. Precedence, lowest to highest: built-in defaults,
//! map-provided values, legacy scalar fields. The injection guard truncates
//! map-derived keys and values at the first `;`; legacy values pass through
//! verbatim.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::Configuration;

pub const MEM_TOPOLOGY_KEY: &str = "mem_topology";
pub const SYSTEM_MEMORY_KEY: &str = "system_memory";

pub const DEFAULT_MEM_TOPOLOGY: &str = "2";
pub const DEFAULT_SYSTEM_MEMORY: &str = "6x";

/// The canonical key-value set handed to the document builder. BTreeMap
/// keeps serialization order deterministic.
pub type ResolvedConfig = BTreeMap<String, String>;

/// ResolvedOrigin records where a resolved value came from.
/// This keeps precedence explicit instead of scattering conditionals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueOrigin {
    /// Built-in default (fallback)
    Default,
    /// Taken from the generic configuration map (guard applied)
    Map,
    /// Taken from a legacy scalar field (verbatim)
    Legacy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEntry {
    pub value: String,
    pub origin: ValueOrigin,
}

/// Truncate at the first `;`, dropping everything from the separator on.
pub fn strip_semicola(s: &str) -> &str {
    match s.find(';') {
        Some(position) => &s[..position],
        None => s,
    }
}

/// Resolve a possibly-absent configuration into the canonical key-value
/// set. Absence means "use defaults entirely". The caller's map is copied,
/// never aliased or mutated.
pub fn resolve(config: Option<&Configuration>) -> ResolvedConfig {
    resolve_with_origins(config)
        .into_iter()
        .map(|(key, entry)| (key, entry.value))
        .collect()
}

/// Like [`resolve`], but annotating every value with its origin.
pub fn resolve_with_origins(config: Option<&Configuration>) -> BTreeMap<String, ResolvedEntry> {
    let mut resolved = BTreeMap::new();

    if let Some(map) = config.and_then(|c| c.vsmp_configuration.as_ref()) {
        for (key, value) in map {
            resolved.insert(
                strip_semicola(key).to_string(),
                ResolvedEntry {
                    value: strip_semicola(value).to_string(),
                    origin: ValueOrigin::Map,
                },
            );
        }
    }

    // The reserved keys always start from their defaults; only the legacy
    // fields below can move them.
    resolved.insert(
        MEM_TOPOLOGY_KEY.to_string(),
        ResolvedEntry {
            value: DEFAULT_MEM_TOPOLOGY.to_string(),
            origin: ValueOrigin::Default,
        },
    );
    resolved.insert(
        SYSTEM_MEMORY_KEY.to_string(),
        ResolvedEntry {
            value: DEFAULT_SYSTEM_MEMORY.to_string(),
            origin: ValueOrigin::Default,
        },
    );

    if let Some(config) = config {
        if let Some(memory) = &config.system_memory {
            resolved.insert(
                SYSTEM_MEMORY_KEY.to_string(),
                ResolvedEntry {
                    value: memory.clone(),
                    origin: ValueOrigin::Legacy,
                },
            );
        }

        // Legacy topology is exempt from the guard: historical consumers
        // rely on semicolon-separated injected pairs arriving verbatim.
        if let Some(topology) = &config.memory_topology {
            resolved.insert(
                MEM_TOPOLOGY_KEY.to_string(),
                ResolvedEntry {
                    value: topology.clone(),
                    origin: ValueOrigin::Legacy,
                },
            );
        }
    }

    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_absent_config_resolves_to_defaults() {
        let resolved = resolve(None);
        let expected: ResolvedConfig = BTreeMap::from([
            (MEM_TOPOLOGY_KEY.to_string(), "2".to_string()),
            (SYSTEM_MEMORY_KEY.to_string(), "6x".to_string()),
        ]);
        assert_eq!(resolved, expected);
    }

    #[test]
    fn test_legacy_fields_win_over_map() {
        let config = Configuration {
            memory_topology: Some("3".to_string()),
            system_memory: Some("7x".to_string()),
            vsmp_configuration: Some(BTreeMap::from([
                (MEM_TOPOLOGY_KEY.to_string(), "5".to_string()),
                (SYSTEM_MEMORY_KEY.to_string(), "13x".to_string()),
            ])),
        };

        let resolved = resolve(Some(&config));
        assert_eq!(resolved.get(MEM_TOPOLOGY_KEY).map(String::as_str), Some("3"));
        assert_eq!(resolved.get(SYSTEM_MEMORY_KEY).map(String::as_str), Some("7x"));
    }

    #[test]
    fn test_map_values_truncated_at_semicolon() {
        let config = Configuration {
            vsmp_configuration: Some(BTreeMap::from([(
                "foo".to_string(),
                "bar; foobar".to_string(),
            )])),
            ..Default::default()
        };

        let resolved = resolve(Some(&config));
        assert_eq!(resolved.get("foo").map(String::as_str), Some("bar"));
    }

    #[test]
    fn test_map_keys_truncated_at_semicolon() {
        let config = Configuration {
            vsmp_configuration: Some(BTreeMap::from([(
                "foo;bar".to_string(),
                "baz".to_string(),
            )])),
            ..Default::default()
        };

        let resolved = resolve(Some(&config));
        assert_eq!(resolved.get("foo").map(String::as_str), Some("baz"));
        assert!(!resolved.contains_key("foo;bar"));
    }

    #[test]
    fn test_legacy_topology_exempt_from_guard() {
        let config = Configuration {
            memory_topology: Some("4; foo=bar".to_string()),
            ..Default::default()
        };

        let resolved = resolve(Some(&config));
        assert_eq!(
            resolved.get(MEM_TOPOLOGY_KEY).map(String::as_str),
            Some("4; foo=bar")
        );
    }

    #[test]
    fn test_caller_map_not_mutated() {
        let map = BTreeMap::from([("foo".to_string(), "bar;baz".to_string())]);
        let config = Configuration {
            vsmp_configuration: Some(map.clone()),
            ..Default::default()
        };

        let _ = resolve(Some(&config));
        assert_eq!(config.vsmp_configuration.unwrap(), map);
    }

    #[test]
    fn test_origins() {
        let config = Configuration {
            system_memory: Some("7x".to_string()),
            vsmp_configuration: Some(BTreeMap::from([("foo".to_string(), "bar".to_string())])),
            ..Default::default()
        };

        let resolved = resolve_with_origins(Some(&config));
        assert_eq!(resolved["foo"].origin, ValueOrigin::Map);
        assert_eq!(resolved[MEM_TOPOLOGY_KEY].origin, ValueOrigin::Default);
        assert_eq!(resolved[SYSTEM_MEMORY_KEY].origin, ValueOrigin::Legacy);
    }
}
