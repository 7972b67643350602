//! Configuration Model - Enforceable Contract
//!
//! The declarative bootstrap configuration as handed over by the decoding
//! collaborator. All fields are optional: an absent field means "not set"
//! and is distinct from a field set to the empty string.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// API version the serialized envelope must carry.
pub const API_VERSION: &str = "vsmp.bootconfig/v1alpha1";

/// Kind the serialized envelope must carry.
pub const KIND: &str = "BootstrapConfiguration";

/// Bootstrap configuration for a vSMP machine image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Configuration {
    /// Semicolon-separated topology elements: bare count tokens or
    /// injected `key=value` feature pairs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_topology: Option<String>,

    /// Resource-quantity string, e.g. `123`, `123m`, `2Gi`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_memory: Option<String>,

    /// Generic configuration map. Keys must be qualified names, values
    /// must not contain `;`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vsmp_configuration: Option<BTreeMap<String, String>>,
}

impl Configuration {
    /// Whether no field is set at all ("use defaults").
    pub fn is_empty(&self) -> bool {
        self.memory_topology.is_none()
            && self.system_memory.is_none()
            && self.vsmp_configuration.is_none()
    }
}

/// Serialized form of a [`Configuration`]: the object-model envelope plus
/// the configuration fields. Unknown fields are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigurationEnvelope {
    pub api_version: String,
    pub kind: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_topology: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_memory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vsmp_configuration: Option<BTreeMap<String, String>>,
}

impl ConfigurationEnvelope {
    /// Whether the envelope identifies the configuration type this crate
    /// understands.
    pub fn has_expected_type(&self) -> bool {
        self.api_version == API_VERSION && self.kind == KIND
    }

    pub fn into_configuration(self) -> Configuration {
        Configuration {
            memory_topology: self.memory_topology,
            system_memory: self.system_memory,
            vsmp_configuration: self.vsmp_configuration,
        }
    }
}

impl From<Configuration> for ConfigurationEnvelope {
    fn from(config: Configuration) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            memory_topology: config.memory_topology,
            system_memory: config.system_memory,
            vsmp_configuration: config.vsmp_configuration,
        }
    }
}
