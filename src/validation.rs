//! Validation System - Rule/Violation Separation
//!
//! Rules produce structured field errors; they never repair values and
//! never short-circuit. Aggregation into a reportable failure is the
//! pipeline's job.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::Configuration;
use crate::syntax;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
    /// A value does not match its required grammar.
    Syntax,
    /// A feature key or map key is not in the allowed set.
    UnsupportedKey,
    /// A map value contains the disallowed separator character.
    ForbiddenValue,
}

/// Structural location of a violation: field name, optional element index,
/// optional map key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldPath {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl FieldPath {
    pub fn field(field: &str) -> Self {
        Self {
            field: field.to_string(),
            index: None,
            key: None,
        }
    }

    pub fn index(field: &str, index: usize) -> Self {
        Self {
            field: field.to_string(),
            index: Some(index),
            key: None,
        }
    }

    pub fn key(field: &str, key: &str) -> Self {
        Self {
            field: field.to_string(),
            index: None,
            key: Some(key.to_string()),
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.field)?;
        if let Some(index) = self.index {
            write!(f, "[{}]", index)?;
        }
        if let Some(key) = &self.key {
            write!(f, "[{}]", key)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldError {
    pub rule: String,
    pub kind: FieldErrorKind,
    pub path: FieldPath,
    pub value: Option<String>,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}: {:?}: {}", self.path, value, self.message),
            None => write!(f, "{}: {}", self.path, self.message),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<FieldError>,
}

impl ValidationReport {
    pub fn from_errors(errors: Vec<FieldError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validation rule trait - produces field errors for one configuration field
pub trait FieldRule {
    fn name(&self) -> &'static str;
    fn validate(&self, config: &Configuration) -> Vec<FieldError>;
}

// --- Concrete Rules ---

pub struct MemoryTopologyRule;

impl MemoryTopologyRule {
    fn syntax_error(&self, index: usize, value: &str, message: String) -> FieldError {
        FieldError {
            rule: self.name().to_string(),
            kind: FieldErrorKind::Syntax,
            path: FieldPath::index("memoryTopology", index),
            value: Some(value.to_string()),
            message,
        }
    }
}

impl FieldRule for MemoryTopologyRule {
    fn name(&self) -> &'static str {
        "memory_topology"
    }

    fn validate(&self, config: &Configuration) -> Vec<FieldError> {
        let topology = match config.memory_topology.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => return vec![],
        };

        let mut errors = vec![];

        for (index, element) in topology.split(';').enumerate() {
            match element.split_once('=') {
                None => {
                    if !syntax::is_count_token(element) {
                        errors.push(self.syntax_error(
                            index,
                            element,
                            "must only contain digits with an optional trailing x".to_string(),
                        ));
                    }
                }
                Some((feature, value)) => match feature {
                    "opt_enable" => {
                        if !syntax::is_opt_enable_value(value) {
                            errors.push(self.syntax_error(
                                index,
                                element,
                                "opt_enable expects an 8 digit hex-string".to_string(),
                            ));
                        }
                    }
                    "debug_features_enable" => {
                        if !syntax::is_debug_features_value(value) {
                            errors.push(self.syntax_error(
                                index,
                                element,
                                "debug_features_enable expects a 16 digit hex-string".to_string(),
                            ));
                        }
                    }
                    "feature_enable" => {
                        // Reserved key, value currently unconstrained.
                    }
                    _ => {
                        errors.push(FieldError {
                            rule: self.name().to_string(),
                            kind: FieldErrorKind::UnsupportedKey,
                            path: FieldPath::index("memoryTopology", index),
                            value: Some(feature.to_string()),
                            message: format!(
                                "not supported, must be one of: {}",
                                syntax::SUPPORTED_INJECTED_FEATURES.join(", ")
                            ),
                        });
                    }
                },
            }
        }

        errors
    }
}

pub struct SystemMemoryRule;

impl FieldRule for SystemMemoryRule {
    fn name(&self) -> &'static str {
        "system_memory"
    }

    fn validate(&self, config: &Configuration) -> Vec<FieldError> {
        let memory = match config.system_memory.as_deref() {
            Some(m) if !m.is_empty() => m,
            _ => return vec![],
        };

        if syntax::is_quantity(memory) {
            return vec![];
        }

        vec![FieldError {
            rule: self.name().to_string(),
            kind: FieldErrorKind::Syntax,
            path: FieldPath::field("systemMemory"),
            value: Some(memory.to_string()),
            message: "is not a valid quantity".to_string(),
        }]
    }
}

pub struct VsmpConfigurationRule;

impl FieldRule for VsmpConfigurationRule {
    fn name(&self) -> &'static str {
        "vsmp_configuration"
    }

    fn validate(&self, config: &Configuration) -> Vec<FieldError> {
        let map = match &config.vsmp_configuration {
            Some(m) => m,
            None => return vec![],
        };

        let mut errors = vec![];

        for (key, value) in map {
            for reason in syntax::qualified_name_violations(key) {
                errors.push(FieldError {
                    rule: self.name().to_string(),
                    kind: FieldErrorKind::UnsupportedKey,
                    path: FieldPath::key("vsmpConfiguration", key),
                    value: Some(key.clone()),
                    message: reason,
                });
            }

            if value.contains(';') {
                errors.push(FieldError {
                    rule: self.name().to_string(),
                    kind: FieldErrorKind::ForbiddenValue,
                    path: FieldPath::key("vsmpConfiguration", key),
                    value: Some(value.clone()),
                    message: "must not contain semicola".to_string(),
                });
            }
        }

        errors
    }
}

/// Validator orchestrates the field rules
pub struct Validator {
    rules: Vec<Box<dyn FieldRule>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(MemoryTopologyRule),
                Box::new(SystemMemoryRule),
                Box::new(VsmpConfigurationRule),
            ],
        }
    }

    /// Collect every violation in one pass. An empty result means the
    /// configuration is acceptable.
    pub fn validate(&self, config: &Configuration) -> Vec<FieldError> {
        let mut all_errors = vec![];

        for rule in &self.rules {
            all_errors.extend(rule.validate(config));
        }

        all_errors
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
