//! Provisioning Pipeline - Single Entry Point
//!
//! CRITICAL: render MUST call validate internally. No bypass.

use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{Configuration, ConfigurationEnvelope, KIND};
use crate::document::build_document;
use crate::fingerprint::{config_fingerprint, document_fingerprint};
use crate::resolve::{resolve, ResolvedConfig};
use crate::validation::{FieldError, ValidationReport, Validator};
use crate::ENGINE_VERSION;

#[cfg(feature = "test-hooks")]
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "test-hooks")]
static VALIDATION_CALL_COUNT: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "test-hooks")]
pub fn get_validation_call_count() -> u32 {
    VALIDATION_CALL_COUNT.load(Ordering::SeqCst)
}

#[cfg(feature = "test-hooks")]
pub fn reset_validation_call_count() {
    VALIDATION_CALL_COUNT.store(0, Ordering::SeqCst);
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("is not a valid {KIND}: {0}")]
    Decode(String),

    #[error("validation failed: {}", join_errors(.0))]
    ValidationFailed(Vec<FieldError>),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A request to render boot user-data: the decoded configuration (absent
/// means "defaults") plus the provisioning script supplied by the script
/// generation collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderRequest {
    #[serde(default)]
    pub config: Option<Configuration>,
    pub script: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderedUserData {
    pub engine_version: String,
    pub rendered_at: DateTime<Utc>,
    pub resolved: ResolvedConfig,
    pub user_data: String,
    pub user_data_base64: String,
    /// Fingerprint of the rendered document.
    pub fingerprint: String,
    /// Fingerprint of the input configuration, absent when rendering from
    /// defaults.
    pub config_fingerprint: Option<String>,
    pub validation: ValidationReport,
}

/// The provisioning pipeline - single entry point for validation and
/// rendering
pub struct ProvisioningPipeline {
    validator: Validator,
}

impl ProvisioningPipeline {
    pub fn new() -> Self {
        Self {
            validator: Validator::new(),
        }
    }

    /// Decode a serialized configuration. Strict: unknown fields and a
    /// wrong envelope are rejected.
    pub fn decode_config(&self, raw: &[u8]) -> Result<Configuration, PipelineError> {
        let envelope: ConfigurationEnvelope =
            serde_json::from_slice(raw).map_err(|e| PipelineError::Decode(e.to_string()))?;

        if !envelope.has_expected_type() {
            return Err(PipelineError::Decode(format!(
                "unexpected envelope {}/{}",
                envelope.api_version, envelope.kind
            )));
        }

        Ok(envelope.into_configuration())
    }

    /// Validate a configuration.
    ///
    /// This is the ONLY validation entry point.
    pub fn validate_config(&self, config: &Configuration) -> ValidationReport {
        #[cfg(feature = "test-hooks")]
        VALIDATION_CALL_COUNT.fetch_add(1, Ordering::SeqCst);

        ValidationReport::from_errors(self.validator.validate(config))
    }

    /// Reject on ANY violation. A single violation is as fatal as many;
    /// callers get the full list so one correction cycle can address all.
    pub fn ensure_valid(&self, config: &Configuration) -> Result<(), PipelineError> {
        let report = self.validate_config(config);
        if report.valid {
            Ok(())
        } else {
            Err(PipelineError::ValidationFailed(report.errors))
        }
    }

    /// Render boot user-data.
    ///
    /// CRITICAL: This ALWAYS validates the configuration first. No bypass
    /// possible.
    pub fn render(&self, request: &RenderRequest) -> Result<RenderedUserData, PipelineError> {
        let validation = match &request.config {
            Some(config) => {
                let report = self.validate_config(config);
                if !report.valid {
                    return Err(PipelineError::ValidationFailed(report.errors));
                }
                report
            }
            None => ValidationReport::from_errors(vec![]),
        };

        let input_fingerprint = match &request.config {
            Some(config) => Some(config_fingerprint(config)?),
            None => None,
        };

        let resolved = resolve(request.config.as_ref());
        let user_data = build_document(&resolved, &request.script);
        let fingerprint = document_fingerprint(&user_data);
        let user_data_base64 =
            base64::engine::general_purpose::STANDARD.encode(user_data.as_bytes());

        Ok(RenderedUserData {
            engine_version: ENGINE_VERSION.to_string(),
            rendered_at: Utc::now(),
            resolved,
            user_data,
            user_data_base64,
            fingerprint,
            config_fingerprint: input_fingerprint,
            validation,
        })
    }

    /// Resolver + builder only, for callers that validated upstream. The
    /// injection guard still runs inside `resolve`.
    pub fn render_unchecked(&self, config: Option<&Configuration>, script: &str) -> String {
        build_document(&resolve(config), script)
    }
}

impl Default for ProvisioningPipeline {
    fn default() -> Self {
        Self::new()
    }
}
