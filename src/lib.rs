//! VsmpBoot Core - vSMP Bootstrap Compiler
//!
//! # The Five Laws (Non-Negotiable)
//! 1. Configuration Is Declarative
//! 2. Validation Is Protective
//! 3. Legacy Fields Win
//! 4. Semicola Never Pass The Guard Unnoticed
//! 5. Rendered Documents Are Byte-Stable

pub mod config;
pub mod syntax;
pub mod validation;
pub mod resolve;
pub mod document;
pub mod fingerprint;
pub mod pipeline;

pub use config::{Configuration, ConfigurationEnvelope};
pub use validation::{FieldError, FieldErrorKind, FieldPath, FieldRule, ValidationReport, Validator};
pub use resolve::{resolve, resolve_with_origins, ResolvedConfig, ResolvedEntry, ValueOrigin};
pub use document::{build_document, BOUNDARY};
pub use fingerprint::{config_fingerprint, document_fingerprint, sha256_hex};
pub use pipeline::{PipelineError, ProvisioningPipeline, RenderRequest, RenderedUserData};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
