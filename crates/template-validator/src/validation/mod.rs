//! Three-tier template configuration validation
//!
//! - **schema**: local shape of the manifest
//! - **domain**: cross-references inside the manifest
//! - **runtime**: a concrete selection against the manifest
//!
//! Every tier returns findings as data. [`Validator::validate`] composes the
//! tiers, converts load failures into a single `LOAD_ERROR` entry and never
//! fails for data-shape problems, so callers can always render a result.

pub mod compat;
pub mod domain;
pub mod result;
pub mod runtime;
pub mod schema;
pub mod suggest;

use crate::config::ValidatorConfig;
use crate::loader::{self, LoadError, RuntimeRequest};
use crate::manifest::Manifest;
use crate::registry::DimensionRegistry;
use crate::render::PresentationOptions;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

pub use compat::{CompatibilityRule, RuleSet};
pub use domain::validate_domain;
pub use result::{IssueKind, ValidationError, ValidationResult, ValidationWarning};
pub use runtime::{
    validate_cross_dimension_compatibility, validate_feature_needs, validate_gates_enforcement,
    validate_hints_consistency, validate_runtime, RuntimeValidator,
};
pub use schema::SchemaValidator;

/// Validation strictness.
///
/// `strict` is the only mode in use and currently changes nothing; it is
/// carried through so callers keep a stable signature once further modes
/// are defined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    #[default]
    Strict,
}

impl ValidationMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ValidationMode::Strict => "strict",
        }
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown validation mode '{0}' (expected: strict)")]
pub struct UnknownModeError(pub String);

impl FromStr for ValidationMode {
    type Err = UnknownModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(ValidationMode::Strict),
            _ => Err(UnknownModeError(s.to_string())),
        }
    }
}

/// Options for [`Validator::validate`]
#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    /// Selection to check once the manifest itself is valid
    pub runtime: Option<RuntimeRequest>,

    /// Rendering flags; never consulted while computing findings
    pub presentation: PresentationOptions,
}

impl ValidateOptions {
    pub fn with_runtime(mut self, request: RuntimeRequest) -> Self {
        self.runtime = Some(request);
        self
    }
}

/// Where the manifest comes from
#[derive(Debug, Clone, Copy)]
pub enum ManifestSource<'a> {
    Manifest(&'a Manifest),
    Path(&'a Path),
}

impl<'a> From<&'a Manifest> for ManifestSource<'a> {
    fn from(manifest: &'a Manifest) -> Self {
        ManifestSource::Manifest(manifest)
    }
}

impl<'a> From<&'a Path> for ManifestSource<'a> {
    fn from(path: &'a Path) -> Self {
        ManifestSource::Path(path)
    }
}

impl<'a> From<&'a std::path::PathBuf> for ManifestSource<'a> {
    fn from(path: &'a std::path::PathBuf) -> Self {
        ManifestSource::Path(path.as_path())
    }
}

/// Stateless validation engine; safe to share across threads and tasks
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidatorConfig,
}

impl Validator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn registry(&self) -> &DimensionRegistry {
        &self.config.registry
    }

    /// Validate a manifest (in memory or by path) and an optional selection
    pub fn validate<'a>(
        &self,
        source: impl Into<ManifestSource<'a>>,
        mode: ValidationMode,
        options: &ValidateOptions,
    ) -> ValidationResult {
        match source.into() {
            ManifestSource::Manifest(manifest) => self.validate_manifest(manifest, mode, options),
            ManifestSource::Path(path) => match loader::load_manifest_blocking(path) {
                Ok(manifest) => self.validate_manifest(&manifest, mode, options),
                Err(e) => load_failure(&e),
            },
        }
    }

    /// Like [`Self::validate`] for a path, loading through the async runtime
    pub async fn validate_path(
        &self,
        path: &Path,
        mode: ValidationMode,
        options: &ValidateOptions,
    ) -> ValidationResult {
        match loader::load_manifest(path).await {
            Ok(manifest) => self.validate_manifest(&manifest, mode, options),
            Err(e) => load_failure(&e),
        }
    }

    /// Compose the tiers over an in-memory manifest.
    ///
    /// Domain validation only runs on a schema-valid manifest, and runtime
    /// validation only on a domain-valid one.
    pub fn validate_manifest(
        &self,
        manifest: &Manifest,
        mode: ValidationMode,
        options: &ValidateOptions,
    ) -> ValidationResult {
        tracing::debug!(
            manifest = manifest.name.as_deref().unwrap_or("<unnamed>"),
            %mode,
            runtime = options.runtime.is_some(),
            "validating manifest"
        );

        let schema_errors = self.validate_schema(manifest);
        if !schema_errors.is_empty() {
            return ValidationResult::from_errors(schema_errors);
        }

        let domain_errors = validate_domain(manifest);
        if !domain_errors.is_empty() {
            return ValidationResult::new(domain_errors, validate_hints_consistency(manifest));
        }

        match &options.runtime {
            Some(request) => self.validate_runtime(
                manifest,
                &request.selection,
                &request.deployment_target,
                &request.enabled_features,
            ),
            None => ValidationResult::new(Vec::new(), validate_hints_consistency(manifest)),
        }
    }

    pub fn validate_schema(&self, manifest: &Manifest) -> Vec<ValidationError> {
        SchemaValidator::new(&self.config.registry).validate(manifest)
    }

    pub fn validate_domain(&self, manifest: &Manifest) -> Vec<ValidationError> {
        validate_domain(manifest)
    }

    /// Selection-time checks, without re-validating the manifest's shape
    pub fn validate_runtime(
        &self,
        manifest: &Manifest,
        selection: &crate::manifest::Selection,
        deployment_target: &str,
        enabled_features: &[String],
    ) -> ValidationResult {
        RuntimeValidator::new(&self.config.rules).validate(
            manifest,
            selection,
            deployment_target,
            enabled_features,
        )
    }
}

fn load_failure(error: &LoadError) -> ValidationResult {
    tracing::debug!(error = %error, "manifest could not be loaded");
    ValidationResult::load_failure(error.to_string(), error.path().display().to_string())
}

/// Validate with the built-in configuration
pub fn validate<'a>(
    source: impl Into<ManifestSource<'a>>,
    mode: ValidationMode,
    options: &ValidateOptions,
) -> ValidationResult {
    Validator::default().validate(source, mode, options)
}

/// Schema tier with the built-in dimension vocabulary
pub fn validate_schema(manifest: &Manifest) -> Vec<ValidationError> {
    SchemaValidator::new(&DimensionRegistry::builtin()).validate(manifest)
}
