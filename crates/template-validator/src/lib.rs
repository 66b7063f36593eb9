//! Template Validator - configuration checks for scaffolding templates
//!
//! Templates declare a multi-dimensional configuration space (deployment
//! target, database, storage, optional features, ...). This library decides
//! whether that space is internally consistent and whether a concrete user
//! selection against it is legal.
//!
//! # Architecture
//!
//! - **Model** - [`Manifest`] and [`Selection`], immutable once loaded
//! - **Schema tier** - local structure of the manifest
//! - **Domain tier** - cross-references inside the manifest
//! - **Runtime tier** - gates, feature needs, the compatibility matrix and
//!   hints consistency for a concrete selection
//! - **Presentation** - text/JSON rendering of a [`ValidationResult`]
//!
//! All tiers are pure functions of their inputs and return findings as data.
//!
//! # Example
//!
//! ```ignore
//! use template_validator::{validate, ValidateOptions, ValidationMode};
//! use std::path::Path;
//!
//! let result = validate(
//!     Path::new("templates/web"),
//!     ValidationMode::Strict,
//!     &ValidateOptions::default(),
//! );
//! assert!(result.valid);
//! ```

pub mod batch;
pub mod config;
pub mod loader;
pub mod manifest;
pub mod registry;
pub mod render;
pub mod validation;
pub mod version;

// Re-export main types for convenience
pub use config::ValidatorConfig;
pub use loader::{load_manifest, load_manifest_blocking, load_selection, LoadError, RuntimeRequest};
pub use manifest::{
    Dimension, DimensionOption, Feature, FeatureSpec, GateRule, Hint, Manifest, Requirement,
    RequirementLevel, Selection, SelectionValue,
};
pub use registry::DimensionRegistry;
pub use render::{OutputFormat, PresentationOptions};
pub use validation::{
    validate, validate_cross_dimension_compatibility, validate_domain, validate_feature_needs,
    validate_gates_enforcement, validate_hints_consistency, validate_runtime, validate_schema,
    CompatibilityRule, IssueKind, ManifestSource, RuleSet, ValidateOptions, ValidationError,
    ValidationMode, ValidationResult, ValidationWarning, Validator,
};
