//! Validation result types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Category of a validation finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueKind {
    /// Manifest could not be found, read or parsed
    LoadError,
    /// Local structural defect in the manifest
    SchemaViolation,
    /// Cross-reference inside the manifest does not resolve
    DomainViolation,
    GatesViolation,
    FeatureNeedsViolation,
    CrossDimensionViolation,
    HintsConsistencyViolation,
}

impl IssueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IssueKind::LoadError => "LOAD_ERROR",
            IssueKind::SchemaViolation => "SCHEMA_VIOLATION",
            IssueKind::DomainViolation => "DOMAIN_VIOLATION",
            IssueKind::GatesViolation => "GATES_VIOLATION",
            IssueKind::FeatureNeedsViolation => "FEATURE_NEEDS_VIOLATION",
            IssueKind::CrossDimensionViolation => "CROSS_DIMENSION_VIOLATION",
            IssueKind::HintsConsistencyViolation => "HINTS_CONSISTENCY_VIOLATION",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single finding: `{type, message, location?, suggestion?}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    #[serde(rename = "type")]
    pub kind: IssueKind,

    pub message: String,

    /// Dotted path into the manifest or selection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// "Did you mean" hint for unknown identifiers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Warnings share the error shape; only their list differs
pub type ValidationWarning = ValidationError;

impl ValidationError {
    pub fn new(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            location: None,
            suggestion: None,
        }
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: Option<String>) -> Self {
        self.suggestion = suggestion;
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        if let Some(location) = &self.location {
            write!(f, " (at {})", location)?;
        }
        Ok(())
    }
}

/// Aggregated outcome of one validation call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn new(errors: Vec<ValidationError>, warnings: Vec<ValidationWarning>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self::new(errors, Vec::new())
    }

    /// Result holding a single load failure
    pub fn load_failure(message: impl Into<String>, location: impl Into<String>) -> Self {
        Self::from_errors(vec![
            ValidationError::new(IssueKind::LoadError, message).at(location)
        ])
    }

    /// Append another result, keeping `valid` consistent with `errors`
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.valid = self.errors.is_empty();
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Errors of one kind
    pub fn errors_of(&self, kind: IssueKind) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(move |e| e.kind == kind)
    }
}
