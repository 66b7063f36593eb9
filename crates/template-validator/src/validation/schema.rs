//! Structural validation of a manifest
//!
//! Only local shape is inspected here: every dimension has options, every
//! option and feature carries its identifiers, and every name used as a
//! dimension belongs to the registry. Cross-references between sibling
//! declarations are the domain tier's job.

use super::result::{IssueKind, ValidationError};
use super::suggest;
use crate::manifest::{Manifest, Needs, Requirement, RequirementLevel};
use crate::registry::DimensionRegistry;
use std::collections::BTreeSet;

/// Schema tier bound to a dimension vocabulary
#[derive(Debug, Clone, Copy)]
pub struct SchemaValidator<'r> {
    registry: &'r DimensionRegistry,
}

impl<'r> SchemaValidator<'r> {
    pub fn new(registry: &'r DimensionRegistry) -> Self {
        Self { registry }
    }

    pub fn validate(&self, manifest: &Manifest) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        self.check_dimensions(manifest, &mut errors);
        self.check_gates(manifest, &mut errors);
        self.check_features(manifest, &mut errors);
        self.check_auxiliary_needs(manifest, &mut errors);
        tracing::debug!(errors = errors.len(), "schema validation finished");
        errors
    }

    fn unknown_dimension(&self, name: &str, context: &str, location: String) -> ValidationError {
        error(format!("Unknown dimension '{}'{}", name, context), location)
            .with_suggestion(suggest::closest(name, self.registry.names()))
    }

    fn check_dimensions(&self, manifest: &Manifest, errors: &mut Vec<ValidationError>) {
        for (name, dimension) in &manifest.dimensions {
            let location = format!("dimensions.{}", name);

            if !self.registry.contains(name) {
                errors.push(self.unknown_dimension(name, "", location.clone()));
            }

            let Some(options) = &dimension.options else {
                errors.push(error(
                    format!("Dimension '{}' is missing an options array", name),
                    format!("{}.options", location),
                ));
                continue;
            };

            if options.is_empty() {
                errors.push(error(
                    format!("Dimension '{}' must declare at least one option (options is empty)", name),
                    format!("{}.options", location),
                ));
                continue;
            }

            let mut seen = BTreeSet::new();
            for (idx, option) in options.iter().enumerate() {
                match option.id.as_deref() {
                    Some(id) if !id.trim().is_empty() => {
                        if !seen.insert(id) {
                            errors.push(error(
                                format!("Dimension '{}' declares option '{}' more than once", name, id),
                                format!("{}.options[{}]", location, idx),
                            ));
                        }
                    }
                    _ => errors.push(error(
                        format!("Option at index {} in dimension '{}' is missing an id", idx, name),
                        format!("{}.options[{}].id", location, idx),
                    )),
                }
            }
        }
    }

    fn check_gates(&self, manifest: &Manifest, errors: &mut Vec<ValidationError>) {
        for (dimension, by_option) in &manifest.gates {
            if !self.registry.contains(dimension) {
                errors.push(self.unknown_dimension(
                    dimension,
                    " used as a gate key",
                    format!("gates.{}", dimension),
                ));
            }

            for (option, rule) in by_option {
                for (form, target, _) in rule.constraints() {
                    if !self.registry.contains(target) {
                        errors.push(self.unknown_dimension(
                            target,
                            &format!(" in gate '{}.{}'", dimension, option),
                            format!("gates.{}.{}.{}.{}", dimension, option, form.as_str(), target),
                        ));
                    }
                }
            }
        }
    }

    fn check_features(&self, manifest: &Manifest, errors: &mut Vec<ValidationError>) {
        let mut seen = BTreeSet::new();

        for (idx, feature) in manifest.features.iter().enumerate() {
            let location = format!("features[{}]", idx);
            let id = feature.id.as_deref().filter(|id| !id.trim().is_empty());
            let display = id.unwrap_or("<unnamed>");

            match id {
                Some(id) => {
                    if !seen.insert(id) {
                        errors.push(error(
                            format!("Feature '{}' is declared more than once", id),
                            format!("{}.id", location),
                        ));
                    }
                }
                None => errors.push(error(
                    format!("Feature at index {} is missing an id", idx),
                    format!("{}.id", location),
                )),
            }

            if feature.label.as_deref().map_or(true, |l| l.trim().is_empty()) {
                errors.push(error(
                    format!("Feature '{}' is missing a label", display),
                    format!("{}.label", location),
                ));
            }

            match &feature.needs {
                Some(needs) => self.check_needs(
                    needs,
                    &format!("Feature '{}'", display),
                    &format!("{}.needs", location),
                    errors,
                ),
                None => errors.push(error(
                    format!("Feature '{}' is missing needs", display),
                    format!("{}.needs", location),
                )),
            }
        }
    }

    /// Requirement levels in `featureSpecs` and `hints` follow the same rules
    fn check_auxiliary_needs(&self, manifest: &Manifest, errors: &mut Vec<ValidationError>) {
        for (id, spec) in manifest.feature_specs.iter().flatten() {
            self.check_needs(
                &spec.needs,
                &format!("Feature spec '{}'", id),
                &format!("featureSpecs.{}.needs", id),
                errors,
            );
        }
        for (id, hint) in &manifest.hints {
            self.check_needs(
                &hint.needs,
                &format!("Hint '{}'", id),
                &format!("hints.{}.needs", id),
                errors,
            );
        }
    }

    fn check_needs(
        &self,
        needs: &Needs,
        owner: &str,
        location: &str,
        errors: &mut Vec<ValidationError>,
    ) {
        for (dimension, requirement) in needs {
            if !self.registry.contains(dimension) {
                errors.push(self.unknown_dimension(
                    dimension,
                    &format!(" in needs of {}", owner),
                    format!("{}.{}", location, dimension),
                ));
            }
            if let Requirement::Unrecognized(raw) = requirement {
                errors.push(error(
                    format!(
                        "{} has invalid requirement '{}' for dimension '{}'; must be one of: {}",
                        owner,
                        raw,
                        dimension,
                        RequirementLevel::ALLOWED.join(", ")
                    ),
                    format!("{}.{}", location, dimension),
                ));
            }
        }
    }
}

fn error(message: String, location: String) -> ValidationError {
    ValidationError::new(IssueKind::SchemaViolation, message).at(location)
}
