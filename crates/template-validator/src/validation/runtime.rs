//! Selection-time validation
//!
//! Four independent checks run against a concrete selection:
//!
//! - gate enforcement for the chosen deployment target
//! - `required` feature dependencies
//! - the built-in cross-dimension compatibility matrix
//! - hints/spec consistency (warnings only)
//!
//! Each check is callable on its own; [`RuntimeValidator::validate`] composes
//! them into one [`ValidationResult`].

use super::compat::RuleSet;
use super::result::{IssueKind, ValidationError, ValidationResult, ValidationWarning};
use super::suggest;
use crate::manifest::{
    Manifest, RequirementLevel, Selection, SelectionValue, DEPLOYMENT_DIMENSION,
};

/// Runtime tier bound to a compatibility rule set
#[derive(Debug, Clone, Copy)]
pub struct RuntimeValidator<'r> {
    rules: &'r RuleSet,
}

impl<'r> RuntimeValidator<'r> {
    pub fn new(rules: &'r RuleSet) -> Self {
        Self { rules }
    }

    /// Run all four checks.
    ///
    /// `enabled_features` are merged into the selection's `features` key, and
    /// a non-empty `deployment_target` replaces the `deployment` key, so gates,
    /// feature needs and rules see one consistent picture.
    pub fn validate(
        &self,
        manifest: &Manifest,
        selection: &Selection,
        deployment_target: &str,
        enabled_features: &[String],
    ) -> ValidationResult {
        let effective = effective_selection(selection, deployment_target, enabled_features);
        let features: Vec<String> = effective.features().into_iter().map(str::to_string).collect();

        let mut errors = validate_gates_enforcement(manifest, &effective, deployment_target);
        errors.extend(validate_feature_needs(manifest, &features, &effective));
        errors.extend(self.cross_dimension(manifest, &effective));
        let warnings = validate_hints_consistency(manifest);

        tracing::debug!(
            deployment = deployment_target,
            errors = errors.len(),
            warnings = warnings.len(),
            "runtime validation finished"
        );
        ValidationResult::new(errors, warnings)
    }

    /// Evaluate the injected compatibility matrix.
    ///
    /// The matrix is global knowledge; the manifest is not consulted.
    pub fn cross_dimension(&self, _manifest: &Manifest, selection: &Selection) -> Vec<ValidationError> {
        self.rules
            .evaluate(selection)
            .into_iter()
            .map(|(rule, message)| {
                ValidationError::new(IssueKind::CrossDimensionViolation, message)
                    .at(format!("rules.{}", rule))
            })
            .collect()
    }
}

fn effective_selection(
    selection: &Selection,
    deployment_target: &str,
    enabled_features: &[String],
) -> Selection {
    let mut effective = selection.with_features(enabled_features);
    if !deployment_target.is_empty() {
        let selected = effective.values_for(DEPLOYMENT_DIMENSION);
        if !selected.is_empty() && selected != [deployment_target] {
            tracing::debug!(
                selected = ?selected,
                deployment = deployment_target,
                "deployment target overrides selected deployment"
            );
        }
        effective.values.insert(
            DEPLOYMENT_DIMENSION.to_string(),
            SelectionValue::Single(deployment_target.to_string()),
        );
    }
    effective
}

/// Compose all runtime checks with the built-in compatibility matrix
pub fn validate_runtime(
    manifest: &Manifest,
    selection: &Selection,
    deployment_target: &str,
    enabled_features: &[String],
) -> ValidationResult {
    let rules = RuleSet::builtin();
    RuntimeValidator::new(&rules).validate(manifest, selection, deployment_target, enabled_features)
}

/// Enforce the gate declared for `deployment_target`, if any.
///
/// Without a gate the selection is accepted. Array-valued selections are
/// checked element by element.
pub fn validate_gates_enforcement(
    manifest: &Manifest,
    selection: &Selection,
    deployment_target: &str,
) -> Vec<ValidationError> {
    let Some(rule) = manifest
        .gates
        .get(DEPLOYMENT_DIMENSION)
        .and_then(|by_option| by_option.get(deployment_target))
    else {
        tracing::trace!(deployment = deployment_target, "no gate for deployment target");
        return Vec::new();
    };

    let mut errors = Vec::new();

    for (dimension, allowed) in &rule.allowed {
        for value in selection.values_for(dimension) {
            if !allowed.iter().any(|a| a == value) {
                errors.push(
                    ValidationError::new(
                        IssueKind::GatesViolation,
                        format!(
                            "Deployment '{}' does not allow {} '{}' (allowed: {})",
                            deployment_target,
                            dimension,
                            value,
                            allowed.join(", ")
                        ),
                    )
                    .at(format!("selection.{}", dimension)),
                );
            }
        }
    }

    for (dimension, forbidden) in &rule.forbidden {
        for value in selection.values_for(dimension) {
            if forbidden.iter().any(|f| f == value) {
                errors.push(
                    ValidationError::new(
                        IssueKind::GatesViolation,
                        format!(
                            "Deployment '{}' forbids {} '{}'",
                            deployment_target, dimension, value
                        ),
                    )
                    .at(format!("selection.{}", dimension)),
                );
            }
        }
    }

    errors
}

/// Check `required` dependencies of every enabled feature
pub fn validate_feature_needs(
    manifest: &Manifest,
    enabled_features: &[String],
    selection: &Selection,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for feature in enabled_features {
        let Some(spec) = manifest.feature_spec(feature) else {
            errors.push(
                ValidationError::new(
                    IssueKind::FeatureNeedsViolation,
                    format!("Feature '{}' has no specification defined", feature),
                )
                .at(format!("features.{}", feature))
                .with_suggestion(suggest::closest(
                    feature,
                    manifest.declared_feature_ids().into_iter(),
                )),
            );
            continue;
        };

        let required = spec
            .needs
            .into_iter()
            .flatten()
            .filter(|(_, req)| req.level() == Some(RequirementLevel::Required));

        for (dimension, _) in required {
            let values = selection.values_for(dimension);
            let location = format!("selection.{}", dimension);

            if values.is_empty() {
                errors.push(
                    ValidationError::new(
                        IssueKind::FeatureNeedsViolation,
                        format!(
                            "Feature '{}' requires a value for dimension '{}'",
                            feature, dimension
                        ),
                    )
                    .at(location),
                );
                continue;
            }

            let Some(known) = manifest.known_values(dimension) else {
                continue;
            };
            for value in values {
                if !known.contains(value) {
                    errors.push(
                        ValidationError::new(
                            IssueKind::FeatureNeedsViolation,
                            format!(
                                "Feature '{}' requires dimension '{}', but '{}' is not one of its options",
                                feature, dimension, value
                            ),
                        )
                        .at(location.clone())
                        .with_suggestion(suggest::closest(value, known.iter().copied())),
                    );
                }
            }
        }
    }

    errors
}

/// Evaluate the built-in compatibility matrix against a selection
pub fn validate_cross_dimension_compatibility(
    manifest: &Manifest,
    selection: &Selection,
) -> Vec<ValidationError> {
    let rules = RuleSet::builtin();
    RuntimeValidator::new(&rules).cross_dimension(manifest, selection)
}

/// Compare hints with the feature specifications they mirror.
///
/// Everything reported here is a warning.
pub fn validate_hints_consistency(manifest: &Manifest) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();
    let warn = |message: String, location: String| {
        ValidationError::new(IssueKind::HintsConsistencyViolation, message).at(location)
    };

    for (id, hint) in &manifest.hints {
        let Some(spec) = manifest.feature_spec(id) else {
            warnings.push(
                warn(
                    format!("Hint '{}' has no matching feature: no feature spec exists", id),
                    format!("hints.{}", id),
                )
                .with_suggestion(suggest::closest(
                    id,
                    manifest.declared_feature_ids().into_iter(),
                )),
            );
            continue;
        };

        if let Some(spec_needs) = spec.needs {
            for (dimension, hinted) in &hint.needs {
                match spec_needs.get(dimension) {
                    Some(specified) if specified != hinted => warnings.push(warn(
                        format!(
                            "Hint '{}' declares '{}' for dimension '{}' but the feature spec has a different requirement '{}'",
                            id, hinted, dimension, specified
                        ),
                        format!("hints.{}.needs.{}", id, dimension),
                    )),
                    _ => {}
                }
            }
        }

        if spec.label.map_or(true, |l| l.trim().is_empty()) {
            warnings.push(warn(
                format!("Feature spec '{}' has a hint but no label", id),
                format!("featureSpecs.{}.label", id),
            ));
        }
        if spec.description.map_or(true, |d| d.trim().is_empty()) {
            warnings.push(warn(
                format!("Feature spec '{}' has a hint but no description", id),
                format!("featureSpecs.{}.description", id),
            ));
        }
    }

    warnings
}
