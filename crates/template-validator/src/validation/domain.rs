//! Cross-reference validation of a manifest
//!
//! Assumes the manifest already passed the schema tier: every identifier a
//! gate, a `needs` map, a default or a hint mentions must resolve to
//! something declared in the same manifest.

use super::result::{IssueKind, ValidationError};
use super::suggest;
use crate::manifest::{Manifest, Needs};

/// Run every domain check and collect the errors
pub fn validate_domain(manifest: &Manifest) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    check_defaults(manifest, &mut errors);
    check_gates(manifest, &mut errors);
    check_needs_targets(manifest, &mut errors);
    check_spec_parity(manifest, &mut errors);
    check_hint_content(manifest, &mut errors);
    tracing::debug!(errors = errors.len(), "domain validation finished");
    errors
}

fn error(message: String, location: String) -> ValidationError {
    ValidationError::new(IssueKind::DomainViolation, message).at(location)
}

fn declared_dimensions(manifest: &Manifest) -> impl Iterator<Item = &str> {
    manifest.dimensions.keys().map(String::as_str)
}

fn invalid_dimension(manifest: &Manifest, name: &str, what: &str, location: String) -> ValidationError {
    error(
        format!("{} '{}' is not a valid dimension in this manifest", what, name),
        location,
    )
    .with_suggestion(suggest::closest(name, declared_dimensions(manifest)))
}

fn check_defaults(manifest: &Manifest, errors: &mut Vec<ValidationError>) {
    for (name, dimension) in &manifest.dimensions {
        if let Some(default) = &dimension.default {
            if !dimension.has_option(default) {
                errors.push(
                    error(
                        format!(
                            "Default '{}' of dimension '{}' is not one of its options",
                            default, name
                        ),
                        format!("dimensions.{}.default", name),
                    )
                    .with_suggestion(suggest::closest(default, dimension.option_ids())),
                );
            }
        }
    }
}

fn check_gates(manifest: &Manifest, errors: &mut Vec<ValidationError>) {
    for (dimension, by_option) in &manifest.gates {
        let Some(outer) = manifest.known_values(dimension) else {
            errors.push(invalid_dimension(
                manifest,
                dimension,
                "Gate dimension",
                format!("gates.{}", dimension),
            ));
            continue;
        };

        for (option, rule) in by_option {
            let gate = format!("{}.{}", dimension, option);

            if !outer.contains(option.as_str()) {
                errors.push(
                    error(
                        format!(
                            "Gate '{}' references invalid value '{}' for dimension '{}'",
                            gate, option, dimension
                        ),
                        format!("gates.{}", gate),
                    )
                    .with_suggestion(suggest::closest(option, outer.iter().copied())),
                );
            }

            for (form, target, ids) in rule.constraints() {
                let location = format!("gates.{}.{}.{}", gate, form.as_str(), target);
                let Some(values) = manifest.known_values(target) else {
                    errors.push(invalid_dimension(
                        manifest,
                        target,
                        &format!("Gate '{}' constraint target", gate),
                        location,
                    ));
                    continue;
                };

                for id in ids {
                    if !values.contains(id.as_str()) {
                        errors.push(
                            error(
                                format!(
                                    "Gate '{}' references invalid value '{}' for dimension '{}'",
                                    gate, id, target
                                ),
                                location.clone(),
                            )
                            .with_suggestion(suggest::closest(id, values.iter().copied())),
                        );
                    }
                }
            }
        }
    }
}

fn check_needs_targets(manifest: &Manifest, errors: &mut Vec<ValidationError>) {
    let mut check = |needs: &Needs, owner: String, location: String| {
        for dimension in needs.keys() {
            if manifest.known_values(dimension).is_none() {
                errors.push(invalid_dimension(
                    manifest,
                    dimension,
                    &format!("In needs of {}, dimension", owner),
                    format!("{}.{}", location, dimension),
                ));
            }
        }
    };

    for (idx, feature) in manifest.features.iter().enumerate() {
        if let Some(needs) = &feature.needs {
            let id = feature.id.as_deref().unwrap_or("<unnamed>");
            check(needs, format!("feature '{}'", id), format!("features[{}].needs", idx));
        }
    }
    for (id, spec) in manifest.feature_specs.iter().flatten() {
        check(
            &spec.needs,
            format!("feature spec '{}'", id),
            format!("featureSpecs.{}.needs", id),
        );
    }
    for (id, hint) in &manifest.hints {
        check(&hint.needs, format!("hint '{}'", id), format!("hints.{}.needs", id));
    }
}

/// With split declarations and specifications, each side must mirror the other
fn check_spec_parity(manifest: &Manifest, errors: &mut Vec<ValidationError>) {
    let Some(specs) = &manifest.feature_specs else {
        return;
    };
    let declared = manifest.declared_feature_ids();

    for id in &declared {
        if !specs.contains_key(*id) {
            errors.push(error(
                format!("Feature '{}' has no matching specification in featureSpecs", id),
                format!("featureSpecs.{}", id),
            ));
        }
    }
    for id in specs.keys() {
        if !declared.contains(id.as_str()) {
            errors.push(
                error(
                    format!("Feature spec '{}' has no matching feature declaration", id),
                    format!("featureSpecs.{}", id),
                )
                .with_suggestion(suggest::closest(id, declared.iter().copied())),
            );
        }
    }
}

/// Hints without content cannot be rendered
fn check_hint_content(manifest: &Manifest, errors: &mut Vec<ValidationError>) {
    for (id, hint) in &manifest.hints {
        if hint.label.as_deref().map_or(true, |l| l.trim().is_empty()) {
            errors.push(error(
                format!("Hint '{}' is missing a label", id),
                format!("hints.{}.label", id),
            ));
        }
        if hint.description.as_deref().map_or(true, |d| d.trim().is_empty()) {
            errors.push(error(
                format!("Hint '{}' is missing a description", id),
                format!("hints.{}.description", id),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = r#"
dimensions:
  deployment:
    default: vercel
    options: [{id: vercel}, {id: cloudflare-workers}]
  database:
    options: [{id: postgres}, {id: d1}, {id: none}]
features:
  - id: auth
    label: Auth
    needs: {database: required}
"#;

    fn run(extra: &str) -> Vec<ValidationError> {
        let manifest: Manifest = serde_yaml::from_str(&format!("{}{}", BASE, extra)).unwrap();
        validate_domain(&manifest)
    }

    #[test]
    fn test_consistent_manifest() {
        let errors = run(r#"
gates:
  deployment:
    cloudflare-workers:
      allowed: {database: [d1, none]}
      forbidden: {features: [auth]}
hints:
  auth: {label: Auth, description: Sign-in, needs: {database: required}}
"#);
        assert!(errors.is_empty(), "{:?}", errors);
    }

    #[test]
    fn test_gate_outer_key_must_be_declared() {
        let errors = run("gates:\n  storage:\n    s3:\n      allowed: {database: [d1]}\n");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("not a valid dimension"));
        assert_eq!(errors[0].kind, IssueKind::DomainViolation);
    }

    #[test]
    fn test_gate_target_must_be_declared() {
        let errors = run("gates:\n  deployment:\n    vercel:\n      allowed: {storage: [s3]}\n");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("'storage' is not a valid dimension"));
    }

    #[test]
    fn test_gate_values_must_exist() {
        let errors = run(
            "gates:\n  deployment:\n    netlify:\n      allowed: {database: [postgress]}\n",
        );
        assert_eq!(errors.len(), 2);
        assert!(errors[0].message.contains("invalid value 'netlify'"));
        assert!(errors[1].message.contains("invalid value 'postgress'"));
        assert_eq!(
            errors[1].suggestion.as_deref(),
            Some("did you mean 'postgres'?")
        );
    }

    #[test]
    fn test_forbidden_feature_must_be_declared() {
        let errors = run(
            "gates:\n  deployment:\n    vercel:\n      forbidden: {features: [payments]}\n",
        );
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("'payments'"));
    }

    #[test]
    fn test_needs_target_must_be_declared() {
        let errors = run(r#"
featureSpecs:
  auth: {needs: {storage: optional}}
"#);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("'storage' is not a valid dimension"));
    }

    #[test]
    fn test_spec_parity_both_ways() {
        let errors = run(r#"
featureSpecs:
  billing: {label: Billing}
"#);
        let msgs: Vec<_> = errors.iter().map(|e| e.message.as_str()).collect();
        assert!(msgs.contains(&"Feature 'auth' has no matching specification in featureSpecs"));
        assert!(msgs.contains(&"Feature spec 'billing' has no matching feature declaration"));
    }

    #[test]
    fn test_hints_need_label_and_description() {
        let errors = run("hints:\n  auth: {needs: {database: required}}\n");
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.kind == IssueKind::DomainViolation));
    }

    #[test]
    fn test_default_must_be_an_option() {
        let mut manifest: Manifest = serde_yaml::from_str(BASE).unwrap();
        manifest.dimensions.get_mut("database").unwrap().default = Some("mysql".to_string());
        let errors = validate_domain(&manifest);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("Default 'mysql'"));
    }
}
