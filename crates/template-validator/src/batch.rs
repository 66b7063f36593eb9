//! Validating every template of a multi-template repository
//!
//! A templates directory either carries a root index (`template.yaml` with a
//! `templates:` list of subdirectories) or is walked for every
//! `template.yaml` it contains. Manifests are validated concurrently; results
//! are independent of each other and returned sorted by path.

use crate::loader::MANIFEST_FILE;
use crate::validation::{ValidateOptions, ValidationMode, ValidationResult, Validator};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;
use walkdir::WalkDir;

/// Root index listing template directories (`templates/template.yaml`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateIndex {
    /// Template directory names, relative to the index
    pub templates: Vec<String>,
}

impl TemplateIndex {
    /// Read the index at `root/template.yaml`, if that file is one
    pub fn read(root: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(root.join(MANIFEST_FILE)).ok()?;
        serde_yaml::from_str(&content).ok()
    }
}

/// Find the manifests below `root`
pub fn discover_manifests(root: &Path) -> Vec<PathBuf> {
    if let Some(index) = TemplateIndex::read(root) {
        tracing::debug!(templates = index.templates.len(), "using root template index");
        return index
            .templates
            .iter()
            .map(|name| root.join(name).join(MANIFEST_FILE))
            .collect();
    }

    let mut found: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file() && entry.file_name() == MANIFEST_FILE)
        .map(|entry| entry.into_path())
        .collect();
    found.sort();
    found
}

/// Validate many manifests concurrently.
///
/// Each manifest gets its own blocking task; a listed manifest that does not
/// exist yields a `LOAD_ERROR` result like any other load failure.
pub async fn validate_many(
    validator: Arc<Validator>,
    paths: Vec<PathBuf>,
    mode: ValidationMode,
    options: Arc<ValidateOptions>,
) -> Vec<(PathBuf, ValidationResult)> {
    run_checks(paths, move |path| validator.validate(path, mode, &options)).await
}

/// Run `check` once per path on the blocking pool.
///
/// Every input path gets exactly one entry: a task that dies before
/// reporting is recorded as a `LOAD_ERROR` for its path.
async fn run_checks<F>(paths: Vec<PathBuf>, check: F) -> Vec<(PathBuf, ValidationResult)>
where
    F: Fn(&Path) -> ValidationResult + Send + Sync + 'static,
{
    let check = Arc::new(check);
    let mut pending = paths.clone();
    let mut tasks = JoinSet::new();

    for path in paths {
        let check = Arc::clone(&check);
        tasks.spawn_blocking(move || {
            let result = check(&path);
            (path, result)
        });
    }

    let mut results = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((path, result)) => {
                if let Some(idx) = pending.iter().position(|p| *p == path) {
                    pending.swap_remove(idx);
                }
                results.push((path, result));
            }
            Err(e) => tracing::error!(error = %e, "validation task failed"),
        }
    }

    for path in pending {
        let result = ValidationResult::load_failure(
            format!("Validation of {} did not complete", path.display()),
            path.display().to_string(),
        );
        results.push((path, result));
    }

    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::IssueKind;
    use std::fs;

    const VALID: &str = "dimensions:\n  deployment:\n    options: [{id: vercel}]\n";

    #[test]
    fn test_discover_with_index() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(MANIFEST_FILE), "templates: [web, api]\n").unwrap();
        let found = discover_manifests(dir.path());
        assert_eq!(
            found,
            vec![
                dir.path().join("web").join(MANIFEST_FILE),
                dir.path().join("api").join(MANIFEST_FILE)
            ]
        );
    }

    #[test]
    fn test_discover_by_walking() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b", "a/nested"] {
            fs::create_dir_all(dir.path().join(name)).unwrap();
            fs::write(dir.path().join(name).join(MANIFEST_FILE), VALID).unwrap();
        }
        fs::write(dir.path().join("README.md"), "docs").unwrap();

        let found = discover_manifests(dir.path());
        assert_eq!(found.len(), 2);
        assert!(found[0].ends_with("a/nested/template.yaml"));
    }

    #[tokio::test]
    async fn test_validate_many_sorted_and_independent() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("good")).unwrap();
        fs::write(dir.path().join("good").join(MANIFEST_FILE), VALID).unwrap();

        let paths = vec![
            dir.path().join("missing").join(MANIFEST_FILE),
            dir.path().join("good").join(MANIFEST_FILE),
        ];
        let results = validate_many(
            Arc::new(Validator::default()),
            paths,
            ValidationMode::Strict,
            Arc::new(ValidateOptions::default()),
        )
        .await;

        assert_eq!(results.len(), 2);
        assert!(results[0].0.ends_with("good/template.yaml"));
        assert!(results[0].1.valid);
        assert!(!results[1].1.valid);
    }

    #[tokio::test]
    async fn test_panicked_check_still_reports_its_path() {
        let paths = vec![PathBuf::from("a/template.yaml"), PathBuf::from("b/template.yaml")];
        let results = run_checks(paths, |path| {
            if path.starts_with("b") {
                panic!("validator crashed");
            }
            ValidationResult::new(Vec::new(), Vec::new())
        })
        .await;

        assert_eq!(results.len(), 2);
        assert!(results[0].1.valid);
        assert_eq!(results[1].0, PathBuf::from("b/template.yaml"));
        assert!(!results[1].1.valid);
        assert_eq!(results[1].1.errors[0].kind, IssueKind::LoadError);
        assert!(results[1].1.errors[0].message.contains("did not complete"));
    }
}
