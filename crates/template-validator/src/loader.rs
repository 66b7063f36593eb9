//! Manifest and selection loading
//!
//! Reads YAML (default) or JSON (`.json` extension) documents. A directory
//! path resolves to the `template.yaml` inside it.

use crate::manifest::{Manifest, Selection, DEPLOYMENT_DIMENSION};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// File name of a template manifest inside its directory
pub const MANIFEST_FILE: &str = "template.yaml";

/// Failure to produce an in-memory document from a path
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Manifest not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },
}

impl LoadError {
    pub fn path(&self) -> &Path {
        match self {
            LoadError::NotFound { path }
            | LoadError::Read { path, .. }
            | LoadError::Parse { path, .. } => path,
        }
    }
}

/// Resolve a manifest path, mapping directories to their `template.yaml`
pub fn resolve_manifest_path(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(MANIFEST_FILE)
    } else {
        path.to_path_buf()
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn parse<T: DeserializeOwned>(path: &Path, content: &str) -> Result<T, LoadError> {
    let parsed = if is_json(path) {
        serde_json::from_str(content).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    };
    parsed.map_err(|reason| LoadError::Parse {
        path: path.to_path_buf(),
        reason,
    })
}

fn read_error(path: &Path, source: std::io::Error) -> LoadError {
    if source.kind() == std::io::ErrorKind::NotFound {
        LoadError::NotFound {
            path: path.to_path_buf(),
        }
    } else {
        LoadError::Read {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Load a manifest without blocking the async runtime
pub async fn load_manifest(path: &Path) -> Result<Manifest, LoadError> {
    let path = resolve_manifest_path(path);
    tracing::debug!(path = %path.display(), "loading manifest");
    let content = fs::read_to_string(&path)
        .await
        .map_err(|e| read_error(&path, e))?;
    parse(&path, &content)
}

/// Load a manifest on the current thread
pub fn load_manifest_blocking(path: &Path) -> Result<Manifest, LoadError> {
    let path = resolve_manifest_path(path);
    tracing::debug!(path = %path.display(), "loading manifest");
    let content = std::fs::read_to_string(&path).map_err(|e| read_error(&path, e))?;
    parse(&path, &content)
}

/// Everything runtime validation needs besides the manifest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeRequest {
    #[serde(default)]
    pub selection: Selection,

    #[serde(default)]
    pub deployment_target: String,

    #[serde(default)]
    pub enabled_features: Vec<String>,
}

impl RuntimeRequest {
    /// Build a request; an empty target falls back to the selection's deployment
    pub fn new(selection: Selection, deployment_target: &str, enabled_features: Vec<String>) -> Self {
        Self {
            selection,
            deployment_target: deployment_target.to_string(),
            enabled_features,
        }
        .normalized()
    }

    fn normalized(mut self) -> Self {
        if self.deployment_target.is_empty() {
            if let Some(first) = self.selection.values_for(DEPLOYMENT_DIMENSION).first() {
                self.deployment_target = first.to_string();
            }
        }
        self
    }
}

/// Load a selection document:
/// `{ selection: {dim: value}, deploymentTarget?, enabledFeatures? }`
pub fn load_selection(path: &Path) -> Result<RuntimeRequest, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|e| read_error(path, e))?;
    let request: RuntimeRequest = parse(path, &content)?;
    Ok(request.normalized())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_not_found() {
        let err = load_manifest_blocking(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, LoadError::NotFound { .. }));
        assert!(err.to_string().starts_with("Manifest not found"));
    }

    #[test]
    fn test_json_detection() {
        assert!(is_json(Path::new("a/template.JSON")));
        assert!(!is_json(Path::new("a/template.yaml")));
    }

    #[test]
    fn test_parse_error_names_path() {
        let err = parse::<Manifest>(Path::new("bad.yaml"), "dimensions: [1, 2").unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
        assert_eq!(err.path(), Path::new("bad.yaml"));
    }

    #[test]
    fn test_request_target_falls_back_to_selection() {
        let selection = Selection::new().with("deployment", "vercel");
        let request = RuntimeRequest::new(selection, "", Vec::new());
        assert_eq!(request.deployment_target, "vercel");

        let explicit = RuntimeRequest::new(Selection::new(), "netlify", Vec::new());
        assert_eq!(explicit.deployment_target, "netlify");
    }
}
