//! Recognized dimension vocabulary
//!
//! The schema tier rejects dimension names the registry does not know. The
//! registry is injected rather than hard-coded so a closed vocabulary and an
//! open, product-extensible one are both representable.

use std::collections::BTreeSet;

/// Built-in dimension names
pub const BUILTIN_DIMENSIONS: &[&str] = &[
    "deployment",
    "runtime",
    "language",
    "framework",
    "database",
    "orm",
    "storage",
    "cache",
    "queue",
    "auth",
    "payments",
    "email",
    "analytics",
    "monitoring",
    "search",
    "styling",
    "testing",
    "ci",
    "features",
];

/// Set of dimension names the schema tier accepts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionRegistry {
    /// `None` accepts every name
    names: Option<BTreeSet<String>>,
}

impl Default for DimensionRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl DimensionRegistry {
    /// Registry holding the built-in vocabulary
    pub fn builtin() -> Self {
        Self::from_names(BUILTIN_DIMENSIONS.iter().copied())
    }

    /// Registry that recognizes nothing until extended
    pub fn empty() -> Self {
        Self {
            names: Some(BTreeSet::new()),
        }
    }

    /// Registry that accepts any dimension name
    pub fn open() -> Self {
        Self { names: None }
    }

    pub fn is_open(&self) -> bool {
        self.names.is_none()
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: Some(names.into_iter().map(Into::into).collect()),
        }
    }

    pub fn with_dimension(mut self, name: impl Into<String>) -> Self {
        self.insert(name);
        self
    }

    /// Add a name; a no-op on an open registry
    pub fn insert(&mut self, name: impl Into<String>) {
        let name = name.into();
        let name = name.trim();
        if let Some(names) = &mut self.names {
            if !name.is_empty() {
                names.insert(name.to_string());
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        match &self.names {
            Some(names) => names.contains(name),
            None => true,
        }
    }

    /// Explicitly listed names; empty for an open registry
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().flatten().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_vocabulary() {
        let registry = DimensionRegistry::default();
        assert!(registry.contains("deployment"));
        assert!(registry.contains("features"));
        assert!(!registry.contains("color"));
    }

    #[test]
    fn test_extension() {
        let registry = DimensionRegistry::builtin().with_dimension("region");
        assert!(registry.contains("region"));
    }

    #[test]
    fn test_open_registry_accepts_everything() {
        let registry = DimensionRegistry::open().with_dimension("region");
        assert!(registry.is_open());
        assert!(registry.contains("region"));
        assert!(registry.contains("anything"));
        assert_eq!(registry.names().count(), 0);
        assert!(!DimensionRegistry::empty().contains("deployment"));
    }

    #[test]
    fn test_blank_names_ignored() {
        let registry = DimensionRegistry::empty().with_dimension("  ");
        assert_eq!(registry.names().count(), 0);
    }
}
