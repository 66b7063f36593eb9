//! Concrete user selection against a manifest

use super::FEATURES_DIMENSION;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Value chosen for one dimension: a single option id or several
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SelectionValue {
    Single(String),
    Multiple(Vec<String>),
}

impl SelectionValue {
    /// Chosen ids, skipping empty strings
    pub fn values(&self) -> Vec<&str> {
        let all: Vec<&str> = match self {
            SelectionValue::Single(v) => vec![v.as_str()],
            SelectionValue::Multiple(vs) => vs.iter().map(String::as_str).collect(),
        };
        all.into_iter().filter(|v| !v.is_empty()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.values().contains(&id)
    }
}

impl From<&str> for SelectionValue {
    fn from(v: &str) -> Self {
        SelectionValue::Single(v.to_string())
    }
}

impl From<Vec<&str>> for SelectionValue {
    fn from(vs: Vec<&str>) -> Self {
        SelectionValue::Multiple(vs.into_iter().map(str::to_string).collect())
    }
}

/// Dimension name -> chosen value(s)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection {
    pub values: BTreeMap<String, SelectionValue>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, dimension: &str, value: impl Into<SelectionValue>) -> Self {
        self.values.insert(dimension.to_string(), value.into());
        self
    }

    pub fn get(&self, dimension: &str) -> Option<&SelectionValue> {
        self.values.get(dimension)
    }

    /// Chosen ids for a dimension; empty when nothing was chosen
    pub fn values_for(&self, dimension: &str) -> Vec<&str> {
        self.get(dimension).map(|v| v.values()).unwrap_or_default()
    }

    /// Whether the dimension has a value other than the literal `none`
    pub fn has_real_value(&self, dimension: &str) -> bool {
        self.values_for(dimension).iter().any(|v| *v != "none")
    }

    /// Ids listed under the `features` key
    pub fn features(&self) -> Vec<&str> {
        self.values_for(FEATURES_DIMENSION)
    }

    pub fn has_feature(&self, id: &str) -> bool {
        self.features().contains(&id)
    }

    /// Copy of this selection with `enabled` merged into the `features` key
    pub fn with_features(&self, enabled: &[String]) -> Selection {
        if enabled.is_empty() {
            return self.clone();
        }
        let mut features: Vec<String> = self.features().into_iter().map(str::to_string).collect();
        for id in enabled {
            if !features.contains(id) {
                features.push(id.clone());
            }
        }
        let mut merged = self.clone();
        merged
            .values
            .insert(FEATURES_DIMENSION.to_string(), SelectionValue::Multiple(features));
        merged
    }
}
