//! Template manifest types
//!
//! A manifest declares the configuration space of a template: its dimensions
//! (deployment target, database, storage, ...), per-option gates, optional
//! features with their dimension requirements, and advisory hints.
//!
//! Fields the schema tier has to report on stay optional here so that a
//! malformed manifest still loads and can be described, rather than failing
//! deserialization with an opaque parser message.

pub mod selection;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub use selection::{Selection, SelectionValue};

/// Name of the pseudo-dimension whose values are enabled feature ids
pub const FEATURES_DIMENSION: &str = "features";

/// Name of the dimension carrying the deployment target
pub const DEPLOYMENT_DIMENSION: &str = "deployment";

/// A single selectable value of a dimension
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionOption {
    /// Stable identifier used in selections, gates and rules
    #[serde(default)]
    pub id: Option<String>,

    /// Human-readable label
    #[serde(default)]
    pub label: Option<String>,
}

impl DimensionOption {
    pub fn new(id: &str, label: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            label: Some(label.to_string()),
        }
    }
}

/// A named axis of template configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    #[serde(default)]
    pub label: Option<String>,

    /// Selectable options; `None` when the manifest omitted the array entirely
    #[serde(default)]
    pub options: Option<Vec<DimensionOption>>,

    /// Option id picked when the user makes no choice
    #[serde(default)]
    pub default: Option<String>,

    /// Whether more than one option may be selected at once
    #[serde(default)]
    pub multiple: bool,
}

impl Dimension {
    /// Non-empty option ids declared on this dimension
    pub fn option_ids(&self) -> impl Iterator<Item = &str> {
        self.options
            .iter()
            .flatten()
            .filter_map(|o| o.id.as_deref())
            .filter(|id| !id.is_empty())
    }

    pub fn has_option(&self, id: &str) -> bool {
        self.option_ids().any(|o| o == id)
    }
}

/// Constraints applied to other dimensions when a gated option is chosen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateRule {
    /// Target dimension -> option ids that remain allowed
    #[serde(default)]
    pub allowed: BTreeMap<String, Vec<String>>,

    /// Target dimension -> option ids that become forbidden
    #[serde(default)]
    pub forbidden: BTreeMap<String, Vec<String>>,
}

impl GateRule {
    /// Iterate over every constraint as (form, target dimension, ids)
    pub fn constraints(&self) -> impl Iterator<Item = (ConstraintForm, &str, &[String])> {
        self.allowed
            .iter()
            .map(|(dim, ids)| (ConstraintForm::Allowed, dim.as_str(), ids.as_slice()))
            .chain(
                self.forbidden
                    .iter()
                    .map(|(dim, ids)| (ConstraintForm::Forbidden, dim.as_str(), ids.as_slice())),
            )
    }
}

/// Which half of a gate rule a constraint comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintForm {
    Allowed,
    Forbidden,
}

impl ConstraintForm {
    pub fn as_str(self) -> &'static str {
        match self {
            ConstraintForm::Allowed => "allowed",
            ConstraintForm::Forbidden => "forbidden",
        }
    }
}

/// Gates keyed by dimension name, then by option id
pub type Gates = BTreeMap<String, BTreeMap<String, GateRule>>;

/// How strongly a feature depends on a dimension being set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementLevel {
    Required,
    Optional,
    None,
}

impl RequirementLevel {
    pub const ALLOWED: &'static [&'static str] = &["required", "optional", "none"];

    pub fn as_str(self) -> &'static str {
        match self {
            RequirementLevel::Required => "required",
            RequirementLevel::Optional => "optional",
            RequirementLevel::None => "none",
        }
    }
}

impl fmt::Display for RequirementLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `needs` value as written in the manifest
///
/// Anything other than the three known levels is kept verbatim so the schema
/// tier can name it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Requirement {
    Level(RequirementLevel),
    Unrecognized(String),
}

impl Requirement {
    pub fn level(&self) -> Option<RequirementLevel> {
        match self {
            Requirement::Level(level) => Some(*level),
            Requirement::Unrecognized(_) => None,
        }
    }
}

impl From<RequirementLevel> for Requirement {
    fn from(level: RequirementLevel) -> Self {
        Requirement::Level(level)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Level(level) => level.fmt(f),
            Requirement::Unrecognized(raw) => f.write_str(raw),
        }
    }
}

/// Dimension name -> requirement
pub type Needs = BTreeMap<String, Requirement>;

/// An optional capability bundle declared by the template
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub needs: Option<Needs>,
}

/// Feature specification kept apart from the declaration list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSpec {
    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub needs: Needs,
}

/// User-facing guidance mirroring a feature specification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub needs: Needs,
}

/// Borrowed view over whichever structure specifies a feature
#[derive(Debug, Clone, Copy)]
pub struct SpecView<'a> {
    pub label: Option<&'a str>,
    pub description: Option<&'a str>,
    pub needs: Option<&'a Needs>,
}

/// Template manifest (`template.yaml`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Semver version, compared against the CLI version by the front-end
    #[serde(default)]
    pub version: Option<String>,

    #[serde(default)]
    pub dimensions: BTreeMap<String, Dimension>,

    #[serde(default)]
    pub gates: Gates,

    #[serde(default)]
    pub features: Vec<Feature>,

    /// Present only when specifications are split from declarations
    #[serde(default)]
    pub feature_specs: Option<BTreeMap<String, FeatureSpec>>,

    #[serde(default)]
    pub hints: BTreeMap<String, Hint>,
}

impl Manifest {
    pub fn dimension(&self, name: &str) -> Option<&Dimension> {
        self.dimensions.get(name)
    }

    /// Ids of declared features, in declaration order
    pub fn feature_ids(&self) -> impl Iterator<Item = &str> {
        self.features
            .iter()
            .filter_map(|f| f.id.as_deref())
            .filter(|id| !id.is_empty())
    }

    pub fn feature(&self, id: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.id.as_deref() == Some(id))
    }

    /// Every feature id the manifest lists, from declarations and from the
    /// options of a `features` dimension
    pub fn declared_feature_ids(&self) -> BTreeSet<&str> {
        let mut ids: BTreeSet<&str> = self.feature_ids().collect();
        if let Some(dim) = self.dimension(FEATURES_DIMENSION) {
            ids.extend(dim.option_ids());
        }
        ids
    }

    /// Resolve the specification of a feature.
    ///
    /// When the manifest carries `featureSpecs`, only that map counts;
    /// otherwise the declaration doubles as the specification.
    pub fn feature_spec(&self, id: &str) -> Option<SpecView<'_>> {
        match &self.feature_specs {
            Some(specs) => specs.get(id).map(|spec| SpecView {
                label: spec.label.as_deref(),
                description: spec.description.as_deref(),
                needs: Some(&spec.needs),
            }),
            None => self.feature(id).map(|feature| SpecView {
                label: feature.label.as_deref(),
                description: feature.description.as_deref(),
                needs: feature.needs.as_ref(),
            }),
        }
    }

    /// Values a gate or rule may reference for `dimension`
    ///
    /// Returns `None` when the dimension is not declared. The `features`
    /// pseudo-dimension resolves to the declared feature ids.
    pub fn known_values(&self, dimension: &str) -> Option<BTreeSet<&str>> {
        if dimension == FEATURES_DIMENSION {
            let ids = self.declared_feature_ids();
            if !ids.is_empty() || self.dimensions.contains_key(dimension) {
                return Some(ids);
            }
            return None;
        }
        self.dimension(dimension)
            .map(|dim| dim.option_ids().collect())
    }
}
