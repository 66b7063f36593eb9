//! Validator configuration
//!
//! Bundles the injectable pieces of the engine: the recognized dimension
//! vocabulary and the compatibility rule set.

use crate::registry::DimensionRegistry;
use crate::validation::compat::RuleSet;

/// Environment variable listing extra dimension names (comma-separated)
pub const EXTRA_DIMENSIONS_ENV: &str = "TEMPLATE_EXTRA_DIMENSIONS";

/// Injectable configuration shared by every validation tier
#[derive(Debug, Clone, Default)]
pub struct ValidatorConfig {
    pub registry: DimensionRegistry,
    pub rules: RuleSet,
}

impl ValidatorConfig {
    pub fn new(registry: DimensionRegistry, rules: RuleSet) -> Self {
        Self { registry, rules }
    }

    /// Built-in configuration extended with names from [`EXTRA_DIMENSIONS_ENV`]
    pub fn from_env() -> Self {
        let extra = std::env::var(EXTRA_DIMENSIONS_ENV).unwrap_or_default();
        Self::default().with_extra_dimensions(parse_dimension_list(&extra))
    }

    pub fn with_extra_dimensions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.registry.insert(name);
        }
        self
    }
}

/// Split a comma-separated list, dropping blanks
pub fn parse_dimension_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dimension_list() {
        assert_eq!(
            parse_dimension_list(" region, ,tenant "),
            vec!["region".to_string(), "tenant".to_string()]
        );
        assert!(parse_dimension_list("").is_empty());
    }

    #[test]
    fn test_extra_dimensions_extend_builtin() {
        let config = ValidatorConfig::default().with_extra_dimensions(["region"]);
        assert!(config.registry.contains("region"));
        assert!(config.registry.contains("deployment"));
        assert_eq!(config.rules.version, RuleSet::BUILTIN_VERSION);
    }
}
