//! Built-in cross-dimension compatibility matrix
//!
//! Known-bad combinations of real-world products, independent of any
//! manifest. Rules are plain table entries evaluated in order; adding one
//! never touches the validator's control flow.

use crate::manifest::{Selection, DEPLOYMENT_DIMENSION};
use std::fmt;

/// A single incompatibility: returns an explanation when `selection` hits it
#[derive(Clone, Copy)]
pub struct CompatibilityRule {
    /// Stable rule identifier
    pub id: &'static str,
    /// One-line summary of what the rule forbids
    pub description: &'static str,
    pub check: fn(&Selection) -> Option<String>,
}

impl fmt::Debug for CompatibilityRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompatibilityRule")
            .field("id", &self.id)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Versioned, ordered list of compatibility rules
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub version: &'static str,
    rules: Vec<CompatibilityRule>,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::builtin()
    }
}

impl RuleSet {
    pub const BUILTIN_VERSION: &'static str = "2024.1";

    pub fn new(version: &'static str, rules: Vec<CompatibilityRule>) -> Self {
        Self { version, rules }
    }

    /// The shipped matrix
    pub fn builtin() -> Self {
        Self::new(Self::BUILTIN_VERSION, BUILTIN_RULES.to_vec())
    }

    /// Rule set that accepts every selection
    pub fn empty() -> Self {
        Self::new("none", Vec::new())
    }

    pub fn with_rule(mut self, rule: CompatibilityRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[CompatibilityRule] {
        &self.rules
    }

    /// Explanations for every rule the selection violates, as (rule id, message)
    pub fn evaluate(&self, selection: &Selection) -> Vec<(&'static str, String)> {
        self.rules
            .iter()
            .filter_map(|rule| {
                let hit = (rule.check)(selection);
                tracing::trace!(rule = rule.id, violated = hit.is_some(), "compatibility rule");
                hit.map(|message| (rule.id, message))
            })
            .collect()
    }
}

/// Deployment targets running on an edge/isolate runtime
const EDGE_DEPLOYMENTS: &[(&str, &str)] = &[
    ("cloudflare-workers", "Cloudflare Workers"),
    ("cloudflare-pages", "Cloudflare Pages"),
    ("vercel-edge", "Vercel Edge Functions"),
    ("deno-deploy", "Deno Deploy"),
];

/// Databases that need TCP sockets or a local file, unavailable on the edge
const EDGE_INCOMPATIBLE_DATABASES: &[(&str, &str)] = &[
    ("postgresql", "PostgreSQL"),
    ("postgres", "PostgreSQL"),
    ("mysql", "MySQL"),
    ("mongodb", "MongoDB"),
    ("sqlite", "SQLite"),
];

const LOCAL_STORAGE: &[&str] = &["local", "filesystem", "fs"];

const BUILTIN_RULES: &[CompatibilityRule] = &[
    CompatibilityRule {
        id: "edge-relational-database",
        description: "Edge runtimes cannot open direct database connections",
        check: edge_relational_database,
    },
    CompatibilityRule {
        id: "edge-local-storage",
        description: "Edge runtimes have no writable local filesystem",
        check: edge_local_storage,
    },
    CompatibilityRule {
        id: "auth-requires-database",
        description: "Authentication needs a database to persist users and sessions",
        check: auth_requires_database,
    },
    CompatibilityRule {
        id: "payments-requires-auth",
        description: "Payments need authenticated users",
        check: payments_requires_auth,
    },
];

fn lookup<'a>(table: &'a [(&str, &str)], id: &str) -> Option<&'a str> {
    table.iter().find(|(key, _)| *key == id).map(|(_, name)| *name)
}

fn edge_deployment(selection: &Selection) -> Option<&'static str> {
    selection
        .values_for(DEPLOYMENT_DIMENSION)
        .into_iter()
        .find_map(|id| lookup(EDGE_DEPLOYMENTS, id))
}

fn edge_relational_database(selection: &Selection) -> Option<String> {
    let runtime = edge_deployment(selection)?;
    let databases: Vec<&str> = selection
        .values_for("database")
        .into_iter()
        .filter_map(|id| lookup(EDGE_INCOMPATIBLE_DATABASES, id))
        .collect();
    if databases.is_empty() {
        return None;
    }
    Some(format!(
        "{} does not support {} connections; use an edge-compatible database (e.g. D1, Turso, or an HTTP-based driver)",
        runtime,
        databases.join(", ")
    ))
}

fn edge_local_storage(selection: &Selection) -> Option<String> {
    let runtime = edge_deployment(selection)?;
    let storage = selection
        .values_for("storage")
        .into_iter()
        .find(|id| LOCAL_STORAGE.contains(id))?;
    Some(format!(
        "{} has no persistent local filesystem; storage '{}' is unavailable, use object storage such as R2 or S3",
        runtime, storage
    ))
}

fn auth_requires_database(selection: &Selection) -> Option<String> {
    if selection.has_feature("auth") && !selection.has_real_value("database") {
        return Some(
            "Feature 'auth' requires a database to store users and sessions, but no database is selected"
                .to_string(),
        );
    }
    None
}

fn payments_requires_auth(selection: &Selection) -> Option<String> {
    let auth_enabled = selection.has_feature("auth") || selection.has_real_value("auth");
    if selection.has_feature("payments") && !auth_enabled {
        return Some(
            "Feature 'payments' requires authentication; enable the 'auth' feature".to_string(),
        );
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(selection: &Selection) -> Vec<&'static str> {
        RuleSet::builtin()
            .evaluate(selection)
            .into_iter()
            .map(|(id, _)| id)
            .collect()
    }

    #[test]
    fn test_edge_with_postgres() {
        let sel = Selection::new()
            .with("deployment", "cloudflare-workers")
            .with("database", "postgresql");
        let hits = RuleSet::builtin().evaluate(&sel);
        assert_eq!(hits.len(), 1);
        assert!(hits[0].1.contains("PostgreSQL"));
        assert!(hits[0].1.contains("Cloudflare Workers"));
    }

    #[test]
    fn test_edge_with_d1_is_fine() {
        let sel = Selection::new()
            .with("deployment", "cloudflare-workers")
            .with("database", "d1");
        assert!(ids(&sel).is_empty());
    }

    #[test]
    fn test_non_edge_with_postgres_is_fine() {
        let sel = Selection::new()
            .with("deployment", "vercel")
            .with("database", "postgres");
        assert!(ids(&sel).is_empty());
    }

    #[test]
    fn test_edge_with_local_storage() {
        let sel = Selection::new()
            .with("deployment", "deno-deploy")
            .with("storage", vec!["s3", "local"]);
        assert_eq!(ids(&sel), vec!["edge-local-storage"]);
    }

    #[test]
    fn test_auth_without_database() {
        let sel = Selection::new().with("features", vec!["auth"]);
        assert_eq!(ids(&sel), vec!["auth-requires-database"]);
        let sel = sel.with("database", "none");
        assert_eq!(ids(&sel), vec!["auth-requires-database"]);
    }

    #[test]
    fn test_payments_without_auth() {
        let sel = Selection::new()
            .with("features", vec!["payments"])
            .with("database", "postgres");
        assert_eq!(ids(&sel), vec!["payments-requires-auth"]);

        let sel = sel.with("auth", "clerk");
        assert!(ids(&sel).is_empty());
    }

    #[test]
    fn test_custom_rule_extends_table() {
        fn no_redis(selection: &Selection) -> Option<String> {
            selection
                .values_for("cache")
                .contains(&"redis")
                .then(|| "redis is not supported".to_string())
        }
        let rules = RuleSet::empty().with_rule(CompatibilityRule {
            id: "no-redis",
            description: "Redis is not supported",
            check: no_redis,
        });
        let hits = rules.evaluate(&Selection::new().with("cache", "redis"));
        assert_eq!(hits, vec![("no-redis", "redis is not supported".to_string())]);
    }
}
