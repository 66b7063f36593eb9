//! Version comparison between the tool and a template manifest

use crate::manifest::Manifest;
use semver::Version;

/// Parse a version string, tolerating a leading `v`
pub fn parse_version(version_str: &str) -> Option<Version> {
    let cleaned = version_str.trim();
    let cleaned = cleaned.strip_prefix('v').unwrap_or(cleaned);
    Version::parse(cleaned).ok()
}

/// Advisory shown when the running tool is older than the template expects.
///
/// Unparseable versions on either side yield no advisory.
pub fn compatibility_advisory(
    manifest: &Manifest,
    tool_version: &str,
    upgrade_command: &str,
) -> Option<String> {
    let declared = manifest.version.as_deref()?;
    let template_ver = parse_version(declared)?;
    let tool_ver = parse_version(tool_version)?;

    if tool_ver < template_ver {
        Some(format!(
            "This template was written for version {} or newer; you are running {}. Consider updating: {}",
            template_ver, tool_ver, upgrade_command
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UPGRADE: &str = "cargo install template-tools --force";

    fn manifest(version: Option<&str>) -> Manifest {
        Manifest {
            version: version.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_tool_older_than_template() {
        let advisory = compatibility_advisory(&manifest(Some("0.2.0")), "0.1.0", UPGRADE);
        assert!(advisory.unwrap().contains("0.2.0"));
    }

    #[test]
    fn test_tool_same_or_newer() {
        assert!(compatibility_advisory(&manifest(Some("0.1.0")), "0.1.0", UPGRADE).is_none());
        assert!(compatibility_advisory(&manifest(Some("v0.1.0")), "0.2.0", UPGRADE).is_none());
    }

    #[test]
    fn test_missing_or_invalid_versions() {
        assert!(compatibility_advisory(&manifest(None), "0.1.0", UPGRADE).is_none());
        assert!(compatibility_advisory(&manifest(Some("latest")), "0.1.0", UPGRADE).is_none());
        assert!(compatibility_advisory(&manifest(Some("1.0.0")), "dev", UPGRADE).is_none());
    }
}
