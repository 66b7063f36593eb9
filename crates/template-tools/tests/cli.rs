use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;

fn templates_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../templates")
}

fn tool() -> Command {
    let mut cmd = Command::cargo_bin("template-tools").unwrap();
    cmd.env("NO_COLOR", "1").env_remove("TEMPLATE_EXTRA_DIMENSIONS");
    cmd
}

const EDGE_POSTGRES: &str = r#"
dimensions:
  deployment:
    options: [{id: cloudflare-workers}]
  database:
    options: [{id: postgres}, {id: d1}]
features:
  - id: auth
    label: Auth
    needs: {database: required}
"#;

#[test]
fn validate_bundled_template_succeeds() {
    tool()
        .arg("validate")
        .arg(templates_dir().join("web"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Valid 0 error(s)"));
}

#[test]
fn validate_all_bundled_templates() {
    tool()
        .arg("validate-all")
        .arg(templates_dir())
        .assert()
        .success()
        .stdout(predicate::str::contains("Checked 2 manifest(s), 0 invalid"));
}

#[test]
fn incompatible_selection_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("template.yaml"), EDGE_POSTGRES).unwrap();

    tool()
        .arg("validate")
        .arg(dir.path())
        .args(["-d", "cloudflare-workers", "-s", "database=postgres", "-f", "auth"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("CROSS_DIMENSION_VIOLATION"))
        .stdout(predicate::str::contains("PostgreSQL"));
}

#[test]
fn json_output_carries_error_types() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("template.yaml"),
        "dimensions:\n  databse:\n    options: [{id: postgres}]\n",
    )
    .unwrap();

    let output = tool()
        .arg("validate")
        .arg(dir.path())
        .arg("--json")
        .assert()
        .code(1)
        .get_output()
        .stdout
        .clone();

    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(value["valid"], false);
    assert_eq!(value["errors"][0]["type"], "SCHEMA_VIOLATION");
    assert!(value["errors"][0]["suggestion"]
        .as_str()
        .unwrap()
        .contains("database"));
}

#[test]
fn suggestions_only_shown_when_requested() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("template.yaml"),
        "dimensions:\n  databse:\n    options: [{id: postgres}]\n",
    )
    .unwrap();

    tool()
        .arg("validate")
        .arg(dir.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("hint:").not());

    tool()
        .arg("validate")
        .arg(dir.path())
        .arg("--suggestions")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("did you mean 'database'?"));
}

#[test]
fn extra_dimension_flag_extends_registry() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("template.yaml"),
        "dimensions:\n  region:\n    options: [{id: eu}]\n",
    )
    .unwrap();

    tool().arg("validate").arg(dir.path()).assert().code(1);

    tool()
        .arg("validate")
        .arg(dir.path())
        .args(["--dimension", "region"])
        .assert()
        .success();

    tool()
        .env("TEMPLATE_EXTRA_DIMENSIONS", "region")
        .arg("validate")
        .arg(dir.path())
        .assert()
        .success();
}

#[test]
fn missing_manifest_is_reported_as_load_error() {
    let dir = tempfile::tempdir().unwrap();

    tool()
        .arg("validate")
        .arg(dir.path().join("absent.yaml"))
        .assert()
        .code(1)
        .stdout(predicate::str::contains("LOAD_ERROR"));
}

#[test]
fn unknown_mode_is_rejected() {
    tool()
        .arg("validate")
        .arg(templates_dir().join("web"))
        .args(["--mode", "lenient"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("lenient"));
}
