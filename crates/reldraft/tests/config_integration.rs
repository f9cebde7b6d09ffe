//! Configuration integration tests.
//!
//! These tests verify config discovery, format parsing, and precedence
//! from an end-to-end perspective using the compiled binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Returns a Command configured to run our binary.
#[allow(deprecated)]
fn cmd() -> Command {
    Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap()
}

/// Run `doctor --json` in `dir` and return the parsed report.
fn doctor_report(dir: &std::path::Path) -> serde_json::Value {
    let output = cmd()
        .args(["-C", dir.to_str().unwrap(), "doctor", "--json"])
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&output.get_output().stdout);
    serde_json::from_str(&stdout).expect("doctor --json should output valid JSON")
}

// =============================================================================
// Config File Discovery
// =============================================================================

#[test]
fn runs_without_config_file() {
    // The CLI should work even when no config file exists
    let tmp = TempDir::new().unwrap();

    let report = doctor_report(tmp.path());
    assert_eq!(report["config"]["found"], false);
}

#[test]
fn discovers_dotfile_config_in_current_dir() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join(".reldraft.toml");
    fs::write(&config_path, r#"log_level = "debug""#).unwrap();

    let report = doctor_report(tmp.path());
    assert_eq!(report["config"]["found"], true);
}

#[test]
fn discovers_regular_config_in_current_dir() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("reldraft.toml");
    fs::write(&config_path, r#"log_level = "warn""#).unwrap();

    let report = doctor_report(tmp.path());
    assert_eq!(report["config"]["found"], true);
}

#[test]
fn discovers_config_in_parent_directory() {
    let tmp = TempDir::new().unwrap();
    let sub_dir = tmp.path().join("nested").join("deep");
    fs::create_dir_all(&sub_dir).unwrap();

    // Config in root, run from nested/deep
    let config_path = tmp.path().join(".reldraft.toml");
    fs::write(&config_path, r#"log_level = "debug""#).unwrap();

    let report = doctor_report(&sub_dir);
    assert_eq!(report["config"]["found"], true);
}

#[test]
fn dotfile_takes_precedence_over_regular_name() {
    let tmp = TempDir::new().unwrap();

    // Both configs exist
    fs::write(tmp.path().join(".reldraft.toml"), r#"log_level = "debug""#).unwrap();
    fs::write(tmp.path().join("reldraft.toml"), r#"log_level = "error""#).unwrap();

    let report = doctor_report(tmp.path());
    let file = report["config"]["file"].as_str().unwrap();
    assert!(file.ends_with(".reldraft.toml"), "expected dotfile, got {file}");
}

// =============================================================================
// Config Format Parsing
// =============================================================================

#[test]
fn parses_toml_config() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".reldraft.toml"),
        r#"
log_level = "warn"
tag_template = "release-$RESOLVED_VERSION"
"#,
    )
    .unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "doctor"])
        .assert()
        .success();
}

#[test]
fn parses_yaml_config() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".reldraft.yaml"),
        r#"
log_level: warn
categories:
  - title: Bug Fixes
    labels: [bug]
"#,
    )
    .unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "doctor"])
        .assert()
        .success();
}

#[test]
fn parses_yml_config() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".reldraft.yml"),
        r#"
log_level: debug
"#,
    )
    .unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "doctor"])
        .assert()
        .success();
}

#[test]
fn parses_json_config() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".reldraft.json"),
        r#"{"log_level": "error"}"#,
    )
    .unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "doctor"])
        .assert()
        .success();
}

// =============================================================================
// Config Precedence
// =============================================================================

#[test]
fn closer_config_takes_precedence() {
    let tmp = TempDir::new().unwrap();
    let sub_dir = tmp.path().join("project");
    fs::create_dir_all(&sub_dir).unwrap();

    // Parent config
    fs::write(tmp.path().join(".reldraft.toml"), r#"log_level = "error""#).unwrap();

    // Child config (should win)
    fs::write(sub_dir.join(".reldraft.toml"), r#"log_level = "debug""#).unwrap();

    let report = doctor_report(&sub_dir);
    let file = report["config"]["file"].as_str().unwrap();
    assert!(file.contains("project"), "expected child config, got {file}");
}

#[test]
fn toml_preferred_over_yaml_in_same_directory() {
    let tmp = TempDir::new().unwrap();

    // TOML is first in extension preference order
    fs::write(tmp.path().join(".reldraft.toml"), r#"log_level = "debug""#).unwrap();
    fs::write(tmp.path().join(".reldraft.yaml"), r#"log_level: error"#).unwrap();

    let report = doctor_report(tmp.path());
    let file = report["config"]["file"].as_str().unwrap();
    assert!(file.ends_with(".toml"), "expected TOML config, got {file}");
}

// =============================================================================
// Error Cases
// =============================================================================

#[test]
fn invalid_toml_config_shows_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".reldraft.toml"), "this is not valid toml [[[").unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "doctor"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration").or(predicate::str::contains("config")));
}

#[test]
fn invalid_yaml_config_shows_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".reldraft.yaml"),
        "invalid:\n  yaml\n content:\n[broken",
    )
    .unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "doctor"])
        .assert()
        .failure();
}

#[test]
fn invalid_json_config_shows_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join(".reldraft.json"), "{not valid json}").unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "doctor"])
        .assert()
        .failure();
}

#[test]
fn unknown_config_field_is_ignored() {
    // Figment ignores unknown fields by default with serde
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join(".reldraft.toml"),
        r#"
log_level = "info"
unknown_field = "should be ignored"
another_unknown = 42
"#,
    )
    .unwrap();

    cmd()
        .args(["-C", tmp.path().to_str().unwrap(), "doctor"])
        .assert()
        .success();
}

// =============================================================================
// Boundary Marker Tests
// =============================================================================

#[test]
fn git_boundary_stops_config_search() {
    let tmp = TempDir::new().unwrap();

    // Structure: parent/.reldraft.toml + parent/repo/.git/ + parent/repo/src/
    let parent = tmp.path().join("parent");
    let repo = parent.join("repo");
    let src = repo.join("src");
    fs::create_dir_all(&src).unwrap();

    // Config in parent (outside repo)
    fs::write(parent.join(".reldraft.toml"), r#"log_level = "error""#).unwrap();

    // .git directory marks repo boundary
    fs::create_dir(repo.join(".git")).unwrap();

    // Running from src/ should NOT find parent config (stopped at .git)
    let report = doctor_report(&src);
    assert_eq!(report["config"]["found"], false);
}

#[test]
fn config_in_same_dir_as_git_is_found() {
    let tmp = TempDir::new().unwrap();
    let repo = tmp.path().join("repo");
    let src = repo.join("src");
    fs::create_dir_all(&src).unwrap();

    // .git and config in same directory
    fs::create_dir(repo.join(".git")).unwrap();
    fs::write(repo.join(".reldraft.toml"), r#"log_level = "debug""#).unwrap();

    // Running from src/ should find the repo config
    let report = doctor_report(&src);
    assert_eq!(report["config"]["found"], true);
}
