use std::fs;

use crate::cli::support::{folio, stdout_json};
use predicates::prelude::*;
use tempfile::tempdir;

const GOOD: &str = "---\nid: n1\ntitle: Hello\ntags: []\ncreated: 2024-01-01T00:00:00.000Z\nupdated: 2024-01-02T00:00:00.000Z\n---\n\n# Hello\n\nBody";

#[test]
fn test_check_well_formed_document() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("hello.md");
    fs::write(&path, GOOD).unwrap();

    folio()
        .arg("check")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("hello.md: ok"));
}

#[test]
fn test_check_missing_field_is_data_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.md");
    fs::write(&path, GOOD.replace("updated: 2024-01-02T00:00:00.000Z\n", "")).unwrap();

    let output = folio()
        .args(["--format", "json", "check"])
        .arg(&path)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));

    let json = stdout_json(&output);
    assert_eq!(json["isValid"], false);
    assert_eq!(json["error"], "missing required field: updated");

    let err: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(err["error"]["type"], "parse_error");
}

#[test]
fn test_check_without_frontmatter() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("plain.md");
    fs::write(&path, "# Just markdown\n").unwrap();

    folio()
        .arg("check")
        .arg(&path)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("missing frontmatter delimiters"));
}

#[test]
fn test_check_missing_file() {
    let dir = tempdir().unwrap();
    folio()
        .current_dir(dir.path())
        .args(["check", "nope.md"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("document not found"));
}
