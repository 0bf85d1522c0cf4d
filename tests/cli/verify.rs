use std::fs;

use crate::cli::support::{folio, setup_source_and_target, stdout_json};
use predicates::prelude::*;
use tempfile::tempdir;

fn migrate(source: &std::path::Path, target: &std::path::Path) {
    folio()
        .args(["migrate", "--no-backup", "--quiet"])
        .arg("-s")
        .arg(source)
        .arg("-t")
        .arg(target)
        .assert()
        .success();
}

#[test]
fn test_verify_after_migration_passes() {
    let dir = tempdir().unwrap();
    let (source, target) = setup_source_and_target(dir.path());
    migrate(&source, &target);

    folio()
        .arg("verify")
        .arg("-s")
        .arg(&source)
        .arg("-t")
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::contains("Validation passed: 3 of 3"));
}

#[test]
fn test_verify_detects_tampering() {
    let dir = tempdir().unwrap();
    let (source, target) = setup_source_and_target(dir.path());
    migrate(&source, &target);

    let path = target.join("notes").join("second-note.md");
    let text = fs::read_to_string(&path).unwrap();
    fs::write(&path, text.replace("title: Second note", "title: Renamed")).unwrap();

    let output = folio()
        .args(["--format", "json", "verify"])
        .arg("-s")
        .arg(&source)
        .arg("-t")
        .arg(&target)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));

    let report = stdout_json(&output);
    assert_eq!(report["isValid"], false);
    let errors = report["errors"].as_array().unwrap();
    assert!(errors
        .iter()
        .any(|e| e.as_str().unwrap().starts_with("second-note.md: title mismatch")));
}

#[test]
fn test_verify_empty_target_reports_counts() {
    let dir = tempdir().unwrap();
    let (source, target) = setup_source_and_target(dir.path());

    folio()
        .arg("verify")
        .arg("-s")
        .arg(&source)
        .arg("-t")
        .arg(&target)
        .assert()
        .code(3)
        .stdout(predicate::str::contains("active count mismatch: expected 2 documents, found 0"));
}
