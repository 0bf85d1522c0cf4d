use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::support::{folio, sample_records, stdout_json, write_records};
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::tempdir;

fn make_snapshot(dir: &Path) -> PathBuf {
    let source = write_records(dir, &sample_records());
    let output = folio()
        .arg("backup")
        .arg("-s")
        .arg(&source)
        .arg("--output-dir")
        .arg(dir.join("out"))
        .output()
        .unwrap();
    assert!(output.status.success());
    PathBuf::from(String::from_utf8_lossy(&output.stdout).lines().next().unwrap())
}

fn read_array(path: &Path) -> Vec<Value> {
    serde_json::from_str::<Value>(&fs::read_to_string(path).unwrap())
        .unwrap()
        .as_array()
        .unwrap()
        .clone()
}

#[test]
fn test_restore_replace_all_skips_deleted() {
    let dir = tempdir().unwrap();
    let snapshot = make_snapshot(dir.path());
    let into = dir.path().join("restored.json");

    folio()
        .arg("restore")
        .arg(&snapshot)
        .arg("--into")
        .arg(&into)
        .arg("--replace-all")
        .assert()
        .success()
        .stdout(predicate::str::contains("Restored 2 record(s)"))
        .stdout(predicate::str::contains("Skipped 1 deleted record(s)"));

    let records = read_array(&into);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["id"], "n1");
}

#[test]
fn test_restore_merge_keeps_existing_records() {
    let dir = tempdir().unwrap();
    let snapshot = make_snapshot(dir.path());
    let into = dir.path().join("existing.json");
    fs::write(
        &into,
        serde_json::to_string(&json!([{
            "id": "n1",
            "title": "Local edit",
            "content": "kept",
            "tags": [],
            "createdAt": "2024-05-01T00:00:00.000Z",
            "updatedAt": "2024-05-01T00:00:00.000Z",
            "isDeleted": false
        }]))
        .unwrap(),
    )
    .unwrap();

    let output = folio()
        .args(["--format", "json", "restore", "--include-deleted"])
        .arg(&snapshot)
        .arg("--into")
        .arg(&into)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["restored"], 3);
    assert_eq!(json["written"], 2);
    assert_eq!(json["replaceAll"], false);

    let records = read_array(&into);
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["title"], "Local edit");
}

#[test]
fn test_restore_invalid_snapshot_is_data_error() {
    let dir = tempdir().unwrap();
    let bogus = dir.path().join("bogus.json");
    fs::write(&bogus, r#"{"records": "nope"}"#).unwrap();

    folio()
        .arg("restore")
        .arg(&bogus)
        .arg("--into")
        .arg(dir.path().join("x.json"))
        .assert()
        .code(3)
        .stderr(predicate::str::contains("invalid snapshot"));
    assert!(!dir.path().join("x.json").exists());
}

#[test]
fn test_restore_missing_snapshot() {
    let dir = tempdir().unwrap();
    folio()
        .current_dir(dir.path())
        .args(["restore", "gone.json", "--into", "x.json"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("snapshot not found"));
}
