use std::fs;

use crate::cli::support::{folio, stdout_json, write_records};
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::tempdir;

fn messy_records() -> Value {
    json!([
        {"id": "a", "title": "Older", "content": "x", "createdAt": "2024-01-01", "updatedAt": "2024-01-01"},
        {"id": "b", "title": "", "content": null, "tags": ["  t  ", ""], "createdAt": "2024-02-01", "updatedAt": "2024-02-01"},
        {"id": "a", "title": "Duplicate", "content": "y", "createdAt": "2024-03-01", "updatedAt": "2024-03-01"},
        42
    ])
}

#[test]
fn test_clean_reports_fixes() {
    let dir = tempdir().unwrap();
    let source = write_records(dir.path(), &messy_records());

    folio()
        .arg("clean")
        .arg("-s")
        .arg(&source)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 of 4 record(s) usable"))
        .stdout(predicate::str::contains("1 duplicate(s) removed"))
        .stdout(predicate::str::contains("ERROR entry 3"))
        .stdout(predicate::str::contains("FIXED b: title"));

    // Without --write the file is untouched
    let text = fs::read_to_string(&source).unwrap();
    assert!(text.contains("Duplicate"));
}

#[test]
fn test_clean_write_saves_sorted_collection() {
    let dir = tempdir().unwrap();
    let source = write_records(dir.path(), &messy_records());

    let output = folio()
        .args(["--format", "json", "clean", "--write"])
        .arg("-s")
        .arg(&source)
        .output()
        .unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["originalCount"], 4);
    assert_eq!(json["duplicatesRemoved"], 1);
    assert_eq!(json["written"], true);

    let saved: Value = serde_json::from_str(&fs::read_to_string(&source).unwrap()).unwrap();
    let saved = saved.as_array().unwrap();
    assert_eq!(saved.len(), 2);
    assert_eq!(saved[0]["id"], "b");
    assert_eq!(saved[0]["title"], "untitled");
    assert_eq!(saved[0]["tags"], json!(["t"]));
    assert_eq!(saved[1]["title"], "Older");
}
