use std::fs;

use crate::cli::support::{folio, setup_source_and_target, stdout_json, write_records};
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_migrate_writes_documents_and_backup() {
    let dir = tempdir().unwrap();
    let (source, target) = setup_source_and_target(dir.path());

    folio()
        .current_dir(dir.path())
        .arg("migrate")
        .arg("--source")
        .arg(&source)
        .arg("--target")
        .arg(&target)
        .args(["--backup-dir", "snapshots"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Migrated 2 note(s) and 1 deleted note(s)"))
        .stdout(predicate::str::contains("Validation passed: 3 of 3"))
        .stderr(predicate::str::contains("migrating..."));

    let first = fs::read_to_string(target.join("notes").join("first-note.md")).unwrap();
    assert!(first.starts_with("---\nid: n1\ntitle: First note\n"));
    assert!(first.contains("\n# First note\n\nHello from the first note."));
    assert!(target.join("trash").join("old-idea.md").is_file());

    let snapshots: Vec<_> = fs::read_dir(dir.path().join("snapshots")).unwrap().collect();
    assert_eq!(snapshots.len(), 1);
}

#[test]
fn test_migrate_json_output() {
    let dir = tempdir().unwrap();
    let (source, target) = setup_source_and_target(dir.path());

    let output = folio()
        .args(["--format", "json", "migrate", "--no-backup", "--no-trash"])
        .arg("-s")
        .arg(&source)
        .arg("-t")
        .arg(&target)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["success"], true);
    assert_eq!(json["stage"], "completed");
    assert_eq!(json["migratedNotes"], 2);
    assert_eq!(json["migratedTrash"], 0);
    assert_eq!(json["skipped"], 1);
    assert!(json.get("backup").is_none());
    assert!(!target.join("trash").join("old-idea.md").exists());
}

#[test]
fn test_migrate_existing_file_fails_record() {
    let dir = tempdir().unwrap();
    let (source, target) = setup_source_and_target(dir.path());
    fs::create_dir(target.join("notes")).unwrap();
    fs::write(target.join("notes").join("first-note.md"), "mine").unwrap();

    folio()
        .args(["migrate", "--no-backup"])
        .arg("-s")
        .arg(&source)
        .arg("-t")
        .arg(&target)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("1 record(s) not migrated"))
        .stdout(predicate::str::contains("already exists"));

    assert_eq!(
        fs::read_to_string(target.join("notes").join("first-note.md")).unwrap(),
        "mine"
    );
    assert!(target.join("notes").join("second-note.md").is_file());
}

#[test]
fn test_migrate_overwrite_replaces_file() {
    let dir = tempdir().unwrap();
    let (source, target) = setup_source_and_target(dir.path());
    fs::create_dir(target.join("notes")).unwrap();
    fs::write(target.join("notes").join("first-note.md"), "mine").unwrap();

    folio()
        .args(["migrate", "--no-backup", "--overwrite", "--quiet"])
        .arg("-s")
        .arg(&source)
        .arg("-t")
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let text = fs::read_to_string(target.join("notes").join("first-note.md")).unwrap();
    assert!(text.starts_with("---\nid: n1\n"));
}

#[test]
fn test_migrate_missing_source_is_data_error() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("vault")).unwrap();

    folio()
        .current_dir(dir.path())
        .args(["migrate", "--no-backup", "-s", "missing.json", "-t", "vault"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("cannot read source records"));
}

#[test]
fn test_migrate_missing_target_fails() {
    let dir = tempdir().unwrap();
    let source = write_records(dir.path(), &crate::cli::support::sample_records());

    let output = folio()
        .args(["--format", "json", "migrate", "--no-backup"])
        .arg("-s")
        .arg(&source)
        .arg("-t")
        .arg(dir.path().join("nowhere"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let json: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(json["error"]["type"], "storage_directory_not_found");
    assert_eq!(json["error"]["context"]["operation"], "migrate");
}

#[test]
fn test_test_migration_leaves_target_clean() {
    let dir = tempdir().unwrap();
    let (source, target) = setup_source_and_target(dir.path());

    folio()
        .args(["test-migration", "--max", "2"])
        .arg("-s")
        .arg(&source)
        .arg("-t")
        .arg(&target)
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote 2 of 2 record(s)"))
        .stdout(predicate::str::contains("removed"));

    assert_eq!(fs::read_dir(&target).unwrap().count(), 0);
}
