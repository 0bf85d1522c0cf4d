use std::fs;

use crate::cli::support::{folio, sample_records, stdout_json, write_records};
use tempfile::tempdir;

#[test]
fn test_backup_prints_snapshot_path() {
    let dir = tempdir().unwrap();
    let source = write_records(dir.path(), &sample_records());
    let out_dir = dir.path().join("out");

    let output = folio()
        .arg("backup")
        .arg("-s")
        .arg(&source)
        .arg("--output-dir")
        .arg(&out_dir)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let path = stdout.lines().next().unwrap();
    assert!(path.contains("folio-manual-"));

    let snapshot: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(snapshot["version"], "1.0");
    assert_eq!(snapshot["metadata"]["total"], 3);
    assert_eq!(snapshot["metadata"]["deleted"], 1);
    assert_eq!(snapshot["records"].as_array().unwrap().len(), 3);
}

#[test]
fn test_backup_json_with_kind() {
    let dir = tempdir().unwrap();
    let source = write_records(dir.path(), &sample_records());

    let output = folio()
        .current_dir(dir.path())
        .args(["--format", "json", "backup", "--kind", "automatic"])
        .arg("-s")
        .arg(&source)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["outcome"]["status"], "saved");
    assert_eq!(json["metadata"]["kind"], "automatic");
    assert!(dir.path().join("backups").is_dir());
}

#[test]
fn test_backup_rejects_unknown_kind() {
    let dir = tempdir().unwrap();
    let source = write_records(dir.path(), &sample_records());

    folio()
        .args(["backup", "--kind", "weekly"])
        .arg("-s")
        .arg(&source)
        .assert()
        .code(2);
}
