use crate::cli::support::{folio, sample_records, stdout_json, write_records};
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_estimate_human() {
    let dir = tempdir().unwrap();
    let source = write_records(dir.path(), &sample_records());

    folio()
        .arg("estimate")
        .arg("-s")
        .arg(&source)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 record(s) (2 active, 1 deleted)"))
        .stdout(predicate::str::contains("Estimated migration time: 150ms"));
}

#[test]
fn test_estimate_uses_config_file() {
    let dir = tempdir().unwrap();
    let source = write_records(dir.path(), &sample_records());
    let config = dir.path().join("folio.toml");
    std::fs::write(&config, "[migration]\nper_record_estimate_ms = 1000\ninclude_trash = false\n").unwrap();

    let output = folio()
        .args(["--format", "json", "estimate"])
        .arg("-s")
        .arg(&source)
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["records"], 3);
    assert_eq!(json["estimatedMs"], 2000);
    assert_eq!(json["perRecordMs"], 1000);
}

#[test]
fn test_estimate_invalid_config_is_usage_error() {
    let dir = tempdir().unwrap();
    let source = write_records(dir.path(), &sample_records());
    let config = dir.path().join("folio.toml");
    std::fs::write(&config, "[migration]\nnotes_dir = \"same\"\ntrash_dir = \"same\"\n").unwrap();

    folio()
        .arg("estimate")
        .arg("-s")
        .arg(&source)
        .arg("--config")
        .arg(&config)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("migration.trash_dir"));
}
