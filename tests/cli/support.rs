use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::{cargo::cargo_bin_cmd, Command};
use serde_json::{json, Value};

/// Get a Command for folio, isolated from any user configuration
pub fn folio() -> Command {
    let mut cmd = cargo_bin_cmd!("folio");
    cmd.env("FOLIO_CONFIG_DIR", std::env::temp_dir().join("folio-cli-tests-no-config"))
        .env_remove("FOLIO_CONFIG")
        .env_remove("FOLIO_LOG_LEVEL")
        .env_remove("FOLIO_LOG")
        .env_remove("RUST_LOG");
    cmd
}

/// Two active records and one deleted record
pub fn sample_records() -> Value {
    json!([
        {
            "id": "n1",
            "title": "First note",
            "content": "Hello from the first note.",
            "tags": ["inbox"],
            "createdAt": "2024-01-01T10:00:00.000Z",
            "updatedAt": "2024-01-02T10:00:00.000Z"
        },
        {
            "id": "n2",
            "title": "Second note",
            "content": "Line one\n\nLine two",
            "tags": [],
            "createdAt": "2024-01-03T10:00:00.000Z",
            "updatedAt": "2024-01-04T10:00:00.000Z"
        },
        {
            "id": "n3",
            "title": "Old idea",
            "content": "Thrown away.",
            "createdAt": "2023-12-01T10:00:00.000Z",
            "updatedAt": "2023-12-02T10:00:00.000Z",
            "isDeleted": true,
            "deletedAt": "2023-12-05T10:00:00.000Z"
        }
    ])
}

/// Write `records` to `records.json` in `dir`
pub fn write_records(dir: &Path, records: &Value) -> PathBuf {
    let path = dir.join("records.json");
    fs::write(&path, serde_json::to_string_pretty(records).unwrap()).unwrap();
    path
}

/// A directory with `records.json` and an empty `vault/` target
pub fn setup_source_and_target(dir: &Path) -> (PathBuf, PathBuf) {
    let source = write_records(dir, &sample_records());
    let target = dir.join("vault");
    fs::create_dir(&target).unwrap();
    (source, target)
}

/// Parse stdout as JSON
pub fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}
