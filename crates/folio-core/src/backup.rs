//! Collection snapshots for backup and restore

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::clean::RecordCleaner;
use crate::error::{FolioError, Result};
use crate::record::time::{format_timestamp, now_millis};
use crate::record::{partition, Record};

/// Snapshot format version written by this crate
pub const SNAPSHOT_VERSION: &str = "1.0";

/// Why a snapshot was taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotKind {
    Manual,
    Migration,
    Automatic,
}

impl SnapshotKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SnapshotKind::Manual => "manual",
            SnapshotKind::Migration => "migration",
            SnapshotKind::Automatic => "automatic",
        }
    }
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SnapshotKind {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "manual" => Ok(SnapshotKind::Manual),
            "migration" => Ok(SnapshotKind::Migration),
            "automatic" => Ok(SnapshotKind::Automatic),
            other => Err(FolioError::invalid_value("snapshot kind", other)),
        }
    }
}

/// Record counts stored alongside a snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub total: usize,
    pub active: usize,
    pub deleted: usize,
    pub kind: SnapshotKind,
}

/// A full, versioned export of a collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: String,
    pub timestamp: String,
    pub records: Vec<Record>,
    pub metadata: SnapshotMetadata,
}

/// Result of handing a snapshot to a sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SaveOutcome {
    Saved { identifier: String },
    /// The user declined to save; not an error
    Cancelled,
}

impl SaveOutcome {
    pub fn identifier(&self) -> Option<&str> {
        match self {
            SaveOutcome::Saved { identifier } => Some(identifier),
            SaveOutcome::Cancelled => None,
        }
    }
}

/// Destination for serialized snapshots (a save dialog, a download, a
/// directory)
pub trait SnapshotSink {
    fn save(&self, suggested_name: &str, contents: &str) -> Result<SaveOutcome>;
}

/// Saves snapshots as files in a directory, creating it if needed
#[derive(Debug, Clone)]
pub struct FsSnapshotSink {
    dir: PathBuf,
}

impl FsSnapshotSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl SnapshotSink for FsSnapshotSink {
    fn save(&self, suggested_name: &str, contents: &str) -> Result<SaveOutcome> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| FolioError::failed("create backup directory", e))?;

        let path = self.dir.join(suggested_name);
        let tmp_path = self
            .dir
            .join(format!(".{}.{}.tmp", suggested_name, ulid::Ulid::new()));
        fs::write(&tmp_path, contents).map_err(|e| FolioError::failed("write snapshot", e))?;
        if let Err(e) = fs::rename(&tmp_path, &path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(FolioError::failed("write snapshot", e));
        }

        Ok(SaveOutcome::Saved {
            identifier: path.display().to_string(),
        })
    }
}

/// Options for [`BackupManager::restore`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreOptions {
    /// The caller clears the target store before writing the records
    pub replace_all: bool,
    pub include_deleted: bool,
}

/// Records recovered from a snapshot
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreOutcome {
    pub records: Vec<Record>,
    /// Entries that failed the basic shape check
    pub dropped: usize,
    /// Deleted records left out because they were not requested
    pub skipped_deleted: usize,
    pub replace_all: bool,
}

/// Creates, saves, checks and restores snapshots
#[derive(Debug, Clone, Default)]
pub struct BackupManager {
    cleaner: RecordCleaner,
}

impl BackupManager {
    pub fn new(cleaner: RecordCleaner) -> Self {
        Self { cleaner }
    }

    pub fn create_snapshot(&self, records: &[Record], kind: SnapshotKind) -> Snapshot {
        let (active, deleted) = partition(records);
        Snapshot {
            version: SNAPSHOT_VERSION.to_string(),
            timestamp: format_timestamp(&now_millis()),
            records: records.to_vec(),
            metadata: SnapshotMetadata {
                total: records.len(),
                active: active.len(),
                deleted: deleted.len(),
                kind,
            },
        }
    }

    /// File name offered to the sink, e.g.
    /// `folio-migration-20240301T123000123Z.json`
    pub fn snapshot_file_name(&self, snapshot: &Snapshot) -> String {
        let stamp: String = snapshot
            .timestamp
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        format!("folio-{}-{}.json", snapshot.metadata.kind, stamp)
    }

    /// Serialize and hand off to `sink`
    #[tracing::instrument(skip_all, fields(kind = %snapshot.metadata.kind, total = snapshot.metadata.total))]
    pub fn save_snapshot(&self, snapshot: &Snapshot, sink: &dyn SnapshotSink) -> Result<SaveOutcome> {
        let contents = serde_json::to_string_pretty(snapshot)?;
        let outcome = sink.save(&self.snapshot_file_name(snapshot), &contents)?;
        match &outcome {
            SaveOutcome::Saved { identifier } => tracing::info!(%identifier, "snapshot saved"),
            SaveOutcome::Cancelled => tracing::info!("snapshot save cancelled"),
        }
        Ok(outcome)
    }

    /// Structural check of untyped snapshot data
    pub fn validate_snapshot(&self, data: &Value) -> bool {
        let Some(obj) = data.as_object() else {
            return false;
        };
        let strings_ok = obj.get("version").is_some_and(Value::is_string)
            && obj.get("timestamp").is_some_and(Value::is_string);
        let records_ok = obj.get("records").is_some_and(Value::is_array);
        let metadata_ok = obj.get("metadata").and_then(Value::as_object).is_some_and(|m| {
            ["total", "active", "deleted"]
                .iter()
                .all(|k| m.get(*k).is_some_and(Value::is_number))
                && m
                    .get("kind")
                    .and_then(Value::as_str)
                    .is_some_and(|k| k.parse::<SnapshotKind>().is_ok())
        });
        strings_ok && records_ok && metadata_ok
    }

    /// Recover records from untyped snapshot data.
    ///
    /// Entries without a usable shape are dropped and counted; only a
    /// snapshot that fails [`BackupManager::validate_snapshot`] is an error.
    #[tracing::instrument(skip_all, fields(replace_all = options.replace_all, include_deleted = options.include_deleted))]
    pub fn restore(&self, data: &Value, options: RestoreOptions) -> Result<RestoreOutcome> {
        if !self.validate_snapshot(data) {
            return Err(FolioError::InvalidSnapshot {
                reason: "missing version, timestamp, records or metadata".to_string(),
            });
        }
        let entries = data["records"].as_array().map(Vec::as_slice).unwrap_or_default();

        let mut outcome = RestoreOutcome {
            records: Vec::with_capacity(entries.len()),
            dropped: 0,
            skipped_deleted: 0,
            replace_all: options.replace_all,
        };

        for entry in entries {
            if !has_record_shape(entry) {
                outcome.dropped += 1;
                continue;
            }
            let record = self.cleaner.clean(entry).record;
            if record.is_deleted && !options.include_deleted {
                outcome.skipped_deleted += 1;
                continue;
            }
            outcome.records.push(record);
        }

        if outcome.dropped > 0 {
            tracing::warn!(dropped = outcome.dropped, "snapshot entries without a record shape were dropped");
        }
        Ok(outcome)
    }
}

fn has_record_shape(entry: &Value) -> bool {
    let Some(obj) = entry.as_object() else {
        return false;
    };
    obj.get("id")
        .and_then(Value::as_str)
        .is_some_and(|id| !id.trim().is_empty())
        && obj.get("title").is_some_and(Value::is_string)
        && obj.get("content").is_some_and(Value::is_string)
}
