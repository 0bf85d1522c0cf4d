//! Configuration type definitions

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Folio configuration (`config.toml`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FolioConfig {
    /// Migration pipeline defaults
    #[serde(default)]
    pub migration: MigrationConfig,

    /// Validator tolerances
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Backup output
    #[serde(default)]
    pub backup: BackupConfig,
}

/// Defaults for the migration pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationConfig {
    /// Snapshot the source collection before writing anything
    #[serde(default = "default_true")]
    pub create_backup: bool,

    /// Migrate deleted records into the trash location
    #[serde(default = "default_true")]
    pub include_trash: bool,

    /// Replace documents that already exist at the target
    #[serde(default)]
    pub overwrite_existing: bool,

    /// Subdirectory of the target root holding active documents
    #[serde(default = "default_notes_dir")]
    pub notes_dir: String,

    /// Subdirectory of the target root holding deleted documents
    #[serde(default = "default_trash_dir")]
    pub trash_dir: String,

    /// Fixed per-record cost used by duration estimates
    #[serde(default = "default_per_record_estimate_ms")]
    pub per_record_estimate_ms: u64,

    /// Record cap for dry-run migrations
    #[serde(default = "default_test_max_records")]
    pub test_max_records: usize,
}

/// Tolerances applied when cross-checking migrated documents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Maximum timestamp drift that is not reported
    #[serde(default = "default_timestamp_tolerance_ms")]
    pub timestamp_tolerance_ms: i64,

    /// Invalid-file ratio above which the run is an error
    #[serde(default = "default_error_ratio")]
    pub error_ratio: f64,

    /// Invalid-file ratio above which the run gets a warning
    #[serde(default = "default_warning_ratio")]
    pub warning_ratio: f64,
}

/// Where file-based snapshots go
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackupConfig {
    #[serde(default = "default_backup_directory")]
    pub directory: String,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            create_backup: true,
            include_trash: true,
            overwrite_existing: false,
            notes_dir: default_notes_dir(),
            trash_dir: default_trash_dir(),
            per_record_estimate_ms: default_per_record_estimate_ms(),
            test_max_records: default_test_max_records(),
        }
    }
}

impl MigrationConfig {
    /// Linear estimate of a full run over `total_records`
    pub fn estimate_duration(&self, total_records: usize) -> Duration {
        Duration::from_millis(self.per_record_estimate_ms.saturating_mul(total_records as u64))
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            timestamp_tolerance_ms: default_timestamp_tolerance_ms(),
            error_ratio: default_error_ratio(),
            warning_ratio: default_warning_ratio(),
        }
    }
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            directory: default_backup_directory(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_notes_dir() -> String {
    "notes".to_string()
}

fn default_trash_dir() -> String {
    "trash".to_string()
}

fn default_per_record_estimate_ms() -> u64 {
    50
}

fn default_test_max_records() -> usize {
    5
}

fn default_timestamp_tolerance_ms() -> i64 {
    2000
}

fn default_error_ratio() -> f64 {
    0.10
}

fn default_warning_ratio() -> f64 {
    0.05
}

fn default_backup_directory() -> String {
    "backups".to_string()
}
