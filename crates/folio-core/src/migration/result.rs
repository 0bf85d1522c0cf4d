use std::fmt;

use serde::Serialize;

use super::progress::MigrationStage;
use crate::backup::SaveOutcome;
use crate::error::StorageError;
use crate::record::Record;
use crate::validate::ValidationReport;

/// Failure code for a target file that existed before the run
pub const CODE_ALREADY_EXISTS: &str = "already-exists";
/// Failure code for a source entry the cleaner could not use
pub const CODE_UNFIXABLE: &str = "unfixable";

/// A single record that could not be migrated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordFailure {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// A storage error code, or one of the `CODE_*` constants
    pub code: String,
    pub reason: String,
}

impl RecordFailure {
    pub(crate) fn for_record(record: &Record, file_name: &str, code: &str, reason: impl Into<String>) -> Self {
        Self {
            record_id: Some(record.id.clone()),
            title: Some(record.title.clone()),
            file_name: Some(file_name.to_string()),
            code: code.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn storage(record: &Record, file_name: &str, err: &StorageError) -> Self {
        Self::for_record(record, file_name, err.code.as_str(), err.to_string())
    }

    pub(crate) fn unfixable(reason: impl Into<String>) -> Self {
        Self {
            record_id: None,
            title: None,
            file_name: None,
            code: CODE_UNFIXABLE.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for RecordFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.file_name, &self.record_id) {
            (Some(file), Some(id)) => write!(f, "{} ({}): {}", file, id, self.reason),
            (Some(file), None) => write!(f, "{}: {}", file, self.reason),
            (None, Some(id)) => write!(f, "{}: {}", id, self.reason),
            (None, None) => f.write_str(&self.reason),
        }
    }
}

/// Outcome of a completed migration run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationResult {
    /// No migration errors and no validation errors
    pub success: bool,
    pub stage: MigrationStage,
    pub migrated_notes: usize,
    pub migrated_trash: usize,
    /// Deleted records left out because trash was not requested
    pub skipped: usize,
    pub errors: Vec<RecordFailure>,
    /// Cleaner fixes and other non-fatal notes
    pub warnings: Vec<String>,
    pub validation: ValidationReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<SaveOutcome>,
    pub duration_ms: u64,
}

/// Outcome of a dry run in a scratch directory
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestMigrationResult {
    pub success: bool,
    pub tested: usize,
    pub written: usize,
    pub errors: Vec<RecordFailure>,
    pub warnings: Vec<String>,
    pub scratch_dir: String,
    /// Scratch files were removed again
    pub cleaned_up: bool,
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageErrorCode;

    #[test]
    fn test_failure_display() {
        let record = Record::new("r1", "Title", "");
        let err = StorageError::new(StorageErrorCode::WriteFailed, "disk full");
        let failure = RecordFailure::storage(&record, "title.md", &err);
        assert_eq!(failure.code, "write-failed");
        assert_eq!(failure.to_string(), "title.md (r1): write-failed: disk full");

        let unfixable = RecordFailure::unfixable("entry 3: not an object");
        assert_eq!(unfixable.to_string(), "entry 3: not an object");
    }
}
