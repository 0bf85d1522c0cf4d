//! Post-migration fidelity checks
//!
//! Migrated documents are read back, parsed, and compared with the records
//! they were written from. Discrepancies that lose data are errors; drift
//! that does not (whitespace, timestamp jitter, tag order) is a warning.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::ValidationConfig;
use crate::document::{
    frontmatter_timestamp, keys, strip_title_heading, DocumentConverter, ParsedDocument,
};
use crate::error::StorageResult;
use crate::record::time::drift_ms;
use crate::record::{Record, RecordSet};

/// A migrated document as read back from the target
#[derive(Debug, Clone)]
pub struct MigratedFile {
    pub file_name: String,
    /// The location the file was found in
    pub set: RecordSet,
    pub text: StorageResult<String>,
    /// Id of the record this file was written from, when known
    pub expected_id: Option<String>,
}

/// Findings for one document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentValidation {
    pub file_name: String,
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl DocumentValidation {
    fn new(file_name: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationStatistics {
    pub original_active: usize,
    pub original_trash: usize,
    pub migrated_active: usize,
    pub migrated_trash: usize,
    pub total_files: usize,
    pub valid_files: usize,
    pub invalid_files: usize,
    pub count_mismatch: bool,
}

impl ValidationStatistics {
    /// Share of files with at least one error
    pub fn invalid_ratio(&self) -> f64 {
        if self.total_files == 0 {
            0.0
        } else {
            self.invalid_files as f64 / self.total_files as f64
        }
    }
}

/// Aggregated findings of a validation run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub documents: Vec<DocumentValidation>,
    pub statistics: ValidationStatistics,
}

/// Cross-checks migrated documents against source records
#[derive(Debug, Clone)]
pub struct MigrationValidator {
    converter: DocumentConverter,
    tolerance_ms: i64,
    error_ratio: f64,
    warning_ratio: f64,
}

impl Default for MigrationValidator {
    fn default() -> Self {
        Self::new(DocumentConverter::default(), &ValidationConfig::default())
    }
}

impl MigrationValidator {
    pub fn new(converter: DocumentConverter, config: &ValidationConfig) -> Self {
        Self {
            converter,
            tolerance_ms: config.timestamp_tolerance_ms,
            error_ratio: config.error_ratio,
            warning_ratio: config.warning_ratio,
        }
    }

    /// Validate `files` against the records they should contain
    #[tracing::instrument(skip_all, fields(records = originals.len(), files = files.len()))]
    pub fn validate(&self, originals: &[Record], files: Vec<MigratedFile>) -> ValidationReport {
        let by_id: HashMap<&str, &Record> = originals.iter().map(|r| (r.id.as_str(), r)).collect();
        let mut seen = SeenIds::default();
        let mut report = ValidationReport::default();
        let stats = &mut report.statistics;

        for record in originals {
            match record.set() {
                RecordSet::Active => stats.original_active += 1,
                RecordSet::Trash => stats.original_trash += 1,
            }
        }

        for file in files {
            match file.set {
                RecordSet::Active => report.statistics.migrated_active += 1,
                RecordSet::Trash => report.statistics.migrated_trash += 1,
            }
            let doc = self.check_file(&file, &by_id, &mut seen);
            report.documents.push(doc);
        }

        for doc in &report.documents {
            if doc.is_valid {
                report.statistics.valid_files += 1;
            } else {
                report.statistics.invalid_files += 1;
            }
            report
                .errors
                .extend(doc.errors.iter().map(|e| format!("{}: {}", doc.file_name, e)));
            report
                .warnings
                .extend(doc.warnings.iter().map(|w| format!("{}: {}", doc.file_name, w)));
        }
        report.statistics.total_files = report.documents.len();

        self.check_counts(originals, &seen, &mut report);
        self.check_ratio(&mut report);

        report.is_valid = report.errors.is_empty();
        tracing::info!(
            valid = report.is_valid,
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "validation finished"
        );
        report
    }

    fn check_file(
        &self,
        file: &MigratedFile,
        by_id: &HashMap<&str, &Record>,
        seen: &mut SeenIds,
    ) -> DocumentValidation {
        let mut doc = DocumentValidation::new(&file.file_name);
        if let Some(expected) = &file.expected_id {
            seen.covered.insert(expected.clone());
        }

        let parsed = match &file.text {
            Err(e) => {
                doc.errors.push(format!("cannot read document: {}", e));
                None
            }
            Ok(text) => match self.converter.parse_document(&file.file_name, text) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    doc.errors.push(e.to_string());
                    None
                }
            },
        };

        if let Some(parsed) = parsed {
            let id = parsed.record.id.clone();
            if !seen.parsed.insert(id.clone()) {
                doc.errors.push(format!("duplicate id {}", id));
            }
            seen.covered.insert(id.clone());
            // A file written from a known record is checked against that record
            let key = file.expected_id.as_deref().unwrap_or(id.as_str());
            match by_id.get(key) {
                Some(original) => {
                    if original.set() != file.set {
                        doc.errors.push(format!(
                            "stored in {} but the record belongs in {}",
                            file.set,
                            original.set()
                        ));
                    }
                    self.compare(original, &parsed, &mut doc);
                }
                None => doc.errors.push(format!("no source record with id {}", key)),
            }
        }

        doc.is_valid = doc.errors.is_empty();
        doc
    }

    /// Field-by-field comparison of an original record and its parsed
    /// document
    pub fn compare(&self, original: &Record, parsed: &ParsedDocument, doc: &mut DocumentValidation) {
        let migrated = &parsed.record;

        if migrated.id != original.id {
            doc.errors
                .push(format!("id mismatch: expected {}, found {}", original.id, migrated.id));
        }
        if migrated.title != original.title {
            doc.errors.push(format!(
                "title mismatch: expected {:?}, found {:?}",
                original.title, migrated.title
            ));
        }
        if migrated.is_deleted != original.is_deleted {
            doc.errors.push(format!(
                "isDeleted mismatch: expected {}, found {}",
                original.is_deleted, migrated.is_deleted
            ));
        }

        let expected_content = strip_title_heading(&original.content, &original.title)
            .unwrap_or(&original.content);
        if normalize_whitespace(expected_content) != normalize_whitespace(&migrated.content) {
            doc.warnings.push("content differs from the source record".to_string());
        }

        self.compare_timestamp(keys::CREATED, &original.created_at, parsed, doc);
        self.compare_timestamp(keys::UPDATED, &original.updated_at, parsed, doc);
        self.compare_deleted_at(original.deleted_at.as_ref(), parsed, doc);

        let expected_tags: HashSet<&str> = original.tags.iter().map(String::as_str).collect();
        let found_tags: HashSet<&str> = migrated.tags.iter().map(String::as_str).collect();
        if expected_tags != found_tags {
            doc.warnings.push(format!(
                "tags differ: expected {:?}, found {:?}",
                original.tags, migrated.tags
            ));
        }
    }

    fn compare_timestamp(
        &self,
        key: &str,
        expected: &DateTime<Utc>,
        parsed: &ParsedDocument,
        doc: &mut DocumentValidation,
    ) {
        match raw_timestamp(parsed, key) {
            None => doc.errors.push(format!("{} is missing or unparsable", key)),
            Some(found) => {
                let drift = drift_ms(expected, &found);
                if drift > self.tolerance_ms {
                    doc.warnings.push(format!("{} differs by {}ms", key, drift));
                }
            }
        }
    }

    fn compare_deleted_at(
        &self,
        expected: Option<&DateTime<Utc>>,
        parsed: &ParsedDocument,
        doc: &mut DocumentValidation,
    ) {
        let key = keys::DELETED_AT;
        match (expected, raw_timestamp(parsed, key)) {
            (Some(expected), Some(found)) => {
                let drift = drift_ms(expected, &found);
                if drift > self.tolerance_ms {
                    doc.warnings.push(format!("{} differs by {}ms", key, drift));
                }
            }
            (Some(_), None) => doc.errors.push(format!("{} is missing", key)),
            (None, Some(_)) => doc
                .warnings
                .push(format!("{} is set but the source record has none", key)),
            (None, None) => {}
        }
    }

    fn check_counts(&self, originals: &[Record], seen: &SeenIds, report: &mut ValidationReport) {
        let stats = &mut report.statistics;
        let pairs = [
            (RecordSet::Active, stats.original_active, stats.migrated_active),
            (RecordSet::Trash, stats.original_trash, stats.migrated_trash),
        ];
        for (set, expected, found) in pairs {
            if expected != found {
                stats.count_mismatch = true;
                report.errors.push(format!(
                    "{} count mismatch: expected {} documents, found {}",
                    set, expected, found
                ));
            }
        }

        for record in originals.iter().filter(|r| !seen.covered.contains(&r.id)) {
            report
                .errors
                .push(format!("no migrated document for record {}", record.id));
        }
    }

    fn check_ratio(&self, report: &mut ValidationReport) {
        let stats = &report.statistics;
        let ratio = stats.invalid_ratio();
        let message = format!(
            "{} of {} documents are invalid ({:.1}%)",
            stats.invalid_files,
            stats.total_files,
            ratio * 100.0
        );
        if ratio > self.error_ratio {
            report.errors.push(message);
        } else if ratio > self.warning_ratio {
            report.warnings.push(message);
        }
    }
}

/// Ids met while checking files
#[derive(Default)]
struct SeenIds {
    /// Ids parsed from documents
    parsed: HashSet<String>,
    /// Records that have a document, by parsed or expected id
    covered: HashSet<String>,
}

/// The timestamp as written in the document, without cleaner defaults
fn raw_timestamp(parsed: &ParsedDocument, key: &str) -> Option<DateTime<Utc>> {
    frontmatter_timestamp(&parsed.frontmatter, key)
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
