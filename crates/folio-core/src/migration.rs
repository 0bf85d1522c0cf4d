//! Migration pipeline
//!
//! `preparing → backing-up (optional) → migrating → validating → completed`,
//! with `error` reachable from any non-terminal stage when the source cannot
//! be read or the target cannot be set up. Records are converted and written
//! one at a time; a record that fails is reported and the batch continues.

mod progress;
mod result;

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use chrono::Utc;

use crate::backup::{BackupManager, SaveOutcome, SnapshotKind, SnapshotSink};
use crate::clean::{remove_duplicates, RecordCleaner};
use crate::config::{FolioConfig, MigrationConfig};
use crate::document::{disambiguate, generate_file_name, DocumentConverter};
use crate::error::{ErrorContext, FolioError, Result, StorageErrorCode};
use crate::record::{partition, Record, RecordSet};
use crate::source::RecordSource;
use crate::storage::{DirHandle, StorageBackend};
use crate::trace_time;
use crate::validate::{MigratedFile, MigrationValidator, ValidationReport};

pub use progress::{CancellationFlag, MigrationProgress, MigrationStage};
pub(crate) use progress::ProgressReporter;
pub use result::{
    MigrationResult, RecordFailure, TestMigrationResult, CODE_ALREADY_EXISTS, CODE_UNFIXABLE,
};

/// Switches for a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationOptions {
    pub create_backup: bool,
    pub include_trash: bool,
    pub overwrite_existing: bool,
}

impl From<&MigrationConfig> for MigrationOptions {
    fn from(config: &MigrationConfig) -> Self {
        Self {
            create_backup: config.create_backup,
            include_trash: config.include_trash,
            overwrite_existing: config.overwrite_existing,
        }
    }
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self::from(&MigrationConfig::default())
    }
}

/// The two target locations
#[derive(Debug, Clone)]
struct TargetLayout {
    active: DirHandle,
    trash: DirHandle,
}

impl TargetLayout {
    fn dir(&self, set: RecordSet) -> &DirHandle {
        match set {
            RecordSet::Active => &self.active,
            RecordSet::Trash => &self.trash,
        }
    }
}

/// A document written during this run
#[derive(Debug, Clone)]
struct Written {
    record: Record,
    file_name: String,
}

/// Records ready to be written, after cleaning
struct Prepared {
    records: Vec<Record>,
    errors: Vec<RecordFailure>,
    warnings: Vec<String>,
}

/// Drives a collection from a source into a storage backend
pub struct Migrator<'a> {
    source: &'a dyn RecordSource,
    target: &'a dyn StorageBackend,
    sink: Option<&'a dyn SnapshotSink>,
    cleaner: RecordCleaner,
    converter: DocumentConverter,
    backup: BackupManager,
    validator: MigrationValidator,
    config: MigrationConfig,
}

impl<'a> Migrator<'a> {
    /// Build a migrator with components configured from `config`
    pub fn new(
        source: &'a dyn RecordSource,
        target: &'a dyn StorageBackend,
        config: &FolioConfig,
    ) -> Self {
        let cleaner = RecordCleaner::new();
        let converter = DocumentConverter::new(cleaner);
        Self {
            source,
            target,
            sink: None,
            cleaner,
            backup: BackupManager::new(cleaner),
            validator: MigrationValidator::new(converter.clone(), &config.validation),
            converter,
            config: config.migration.clone(),
        }
    }

    /// Where backup snapshots are saved
    pub fn with_snapshot_sink(mut self, sink: &'a dyn SnapshotSink) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Linear estimate of a full run
    pub fn estimate_duration(&self, total_records: usize) -> Duration {
        self.config.estimate_duration(total_records)
    }

    /// Run the whole pipeline.
    ///
    /// Returns `Err` only for failures that stop the run (source, backup,
    /// target layout, cancellation); everything else ends up in the result.
    #[tracing::instrument(skip_all, fields(source = %self.source.describe()))]
    pub fn migrate(
        &self,
        options: &MigrationOptions,
        progress: &mut dyn FnMut(&MigrationProgress),
        cancel: &CancellationFlag,
    ) -> Result<MigrationResult> {
        let started = Instant::now();
        let mut reporter = ProgressReporter::new(progress);

        match self.run(options, &mut reporter, cancel, started) {
            Ok(result) => Ok(result),
            Err(err) => {
                let stage = reporter.stage();
                reporter.fail(&err);
                tracing::error!(error = %err, %stage, "migration stopped");
                match err {
                    FolioError::Interrupted => Err(err),
                    other => Err(other.chain(
                        format!("migration stopped while {}", stage),
                        Some(
                            ErrorContext::new("migrate")
                                .with_metadata("stage", stage.as_str())
                                .with_metadata("source", self.source.describe()),
                        ),
                    )),
                }
            }
        }
    }

    fn run(
        &self,
        options: &MigrationOptions,
        reporter: &mut ProgressReporter<'_>,
        cancel: &CancellationFlag,
        started: Instant,
    ) -> Result<MigrationResult> {
        let Prepared {
            records,
            mut errors,
            mut warnings,
        } = self.prepare()?;

        let (mut to_write, trash) = partition(&records);
        let skipped = if options.include_trash {
            to_write.extend(trash);
            0
        } else {
            trash.len()
        };

        let backup = if options.create_backup {
            reporter.enter(MigrationStage::BackingUp)?;
            let outcome = self.save_backup(&records)?;
            if outcome == SaveOutcome::Cancelled {
                warnings.push("backup was cancelled; continuing without one".to_string());
            }
            Some(outcome)
        } else {
            None
        };

        reporter.enter(MigrationStage::Migrating)?;
        reporter.set_total(to_write.len());
        cancel.check()?;
        let layout = self.init_layout()?;
        let written = self.write_all(&to_write, &layout, options, reporter, cancel, &mut errors)?;

        reporter.enter(MigrationStage::Validating)?;
        let files = self.read_back(&layout, &written, &mut errors);
        let expected: Vec<Record> = written.iter().map(|w| w.record.clone()).collect();
        let validation = self.validator.validate(&expected, files);

        reporter.enter(MigrationStage::Completed)?;
        let migrated_trash = expected.iter().filter(|r| r.is_deleted).count();
        let result = MigrationResult {
            success: errors.is_empty() && validation.errors.is_empty(),
            stage: MigrationStage::Completed,
            migrated_notes: expected.len() - migrated_trash,
            migrated_trash,
            skipped,
            errors,
            warnings,
            validation,
            backup,
            duration_ms: started.elapsed().as_millis() as u64,
        };
        tracing::info!(
            success = result.success,
            notes = result.migrated_notes,
            trash = result.migrated_trash,
            errors = result.errors.len(),
            "migration finished"
        );
        Ok(result)
    }

    /// Load, clean and de-duplicate the source collection
    fn prepare(&self) -> Result<Prepared> {
        let start = Instant::now();
        let raw = self.source.load_records()?;
        let report = self.cleaner.clean_collection(&raw);

        let errors = report
            .unfixable_issues
            .into_iter()
            .map(RecordFailure::unfixable)
            .collect();
        let mut warnings = report.fixed_issues;

        let cleaned = report.cleaned_records.len();
        let records = remove_duplicates(report.cleaned_records);
        if records.len() < cleaned {
            warnings.push(format!(
                "{} records with an already used id were left out",
                cleaned - records.len()
            ));
        }

        trace_time!(start, "prepare");
        Ok(Prepared {
            records,
            errors,
            warnings,
        })
    }

    fn save_backup(&self, records: &[Record]) -> Result<SaveOutcome> {
        let Some(sink) = self.sink else {
            crate::bail_usage!("a backup was requested but no backup destination is configured");
        };
        let snapshot = self.backup.create_snapshot(records, SnapshotKind::Migration);
        self.backup
            .save_snapshot(&snapshot, sink)
            .map_err(|e| e.chain("cannot save the pre-migration backup", None))
    }

    fn init_layout(&self) -> Result<TargetLayout> {
        let root = self.target.select_root()?;
        self.layout_under(&root)
    }

    fn layout_under(&self, root: &DirHandle) -> Result<TargetLayout> {
        Ok(TargetLayout {
            active: self.target.create_subdirectory(root, &self.config.notes_dir)?,
            trash: self.target.create_subdirectory(root, &self.config.trash_dir)?,
        })
    }

    fn write_all(
        &self,
        records: &[&Record],
        layout: &TargetLayout,
        options: &MigrationOptions,
        reporter: &mut ProgressReporter<'_>,
        cancel: &CancellationFlag,
        errors: &mut Vec<RecordFailure>,
    ) -> Result<Vec<Written>> {
        let start = Instant::now();
        let mut used = HashSet::new();
        let mut written = Vec::with_capacity(records.len());

        for (index, record) in records.iter().enumerate() {
            cancel.check()?;
            reporter.item(index, Some(record.title.as_str()));

            match self.write_record(record, layout, options.overwrite_existing, &mut used) {
                Ok(file_name) => written.push(Written {
                    record: (*record).clone(),
                    file_name,
                }),
                Err(failure) => {
                    tracing::warn!(id = %record.id, failure = %failure, "record not migrated");
                    errors.push(failure);
                }
            }
        }
        reporter.item(records.len(), None);

        trace_time!(start, "write_documents");
        Ok(written)
    }

    /// Convert and write one record, returning the file name used
    fn write_record(
        &self,
        record: &Record,
        layout: &TargetLayout,
        overwrite_existing: bool,
        used: &mut HashSet<(RecordSet, String)>,
    ) -> std::result::Result<String, RecordFailure> {
        let set = record.set();
        let dir = layout.dir(set);

        let base = generate_file_name(&record.title);
        let mut file_name = base.clone();
        let mut n = 2;
        while !used.insert((set, file_name.clone())) {
            file_name = disambiguate(&base, n);
            n += 1;
        }

        let exists = self
            .target
            .entry_exists(dir, &file_name)
            .map_err(|e| RecordFailure::storage(record, &file_name, &e))?;
        if exists && !overwrite_existing {
            return Err(RecordFailure::for_record(
                record,
                &file_name,
                CODE_ALREADY_EXISTS,
                format!("{} already exists in {}", file_name, dir),
            ));
        }

        let text = self.converter.to_document(record);
        self.target
            .write_entry(dir, &file_name, &text, true)
            .map_err(|e| RecordFailure::storage(record, &file_name, &e))?;
        tracing::debug!(id = %record.id, file = %file_name, %set, "record written");
        Ok(file_name)
    }

    /// Re-enumerate the target and read back what this run wrote
    fn read_back(
        &self,
        layout: &TargetLayout,
        written: &[Written],
        errors: &mut Vec<RecordFailure>,
    ) -> Vec<MigratedFile> {
        let mut files = Vec::with_capacity(written.len());

        for set in [RecordSet::Active, RecordSet::Trash] {
            let names: HashMap<&str, &str> = written
                .iter()
                .filter(|w| w.record.set() == set)
                .map(|w| (w.file_name.as_str(), w.record.id.as_str()))
                .collect();
            if names.is_empty() {
                continue;
            }

            let dir = layout.dir(set);
            let entries = match self.target.list_entries(dir) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(dir = %dir, error = %e, "cannot list migrated documents");
                    errors.push(RecordFailure {
                        record_id: None,
                        title: None,
                        file_name: Some(dir.to_string()),
                        code: e.code.as_str().to_string(),
                        reason: format!("cannot list migrated documents: {}", e),
                    });
                    continue;
                }
            };

            for entry in entries {
                let file_name = entry.name();
                let Some(id) = names.get(file_name.as_str()) else {
                    continue;
                };
                files.push(MigratedFile {
                    text: self.target.read_entry(&entry),
                    expected_id: Some(id.to_string()),
                    file_name,
                    set,
                });
            }
        }
        files
    }

    /// Cross-check an already migrated target against the source without
    /// writing anything. Every document in the two target locations is read;
    /// a missing location counts as empty.
    #[tracing::instrument(skip(self), fields(source = %self.source.describe()))]
    pub fn verify_target(&self, include_trash: bool) -> Result<ValidationReport> {
        let start = Instant::now();
        let Prepared { records, .. } = self.prepare()?;
        let (mut expected, trash) = partition(&records);
        if include_trash {
            expected.extend(trash);
        }
        let expected: Vec<Record> = expected.into_iter().cloned().collect();

        let root = self.target.select_root()?;
        let mut files = Vec::new();
        for (set, name) in [
            (RecordSet::Active, &self.config.notes_dir),
            (RecordSet::Trash, &self.config.trash_dir),
        ] {
            if set == RecordSet::Trash && !include_trash {
                continue;
            }
            let dir = root.child(name);
            let entries = match self.target.list_entries(&dir) {
                Ok(entries) => entries,
                Err(e) if e.code == StorageErrorCode::DirectoryNotFound => Vec::new(),
                Err(e) => return Err(e.into()),
            };
            files.extend(entries.into_iter().filter(|e| e.name().ends_with(".md")).map(|entry| {
                MigratedFile {
                    file_name: entry.name(),
                    text: self.target.read_entry(&entry),
                    expected_id: None,
                    set,
                }
            }));
        }

        let report = self.validator.validate(&expected, files);
        trace_time!(start, "verify_target");
        Ok(report)
    }

    /// Write up to `max_records` documents into a scratch directory under
    /// `target_root`, then try to remove them again
    #[tracing::instrument(skip(self), fields(source = %self.source.describe()))]
    pub fn test_migration(
        &self,
        target_root: &DirHandle,
        max_records: usize,
    ) -> Result<TestMigrationResult> {
        let started = Instant::now();
        let Prepared {
            records,
            mut errors,
            mut warnings,
        } = self.prepare()?;
        let sample: Vec<&Record> = records.iter().take(max_records).collect();

        let scratch_name = format!("migration-test-{}", Utc::now().timestamp_millis());
        let scratch = self.target.create_subdirectory(target_root, &scratch_name)?;
        let layout = self.layout_under(&scratch)?;

        let mut used = HashSet::new();
        let mut written = Vec::new();
        for record in &sample {
            match self.write_record(record, &layout, false, &mut used) {
                Ok(file_name) => written.push((record.set(), file_name)),
                Err(failure) => errors.push(failure),
            }
        }

        let cleaned_up = self.remove_scratch(target_root, &scratch_name, &layout, &written, &mut warnings);

        Ok(TestMigrationResult {
            success: errors.is_empty(),
            tested: sample.len(),
            written: written.len(),
            errors,
            warnings,
            scratch_dir: scratch.to_string(),
            cleaned_up,
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }

    /// Best-effort removal of a dry run's files; reports whether it worked
    fn remove_scratch(
        &self,
        target_root: &DirHandle,
        scratch_name: &str,
        layout: &TargetLayout,
        written: &[(RecordSet, String)],
        warnings: &mut Vec<String>,
    ) -> bool {
        let scratch = target_root.child(scratch_name);
        let removals = written
            .iter()
            .map(|(set, name)| (layout.dir(*set).clone(), name.clone()))
            .chain([
                (scratch.clone(), self.config.notes_dir.clone()),
                (scratch.clone(), self.config.trash_dir.clone()),
                (target_root.clone(), scratch_name.to_string()),
            ]);

        for (dir, name) in removals {
            if let Err(e) = self.target.remove_entry(&dir, &name) {
                let message = if e.code == StorageErrorCode::NotSupported {
                    format!("scratch files were left in {}: the target cannot remove entries", scratch)
                } else {
                    format!("scratch files were left in {}: {}", scratch, e)
                };
                tracing::warn!("{}", message);
                warnings.push(message);
                return false;
            }
        }
        true
    }
}
