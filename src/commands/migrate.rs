//! `folio migrate` command

use std::path::PathBuf;

use crate::cli::{Cli, MigrateArgs, OutputFormat};
use crate::commands::format::{format_millis, print_issues, print_json, print_validation};
use folio_core::backup::{FsSnapshotSink, SaveOutcome};
use folio_core::config::FolioConfig;
use folio_core::error::{FolioError, Result};
use folio_core::migration::{
    CancellationFlag, MigrationOptions, MigrationProgress, MigrationResult, MigrationStage, Migrator,
};
use folio_core::source::JsonRecordStore;
use folio_core::storage::FsBackend;

/// Execute the migrate command
pub fn execute(
    cli: &Cli,
    config: &FolioConfig,
    args: &MigrateArgs,
    cancel: &CancellationFlag,
) -> Result<()> {
    let store = JsonRecordStore::new(&args.paths.source);
    let backend = FsBackend::new(&args.paths.target);
    let backup_dir = args
        .backup_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.backup.directory));
    let sink = FsSnapshotSink::new(backup_dir);

    let defaults = MigrationOptions::from(&config.migration);
    let options = MigrationOptions {
        create_backup: defaults.create_backup && !args.no_backup,
        include_trash: defaults.include_trash && !args.no_trash,
        overwrite_existing: defaults.overwrite_existing || args.overwrite,
    };

    let show_progress = !cli.quiet && cli.format == OutputFormat::Human;
    let mut last_stage = None;
    let mut on_progress = |p: &MigrationProgress| {
        if show_progress {
            print_progress(p, &mut last_stage);
        }
    };

    let migrator = Migrator::new(&store, &backend, config).with_snapshot_sink(&sink);
    let result = migrator.migrate(&options, &mut on_progress, cancel)?;

    match cli.format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Human => print_human(cli, &args.paths.target, &result),
    }

    if result.success {
        Ok(())
    } else {
        Err(FolioError::failed(
            "migrate every record",
            format!(
                "{} record(s) failed, {} validation error(s)",
                result.errors.len(),
                result.validation.errors.len()
            ),
        ))
    }
}

/// Stage changes and per-record lines, on stderr
fn print_progress(p: &MigrationProgress, last_stage: &mut Option<MigrationStage>) {
    if *last_stage != Some(p.stage) {
        eprintln!("{}...", p.stage);
        *last_stage = Some(p.stage);
    }
    if let Some(item) = &p.current_item {
        eprintln!("  [{}/{}] {}", p.processed + 1, p.total, item);
    }
}

fn print_human(cli: &Cli, target: &std::path::Path, result: &MigrationResult) {
    if !cli.quiet {
        println!(
            "Migrated {} note(s) and {} deleted note(s) to {}",
            result.migrated_notes,
            result.migrated_trash,
            target.display()
        );
        if result.skipped > 0 {
            println!("Skipped {} deleted record(s)", result.skipped);
        }
        match &result.backup {
            Some(SaveOutcome::Saved { identifier }) => println!("Backup: {}", identifier),
            Some(SaveOutcome::Cancelled) => println!("Backup: cancelled"),
            None => {}
        }
        if !result.warnings.is_empty() {
            println!("{} warning(s):", result.warnings.len());
            print_issues("WARN ", &result.warnings);
        }
    }

    if !result.errors.is_empty() {
        println!("{} record(s) not migrated:", result.errors.len());
        print_issues("ERROR", &result.errors);
    }

    print_validation(&result.validation, cli.quiet);

    if !cli.quiet {
        println!("Completed in {}", format_millis(result.duration_ms));
    }
}
