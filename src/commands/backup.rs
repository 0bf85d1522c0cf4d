//! `folio backup` command

use std::path::PathBuf;

use crate::cli::{BackupArgs, Cli, OutputFormat};
use crate::commands::format::print_json;
use folio_core::backup::{BackupManager, FsSnapshotSink, SaveOutcome};
use folio_core::clean::{remove_duplicates, RecordCleaner};
use folio_core::config::FolioConfig;
use folio_core::error::Result;
use folio_core::source::{JsonRecordStore, RecordSource};

/// Execute the backup command
pub fn execute(cli: &Cli, config: &FolioConfig, args: &BackupArgs) -> Result<()> {
    let cleaner = RecordCleaner::new();
    let raw = JsonRecordStore::new(&args.source).load_records()?;
    let report = cleaner.clean_collection(&raw);
    let records = remove_duplicates(report.cleaned_records);

    let manager = BackupManager::new(cleaner);
    let snapshot = manager.create_snapshot(&records, args.kind);
    let dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.backup.directory));
    let outcome = manager.save_snapshot(&snapshot, &FsSnapshotSink::new(dir))?;

    match cli.format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "outcome": outcome,
            "metadata": snapshot.metadata,
            "unfixable": report.unfixable_issues,
        }))?,
        OutputFormat::Human => {
            match &outcome {
                SaveOutcome::Saved { identifier } => println!("{}", identifier),
                SaveOutcome::Cancelled => println!("Backup cancelled"),
            }
            if !cli.quiet {
                let m = &snapshot.metadata;
                println!(
                    "{} snapshot of {} record(s) ({} active, {} deleted)",
                    m.kind, m.total, m.active, m.deleted
                );
                for issue in &report.unfixable_issues {
                    println!("  WARN  left out {}", issue);
                }
            }
        }
    }
    Ok(())
}
