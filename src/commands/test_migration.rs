//! `folio test-migration` command

use crate::cli::{Cli, OutputFormat, SourceTargetArgs};
use crate::commands::format::{format_millis, print_issues, print_json};
use folio_core::config::FolioConfig;
use folio_core::error::{FolioError, Result};
use folio_core::migration::Migrator;
use folio_core::source::JsonRecordStore;
use folio_core::storage::{FsBackend, StorageBackend};

/// Execute the test-migration command
pub fn execute(
    cli: &Cli,
    config: &FolioConfig,
    paths: &SourceTargetArgs,
    max: Option<usize>,
) -> Result<()> {
    let store = JsonRecordStore::new(&paths.source);
    let backend = FsBackend::new(&paths.target);
    let root = backend.select_root()?;
    let max = max.unwrap_or(config.migration.test_max_records);

    let result = Migrator::new(&store, &backend, config).test_migration(&root, max)?;

    match cli.format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Human => {
            if !cli.quiet {
                println!(
                    "Test migration wrote {} of {} record(s) in {}",
                    result.written,
                    result.tested,
                    format_millis(result.duration_ms)
                );
                if result.cleaned_up {
                    println!("Scratch directory {} removed", result.scratch_dir);
                }
                print_issues("WARN ", &result.warnings);
            }
            print_issues("ERROR", &result.errors);
        }
    }

    if result.success {
        Ok(())
    } else {
        Err(FolioError::failed(
            "test migration",
            format!("{} record(s) could not be written", result.errors.len()),
        ))
    }
}
