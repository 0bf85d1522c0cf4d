//! `folio verify` command - cross-check an existing target without writing

use crate::cli::{Cli, OutputFormat, SourceTargetArgs};
use crate::commands::format::{print_json, print_validation};
use folio_core::config::FolioConfig;
use folio_core::error::{FolioError, Result};
use folio_core::migration::Migrator;
use folio_core::source::JsonRecordStore;
use folio_core::storage::FsBackend;

/// Execute the verify command
pub fn execute(
    cli: &Cli,
    config: &FolioConfig,
    paths: &SourceTargetArgs,
    no_trash: bool,
) -> Result<()> {
    let store = JsonRecordStore::new(&paths.source);
    let backend = FsBackend::new(&paths.target);
    let include_trash = config.migration.include_trash && !no_trash;

    let report = Migrator::new(&store, &backend, config).verify_target(include_trash)?;

    match cli.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Human => print_validation(&report, cli.quiet),
    }

    if report.is_valid {
        Ok(())
    } else {
        Err(FolioError::ValidationFailed {
            errors: report.errors.len(),
        })
    }
}
