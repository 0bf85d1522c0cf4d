//! `folio restore` command

use std::fs;

use serde_json::Value;

use crate::cli::{Cli, OutputFormat, RestoreArgs};
use crate::commands::format::print_json;
use folio_core::backup::{BackupManager, RestoreOptions};
use folio_core::error::{FolioError, Result};
use folio_core::source::JsonRecordStore;

/// Execute the restore command
pub fn execute(cli: &Cli, args: &RestoreArgs) -> Result<()> {
    if !args.snapshot.exists() {
        return Err(FolioError::not_found("snapshot", args.snapshot.display()));
    }
    let text = fs::read_to_string(&args.snapshot)?;
    let data: Value = serde_json::from_str(&text).map_err(|e| FolioError::InvalidSnapshot {
        reason: format!("not valid JSON: {}", e),
    })?;

    let options = RestoreOptions {
        replace_all: args.replace_all,
        include_deleted: args.include_deleted,
    };
    let outcome = BackupManager::default().restore(&data, options)?;

    let store = JsonRecordStore::new(&args.into);
    let written = if outcome.replace_all {
        store.save_records(&outcome.records)?;
        outcome.records.len()
    } else {
        store.merge_records(&outcome.records)?
    };
    tracing::info!(written, into = %args.into.display(), "snapshot restored");

    match cli.format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "restored": outcome.records.len(),
            "written": written,
            "dropped": outcome.dropped,
            "skippedDeleted": outcome.skipped_deleted,
            "replaceAll": outcome.replace_all,
            "into": args.into.display().to_string(),
        }))?,
        OutputFormat::Human => {
            if !cli.quiet {
                let mode = if outcome.replace_all { "replaced" } else { "merged" };
                println!(
                    "Restored {} record(s) into {} ({}, {} written)",
                    outcome.records.len(),
                    args.into.display(),
                    mode,
                    written
                );
                if outcome.dropped > 0 {
                    println!("Dropped {} malformed entr{}", outcome.dropped, plural_y(outcome.dropped));
                }
                if outcome.skipped_deleted > 0 {
                    println!("Skipped {} deleted record(s)", outcome.skipped_deleted);
                }
            }
        }
    }
    Ok(())
}

fn plural_y(n: usize) -> &'static str {
    if n == 1 {
        "y"
    } else {
        "ies"
    }
}
