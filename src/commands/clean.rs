//! `folio clean` command

use std::path::Path;

use crate::cli::{Cli, OutputFormat};
use crate::commands::format::{print_issues, print_json};
use folio_core::clean::{remove_duplicates, sort_by_updated_desc, RecordCleaner};
use folio_core::error::Result;
use folio_core::source::{JsonRecordStore, RecordSource};

/// Execute the clean command
pub fn execute(cli: &Cli, source: &Path, write: bool) -> Result<()> {
    let store = JsonRecordStore::new(source);
    let raw = store.load_records()?;
    let report = RecordCleaner::new().clean_collection(&raw);

    let cleaned_count = report.cleaned_count;
    let mut records = remove_duplicates(report.cleaned_records);
    let duplicates = cleaned_count - records.len();

    if write {
        sort_by_updated_desc(&mut records);
        store.save_records(&records)?;
        tracing::info!(records = records.len(), path = %source.display(), "cleaned collection saved");
    }

    match cli.format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "originalCount": report.original_count,
            "cleanedCount": cleaned_count,
            "duplicatesRemoved": duplicates,
            "fixedIssues": report.fixed_issues,
            "unfixableIssues": report.unfixable_issues,
            "written": write,
        }))?,
        OutputFormat::Human => {
            println!(
                "{} of {} record(s) usable, {} fix(es), {} duplicate(s) removed",
                cleaned_count,
                report.original_count,
                report.fixed_issues.len(),
                duplicates
            );
            print_issues("ERROR", &report.unfixable_issues);
            if !cli.quiet {
                print_issues("FIXED", &report.fixed_issues);
            }
            if write {
                println!("Saved {} record(s) to {}", records.len(), source.display());
            }
        }
    }
    Ok(())
}
