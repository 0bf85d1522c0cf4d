//! `folio estimate` command

use std::path::Path;

use crate::cli::{Cli, OutputFormat};
use crate::commands::format::{format_millis, print_json};
use folio_core::clean::{remove_duplicates, RecordCleaner};
use folio_core::config::FolioConfig;
use folio_core::error::Result;
use folio_core::record::partition;
use folio_core::source::{JsonRecordStore, RecordSource};

/// Execute the estimate command
pub fn execute(cli: &Cli, config: &FolioConfig, source: &Path) -> Result<()> {
    let raw = JsonRecordStore::new(source).load_records()?;
    let report = RecordCleaner::new().clean_collection(&raw);
    let records = remove_duplicates(report.cleaned_records);
    let (active, trash) = partition(&records);

    let total = if config.migration.include_trash {
        records.len()
    } else {
        active.len()
    };
    let estimate = config.migration.estimate_duration(total);
    let estimated_ms = estimate.as_millis() as u64;

    match cli.format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "records": records.len(),
            "active": active.len(),
            "deleted": trash.len(),
            "unfixable": report.unfixable_issues.len(),
            "estimatedMs": estimated_ms,
            "perRecordMs": config.migration.per_record_estimate_ms,
        }))?,
        OutputFormat::Human => {
            println!(
                "{} record(s) ({} active, {} deleted)",
                records.len(),
                active.len(),
                trash.len()
            );
            if !report.unfixable_issues.is_empty() {
                println!("{} unusable source entries will be skipped", report.unfixable_issues.len());
            }
            println!("Estimated migration time: {}", format_millis(estimated_ms));
        }
    }
    Ok(())
}
