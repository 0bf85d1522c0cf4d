//! `folio check` command - check a single document's format

use std::fs;
use std::path::Path;

use crate::cli::{Cli, OutputFormat};
use crate::commands::format::print_json;
use folio_core::document::DocumentConverter;
use folio_core::error::{FolioError, Result};

/// Execute the check command
pub fn execute(cli: &Cli, document: &Path) -> Result<()> {
    if !document.is_file() {
        return Err(FolioError::not_found("document", document.display()));
    }
    let text = fs::read_to_string(document)?;
    let check = DocumentConverter::default().validate_document_format(&text);

    match cli.format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "document": document.display().to_string(),
            "isValid": check.is_valid,
            "error": check.error,
        }))?,
        OutputFormat::Human => {
            if check.is_valid && !cli.quiet {
                println!("{}: ok", document.display());
            }
        }
    }

    match check.error {
        Some(reason) if !check.is_valid => Err(FolioError::parse(document.display(), reason)),
        _ => Ok(()),
    }
}
