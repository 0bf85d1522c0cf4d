//! Shared output helpers for command modules

use std::fmt::Display;

use serde::Serialize;

use folio_core::error::Result;
use folio_core::validate::ValidationReport;

/// Print a serializable result as pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print each message under a severity prefix
pub fn print_issues<T: Display>(prefix: &str, issues: &[T]) {
    for issue in issues {
        println!("  {} {}", prefix, issue);
    }
}

/// Human summary of a validation report; warnings are dropped when quiet
pub fn print_validation(report: &ValidationReport, quiet: bool) {
    let stats = &report.statistics;
    if report.is_valid {
        if !quiet {
            println!(
                "Validation passed: {} of {} document(s) valid",
                stats.valid_files, stats.total_files
            );
        }
    } else {
        println!(
            "Validation failed: {} error(s), {} warning(s)",
            report.errors.len(),
            report.warnings.len()
        );
    }

    print_issues("ERROR", &report.errors);
    if !quiet {
        print_issues("WARN ", &report.warnings);
    }
}

/// Milliseconds as a short human duration
pub fn format_millis(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else if ms < 60_000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        format!("{}m {}s", ms / 60_000, (ms % 60_000) / 1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_millis() {
        assert_eq!(format_millis(250), "250ms");
        assert_eq!(format_millis(1500), "1.5s");
        assert_eq!(format_millis(125_000), "2m 5s");
    }
}
