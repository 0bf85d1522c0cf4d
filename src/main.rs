//! Folio - migrate note collections into frontmatter markdown documents
//!
//! Reads a JSON record collection, cleans it, writes one markdown document
//! per record and cross-checks the result.

mod cli;
mod commands;

use std::env;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use cli::{Cli, OutputFormat};
use folio_core::error::{ExitCode as FolioExitCode, FolioError};
use folio_core::logging;
use folio_core::migration::CancellationFlag;

fn main() -> ExitCode {
    let start = Instant::now();

    let argv_format_json = argv_requests_json();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if argv_format_json && err.use_stderr() => {
            // `--format json` may not have been parsed yet
            let usage = FolioError::UsageError(err.to_string());
            eprintln!("{}", usage.to_json());
            return ExitCode::from(usage.exit_code() as u8);
        }
        Err(err) => err.exit(),
    };

    if let Err(e) = logging::init_tracing(cli.verbose, cli.log_level.as_deref(), cli.log_json) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::debug!(elapsed = ?start.elapsed(), "parse_args");

    let cancel = CancellationFlag::new();
    let handler_flag = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || handler_flag.cancel()) {
        tracing::warn!(error = %e, "cannot install Ctrl-C handler");
    }

    let result = commands::dispatch::run(&cli, start, &cancel);

    match result {
        Ok(()) => ExitCode::from(FolioExitCode::Success as u8),
        Err(e) => {
            let exit_code = e.exit_code();

            if cli.format == OutputFormat::Json {
                eprintln!("{}", e.to_json());
            } else if !cli.quiet {
                eprintln!("error: {}", e);
                if let Some(chain) = e.error_chain() {
                    for entry in chain {
                        eprintln!("  caused by: {}", entry.message);
                    }
                }
            }

            ExitCode::from(exit_code as u8)
        }
    }
}

fn argv_requests_json() -> bool {
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--format" {
            if args.next().is_some_and(|v| v == "json") {
                return true;
            }
        } else if arg == "--format=json" {
            return true;
        }
    }
    false
}
