//! CLI argument parsing for folio
//!
//! Global flags: --format, --quiet, --verbose, --log-level, --log-json, --config

pub mod args;
pub mod parse;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use args::{BackupArgs, MigrateArgs, RestoreArgs, SourceTargetArgs};
pub use folio_core::format::OutputFormat;
use parse::parse_output_format;

/// Folio - move a note collection into frontmatter markdown documents
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (human or json)
    #[arg(long, global = true, default_value = "human", value_parser = parse_output_format)]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Debug logging and phase timings
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Log level (error, warn, info, debug, trace) or a full filter directive
    #[arg(long, global = true, env = "FOLIO_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Configuration file (default: config.toml in the folio config directory)
    #[arg(long, global = true, env = "FOLIO_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Migrate a record collection into markdown documents
    Migrate(MigrateArgs),

    /// Dry-run a few records in a scratch directory under the target
    TestMigration {
        #[command(flatten)]
        paths: SourceTargetArgs,

        /// Maximum number of records to try (default from config)
        #[arg(long)]
        max: Option<usize>,
    },

    /// Estimate how long a full migration would take
    Estimate {
        /// JSON file holding the record collection
        #[arg(long, short)]
        source: PathBuf,
    },

    /// Snapshot a record collection
    Backup(BackupArgs),

    /// Restore a snapshot into a record collection file
    Restore(RestoreArgs),

    /// Cross-check an existing target against its source without writing
    Verify {
        #[command(flatten)]
        paths: SourceTargetArgs,

        /// Ignore deleted records and the trash location
        #[arg(long)]
        no_trash: bool,
    },

    /// Normalize a record collection and report every fix
    Clean {
        /// JSON file holding the record collection
        #[arg(long, short)]
        source: PathBuf,

        /// Save the cleaned collection back to the source file
        #[arg(long)]
        write: bool,
    },

    /// Check that a single document is well-formed
    Check {
        /// Path to the markdown document
        document: PathBuf,
    },
}
