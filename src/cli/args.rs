//! Argument groups shared by several commands

use std::path::PathBuf;

use clap::Args;
use folio_core::backup::SnapshotKind;

use super::parse::parse_snapshot_kind;

/// A record collection and the directory its documents go to
#[derive(Args, Debug, Clone)]
pub struct SourceTargetArgs {
    /// JSON file holding the record collection
    #[arg(long, short)]
    pub source: PathBuf,

    /// Directory receiving the documents
    #[arg(long, short)]
    pub target: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct MigrateArgs {
    #[command(flatten)]
    pub paths: SourceTargetArgs,

    /// Skip the pre-migration snapshot
    #[arg(long)]
    pub no_backup: bool,

    /// Where the pre-migration snapshot is saved (default from config)
    #[arg(long)]
    pub backup_dir: Option<PathBuf>,

    /// Leave deleted records out
    #[arg(long)]
    pub no_trash: bool,

    /// Replace documents that already exist
    #[arg(long)]
    pub overwrite: bool,
}

#[derive(Args, Debug, Clone)]
pub struct BackupArgs {
    /// JSON file holding the record collection
    #[arg(long, short)]
    pub source: PathBuf,

    /// Directory for the snapshot file (default from config)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Why the snapshot is taken (manual, migration, automatic)
    #[arg(long, default_value = "manual", value_parser = parse_snapshot_kind)]
    pub kind: SnapshotKind,
}

#[derive(Args, Debug, Clone)]
pub struct RestoreArgs {
    /// Snapshot file
    pub snapshot: PathBuf,

    /// Record collection file to restore into
    #[arg(long)]
    pub into: PathBuf,

    /// Replace the whole collection instead of merging
    #[arg(long)]
    pub replace_all: bool,

    /// Restore deleted records as well
    #[arg(long)]
    pub include_deleted: bool,
}
