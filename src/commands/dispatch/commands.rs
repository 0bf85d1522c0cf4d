//! Command implementations for all folio commands

use tracing::debug;

use crate::cli::Commands;
use crate::commands;
use crate::commands::dispatch::command::{Command, CommandContext};
use folio_core::error::Result;

impl Command for Commands {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let result = match self {
            Commands::Migrate(args) => commands::migrate::execute(ctx.cli, ctx.config, args, ctx.cancel),
            Commands::TestMigration { paths, max } => {
                commands::test_migration::execute(ctx.cli, ctx.config, paths, *max)
            }
            Commands::Estimate { source } => commands::estimate::execute(ctx.cli, ctx.config, source),
            Commands::Backup(args) => commands::backup::execute(ctx.cli, ctx.config, args),
            Commands::Restore(args) => commands::restore::execute(ctx.cli, args),
            Commands::Verify { paths, no_trash } => {
                commands::verify::execute(ctx.cli, ctx.config, paths, *no_trash)
            }
            Commands::Clean { source, write } => commands::clean::execute(ctx.cli, source, *write),
            Commands::Check { document } => commands::check::execute(ctx.cli, document),
        };
        debug!(elapsed = ?ctx.start.elapsed(), "execute_command");
        result
    }
}
