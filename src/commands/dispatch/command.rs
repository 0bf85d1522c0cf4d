//! Command trait and context for dispatching commands

use std::time::Instant;

use crate::cli::Cli;
use folio_core::config::FolioConfig;
use folio_core::error::Result;
use folio_core::migration::CancellationFlag;

/// Shared context for command execution
pub struct CommandContext<'a> {
    pub cli: &'a Cli,
    pub config: &'a FolioConfig,
    pub start: Instant,
    /// Set by the Ctrl-C handler
    pub cancel: &'a CancellationFlag,
}

impl<'a> CommandContext<'a> {
    pub fn new(
        cli: &'a Cli,
        config: &'a FolioConfig,
        start: Instant,
        cancel: &'a CancellationFlag,
    ) -> Self {
        Self {
            cli,
            config,
            start,
            cancel,
        }
    }
}

/// Trait for commands that can be executed
pub trait Command {
    fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

/// No-op command (when no subcommand is provided)
pub struct NoCommand;

impl Command for NoCommand {
    fn execute(&self, _ctx: &CommandContext) -> Result<()> {
        println!("folio {}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Migrate a note collection into frontmatter markdown documents.");
        println!();
        println!("Run `folio --help` for usage information.");
        Ok(())
    }
}
