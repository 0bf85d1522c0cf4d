//! Command dispatch logic for folio

use std::time::Instant;

use crate::cli::Cli;
use folio_core::config::FolioConfig;
use folio_core::error::Result;
use folio_core::migration::CancellationFlag;
use tracing::debug;

mod command;
mod commands;

use command::{Command, CommandContext, NoCommand};

pub fn run(cli: &Cli, start: Instant, cancel: &CancellationFlag) -> Result<()> {
    let Some(cmd) = &cli.command else {
        return NoCommand.execute(&CommandContext::new(cli, &FolioConfig::default(), start, cancel));
    };

    let config = FolioConfig::discover(cli.config.as_deref())?;
    debug!(elapsed = ?start.elapsed(), "load_config");

    let ctx = CommandContext::new(cli, &config, start, cancel);
    cmd.execute(&ctx)
}
