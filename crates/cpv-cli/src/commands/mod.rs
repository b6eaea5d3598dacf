//! Command dispatch and handler modules.

mod centralize;
mod root;
mod scan;

use miette::Result;

use crate::cli::{Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Centralize { target, keep_going } => {
            centralize::exec(&target, keep_going, cli.verbose)
        }
        Command::Scan { target } => scan::exec(&target, cli.verbose),
    }
}
