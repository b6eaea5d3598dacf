//! CLI argument definitions for cpv.
//!
//! Uses `clap` derive macros. Each command corresponds to a handler in the
//! [`super::commands`] module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "cpv",
    version,
    about = "Centralize NuGet package versions",
    long_about = "cpv scans a repository for project files, moves every PackageReference \
                  version into a single Directory.Packages.props (keeping the highest version \
                  seen for each package) and removes the per-project versions."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rewrite project files and write Directory.Packages.props
    Centralize {
        #[command(flatten)]
        target: TargetArgs,
        /// Skip project files that fail to parse instead of aborting
        #[arg(long)]
        keep_going: bool,
    },

    /// Show what `centralize` would do without changing any file
    Scan {
        #[command(flatten)]
        target: TargetArgs,
    },
}

/// Arguments shared by every command that works on a repository.
#[derive(Args, Debug)]
pub struct TargetArgs {
    /// Repository root (prompted for when omitted and stdin is a terminal)
    pub path: Option<String>,
    /// Configuration file (defaults to <PATH>/cpv.toml when present)
    #[arg(short, long, env = "CPV_CONFIG")]
    pub config: Option<PathBuf>,
    /// Ignore an existing Directory.Packages.props instead of merging it
    #[arg(long)]
    pub fresh: bool,
}

/// Parse command-line arguments.
pub fn parse() -> Cli {
    Cli::parse()
}
