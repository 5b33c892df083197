//! CLI command definitions and dispatch.

pub mod introspect;

use clap::{ArgAction, Parser, Subcommand};

/// eebuild: dependency tooling for execution environment builds.
#[derive(Parser, Debug)]
#[command(name = eebuild_common::constants::BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Report and optionally write the requirements of installed collections.
    Introspect(introspect::IntrospectArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Introspect(args) => introspect::execute(args),
    }
}
