//! Core library entry for the `secjira` CLI.
//!
//! Turns dependency vulnerability alerts into Jira tickets, exactly once per
//! alert: a deterministic identity key dedups against existing tickets, and
//! configured watchers are reconciled onto freshly created ones.

pub mod alert;
pub mod cli;
pub mod commands;
pub mod config;
pub mod ticket;
pub mod tracker;

use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution
/// fails.
pub async fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    commands::dispatch(&cli.command).await
}
