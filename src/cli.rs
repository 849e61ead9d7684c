//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI parser for `secjira`.
#[derive(Debug, Parser)]
#[command(
    name = "secjira",
    version,
    about = "Create Jira tickets from dependency vulnerability alerts"
)]
pub struct Cli {
    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ensure a tracking ticket exists for each alert in the input.
    Ensure {
        /// Alert JSON file; stdin when omitted or `-`.
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Preview ticket content for each alert without touching the tracker.
    Render {
        /// Alert JSON file; stdin when omitted or `-`.
        #[arg(long)]
        input: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::Parser;

    #[test]
    fn parses_ensure_subcommand() {
        let cli = Cli::parse_from(["secjira", "ensure"]);
        assert!(matches!(cli.command, Command::Ensure { input: None }));
    }

    #[test]
    fn parses_ensure_with_input_path() {
        let cli = Cli::parse_from(["secjira", "ensure", "--input", "alerts.json"]);
        match cli.command {
            Command::Ensure { input: Some(path) } => {
                assert_eq!(path.to_str(), Some("alerts.json"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_render_subcommand() {
        let cli = Cli::parse_from(["secjira", "render", "--input", "-"]);
        assert!(matches!(cli.command, Command::Render { input: Some(_) }));
    }

    #[test]
    fn rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["secjira", "sync"]).is_err());
    }
}
