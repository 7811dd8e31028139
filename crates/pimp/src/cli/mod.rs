//! Command-line interface for pimp.
//!
//! This module provides the CLI structure for the `pimp` binary: running the
//! site, inspecting its routes and moderating claims and accreditation
//! applications.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::Verbosity;

pub use commands::{
    AccreditationCommand, ClaimsCommand, ConfigCommand, RenderCommand, RoutesCommand, SeedCommand,
    ServeCommand, StatusCommand,
};

/// pimp - the P.I.M.P Business Repository
///
/// A business directory and review site with accreditation, listing claims
/// and an owner dashboard.
#[derive(Debug, Parser)]
#[command(name = "pimp")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the web server
    Serve(ServeCommand),

    /// List the site's routes
    Routes(RoutesCommand),

    /// Render one page against the sample directory and print it
    Render(RenderCommand),

    /// Load the sample directory into the database
    Seed(SeedCommand),

    /// Show database status
    Status(StatusCommand),

    /// Moderate business claims
    #[command(subcommand)]
    Claims(ClaimsCommand),

    /// Moderate accreditation applications
    #[command(subcommand)]
    Accreditation(AccreditationCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn status_cli(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Status(StatusCommand { json: false }),
        }
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "pimp");
    }

    #[test]
    fn test_verbosity() {
        assert_eq!(status_cli(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(status_cli(3, true).verbosity(), Verbosity::Quiet);
        assert_eq!(status_cli(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(status_cli(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(status_cli(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["pimp", "serve", "--host", "0.0.0.0", "-p", "8080"]).unwrap();
        match cli.command {
            Command::Serve(cmd) => {
                assert_eq!(cmd.host.as_deref(), Some("0.0.0.0"));
                assert_eq!(cmd.port, Some(8080));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_render() {
        let cli = Cli::try_parse_from(["pimp", "render", "/search?q=pizza"]).unwrap();
        match cli.command {
            Command::Render(cmd) => assert_eq!(cmd.path, "/search?q=pizza"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_seed_reset() {
        let cli = Cli::try_parse_from(["pimp", "seed", "--reset"]).unwrap();
        assert!(matches!(cli.command, Command::Seed(SeedCommand { reset: true })));
    }

    #[test]
    fn test_parse_moderation() {
        let cli = Cli::try_parse_from(["pimp", "claims", "approve", "7"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Claims(ClaimsCommand::Approve { id: 7 })
        ));

        let cli = Cli::try_parse_from(["pimp", "accreditation", "list", "--all"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Accreditation(AccreditationCommand::List { all: true })
        ));

        assert!(Cli::try_parse_from(["pimp", "claims", "approve", "seven"]).is_err());
    }

    #[test]
    fn test_parse_global_flags() {
        let cli =
            Cli::try_parse_from(["pimp", "-c", "/custom/config.toml", "-vv", "routes"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
        assert_eq!(cli.verbose, 2);

        let cli = Cli::try_parse_from(["pimp", "status", "-q"]).unwrap();
        assert!(cli.quiet);
    }

    #[test]
    fn test_parse_config_validate() {
        let cli = Cli::try_parse_from(["pimp", "config", "validate", "--file", "site.toml"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }
}
