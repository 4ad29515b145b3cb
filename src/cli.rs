//! Command-line interface.
//!
//! With no subcommand the binary runs as a worker: jobs in on stdin, records
//! out on stdout, logs on stderr.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Persistent speech worker: transcribe, translate and dub audio
#[derive(Parser, Debug)]
#[command(name = "doblaje", version, about)]
pub struct Cli {
    /// Subcommand to execute (none = run the worker loop)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Suppress all but error logging
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose logging (-v: info, -vv: debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the voice catalogue and legacy aliases
    Voices,

    /// Check external tool and model availability
    Check,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_args_means_worker_mode() {
        let cli = Cli::parse_from(["doblaje"]);
        assert!(cli.command.is_none());
        assert!(!cli.quiet);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn parses_check_subcommand_with_globals() {
        let cli = Cli::parse_from(["doblaje", "check", "-vv"]);
        assert!(matches!(cli.command, Some(Commands::Check)));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn parses_config_path() {
        let cli = Cli::parse_from(["doblaje", "--config", "/etc/doblaje.toml"]);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/doblaje.toml")));
    }
}
