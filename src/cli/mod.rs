//! Command-line interface for the call coordinator.
//!
//! Developer tooling: run a scripted call lifecycle against the in-memory
//! capabilities, or print the notification descriptor a configuration yields.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod descriptor;
pub mod simulate;

/// conclave-call - call-session lifecycle coordinator
#[derive(Parser)]
#[command(name = "conclave-call")]
#[command(about = "Call-session lifecycle coordinator for the Conclave mobile client")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (TOML)
    #[arg(short, long, global = true, env = "CONCLAVE_CALL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run one call lifecycle against mock capabilities
    Simulate(simulate::SimulateArgs),
    /// Print the foreground notification descriptor
    Descriptor(descriptor::DescriptorArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_log_file_flag() {
        let cli = Cli::try_parse_from(["conclave-call", "descriptor", "--log-file", "logs/call.log"]).unwrap();
        assert_eq!(cli.log_file, Some(PathBuf::from("logs/call.log")));
        assert!(matches!(cli.command, Commands::Descriptor(_)));

        let cli = Cli::try_parse_from(["conclave-call", "-v", "simulate"]).unwrap();
        assert!(cli.verbose);
        assert!(cli.log_file.is_none());
    }
}
