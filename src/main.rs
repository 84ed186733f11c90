//! conclave-call - developer harness for the call coordinator
//!
//! Main binary entry point for the command-line interface.

use anyhow::Result;
use clap::Parser;
use conclave_call::cli::{Cli, Commands};
use conclave_call::CallConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    conclave_call::logging::init_logging(cli.verbose, cli.log_file.as_deref())?;

    let config = match &cli.config {
        Some(path) => CallConfig::load(path)?,
        None => CallConfig::default(),
    };

    match cli.command {
        Commands::Simulate(args) => conclave_call::cli::simulate::run(args, config).await,
        Commands::Descriptor(args) => conclave_call::cli::descriptor::run(args, &config),
    }
}
