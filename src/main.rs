//! Mirrorchat CLI entry point.

use clap::Parser;

use mirrorchat::cli::{handle_error, load_config, Cli, Commands};
use mirrorchat::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    // Keep the guard alive so buffered file logs are flushed on exit.
    let _logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Init(args) => mirrorchat::cli::commands::init::execute(args, &config, cli.json).await,
        Commands::Serve(args) => mirrorchat::cli::commands::serve::execute(args, &config, cli.json).await,
        Commands::Ledger => mirrorchat::cli::commands::ledger::execute(&config, cli.json).await,
        Commands::Transcripts(args) => {
            mirrorchat::cli::commands::transcripts::execute(args, &config, cli.json).await
        }
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
