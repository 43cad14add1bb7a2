pub mod commands;

use std::process::ExitCode;

use clap::Parser;
use commands::Commands;
use log::error;

/// Distributed raycast renderer: a routing master gateway and stateless
/// compute workers.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> ExitCode {
    shared::env::init();
    shared::logger::init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Master(args) => master::run_master(args.into_config(), shutdown_signal()).await,
        Commands::Worker(args) => worker::run_worker(args.into_config(), shutdown_signal()).await,
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Application error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for the shutdown signal: {}", e);
    }
}
