use std::process::ExitCode;

use log::error;
use worker::config::WorkerConfig;

#[tokio::main]
async fn main() -> ExitCode {
    shared::env::init();
    shared::logger::init();

    let config = WorkerConfig::from_env();
    match worker::run_worker(config, shutdown_signal()).await {
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
