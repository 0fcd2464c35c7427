use std::{path::PathBuf, process::ExitCode};

use ::tracing::error;
use clap::Parser;

mod config;
mod error;
mod ingest_test;
mod service;
mod splitter;
mod tracing;
mod utils;

use tracing::setup_tracing;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[arg(short, long, value_name = "config file", help = "Path to config file")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config_path = cli
        .config
        .unwrap_or_else(|| PathBuf::from(config::DEFAULT_CONFIG_PATH));
    let config = match config::Config::from_path(&config_path) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load config from {}: {err:?}", config_path.display());
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = setup_tracing(&config) {
        eprintln!("failed to set up tracing: {err:?}");
        return ExitCode::FAILURE;
    }

    let ingestion = match service::DataIngestion::new(config) {
        Ok(ingestion) => ingestion,
        Err(err) => {
            error!("error initializing data ingestion: {err:?}");
            return ExitCode::FAILURE;
        }
    };

    // run() logs its own failures; only the exit code is decided here
    match ingestion.run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
