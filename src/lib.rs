pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod grouping;
pub mod output;
pub mod pipeline;
pub mod proto;
pub mod request;
pub mod scan;
pub mod service;

use clap::Parser;
use cli::{Cli, USAGE};
use config::BatchConfig;
use error::BatchError;
use pipeline::RunSummary;
use service::GrpcAnalysisClient;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Entry point of the binary
pub fn run() -> ExitCode {
    config::load_dotenv();

    // Initialize tracing with RUST_LOG env filter
    // Default: warn for dependencies, info for this crate (per-group timings visible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,tolling_vision_batch=info")),
        )
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind;
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                let _ = e.print();
                return ExitCode::SUCCESS;
            }
            tracing::debug!("Argument parsing failed: {}", e);
            eprintln!("{}", USAGE);
            return ExitCode::from(1);
        }
    };

    let config = BatchConfig::from_cli(cli).with_env_overrides();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run_with_config(config)) {
        Ok(summary) => {
            tracing::info!(
                images = summary.images,
                groups = summary.dispatch.groups,
                dispatched = summary.dispatch.dispatched,
                empty = summary.dispatch.empty,
                failed = summary.dispatch.failed,
                rows = summary.rows_written,
                "Batch finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Batch failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Connect to the configured service and run the batch
pub async fn run_with_config(config: BatchConfig) -> Result<RunSummary, BatchError> {
    let client = GrpcAnalysisClient::connect_lazy(&config)?;
    pipeline::run_batch(&config, Arc::new(client)).await
}
