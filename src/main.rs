//! Main entry point for the housing-data-pipeline CLI

use clap::Parser;
use housing_data_pipeline::cli::{Cli, Commands};
use housing_data_pipeline::metrics;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber with optional JSON formatting
fn init_tracing() {
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("housing_data_pipeline=info"));

    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Credentials may live in .env; load it before clap reads env fallbacks
    let dotenv = dotenvy::dotenv();

    init_tracing();
    if let Err(e) = &dotenv {
        if !e.not_found() {
            warn!("Failed to load .env: {}", e);
        }
    }

    let cli = Cli::parse();

    if let Some(addr) = cli.metrics_addr {
        if let Err(e) = metrics::init_metrics(addr).await {
            warn!("Metrics disabled: {}", e);
        }
    }

    let result = match cli.command {
        Commands::Fetch(ref args) => args.execute(&cli).await.map_err(|e| anyhow::anyhow!(e)),
        Commands::Sources(ref sources_cmd) => sources_cmd.execute(&cli).await,
        Commands::Verify(ref verify_cmd) => {
            verify_cmd.execute(&cli).await.map_err(|e| anyhow::anyhow!(e))
        }
        Commands::Mock(ref mock_args) => mock_args.execute(&cli).await.map_err(|e| anyhow::anyhow!(e)),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        std::process::exit(1);
    }
}
