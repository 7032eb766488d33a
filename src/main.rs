use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use blutrv_exporter::config::DEFAULT_CONFIG_PATH;
use blutrv_exporter::server::{serve, shutdown_signal};
use blutrv_exporter::{BluCollector, ExporterConfig};

#[derive(Parser, Debug)]
#[command(name = "blutrv-exporter")]
#[command(about = "Prometheus exporter for Shelly BLU TRV valves paired with a BLU gateway")]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Listen address, overriding the configured one
    #[arg(short, long)]
    listen: Option<String>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = ExporterConfig::load(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;
    if let Some(listen) = args.listen {
        config.listen = listen;
    }

    run(config).await
}

async fn run(config: ExporterConfig) -> Result<()> {
    info!(
        address = %config.address,
        subtype = %config.subtype,
        timeout_seconds = config.timeout_seconds,
        "Monitoring Shelly BLU gateway"
    );

    let collector =
        Arc::new(BluCollector::from_config(&config).context("Failed to create gateway client")?);

    let listener = TcpListener::bind(&config.listen)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen))?;
    info!(
        "Starting Prometheus exporter on {} (/metrics, /debug/blu)",
        config.listen
    );

    serve(listener, collector, shutdown_signal()).await?;
    info!("Shutting down...");
    Ok(())
}
