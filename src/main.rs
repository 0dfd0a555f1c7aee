//! Geocoding API gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌──────────────────────────────────────────────────────┐
//!                       │                  GEOCODE GATEWAY                      │
//!                       │                                                       │
//!   Client Request      │  ┌────────────┐    ┌──────────┐    ┌──────────────┐  │
//!   ────────────────────┼─▶│ request id │───▶│ routing  │───▶│   upstream   │──┼──▶ Search
//!                       │  │  + trace   │    │  table   │    │    client    │  │    Backend
//!                       │  └────────────┘    └──────────┘    └──────┬───────┘  │
//!                       │                                           │          │
//!   Client Response     │  ┌────────────────────────────────────────▼───────┐  │
//!   ◀───────────────────┼──│  translation stage: classify errors, reshape   │◀─┼─── envelope
//!                       │  │  features into Google Geocoding API results    │  │
//!                       │  └────────────────────────────────────────────────┘  │
//!                       │                                                       │
//!                       │   config · logging · metrics · graceful shutdown     │
//!                       └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use geocode_gateway::config::{load_config, GatewayConfig};
use geocode_gateway::http::HttpServer;
use geocode_gateway::lifecycle::{signals, Shutdown};
use geocode_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "geocode-gateway")]
#[command(about = "Serves Google-style geocoding responses from a search backend", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults are used when omitted.
    #[arg(short, long, env = "GEOCODE_GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Load and validate the configuration, then exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    if cli.check {
        println!("configuration OK");
        return Ok(());
    }

    logging::init(&config.observability);
    tracing::info!("geocode-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        request_timeout_secs = config.timeouts.request_secs,
        upstream_timeout_secs = config.timeouts.upstream_secs,
        missing_features = ?config.translation.missing_features,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_handler(&shutdown);

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
