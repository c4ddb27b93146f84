//! Same-Origin API Relay
//!
//! A reverse relay for embedded widgets built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                  API RELAY                    │
//!                    │                                               │
//!   Client Request   │  ┌─────────┐   ┌──────────┐   ┌───────────┐  │
//!   ─────────────────┼─▶│  http   │──▶│  routes  │──▶│  headers  │  │
//!                    │  │ server  │   │  store   │   │  request  │  │
//!                    │  └─────────┘   └──────────┘   └─────┬─────┘  │
//!                    │                                     │        │
//!                    │                                     ▼        │
//!   Client Response  │  ┌─────────┐   ┌──────────┐   ┌───────────┐  │     Origin
//!   ◀────────────────┼──│ headers │◀──│ content  │◀──│ upstream  │◀─┼──── Server
//!                    │  │response │   │ validate │   │  client   │  │
//!                    │  └─────────┘   └──────────┘   └───────────┘  │
//!                    │                                               │
//!                    │  ┌─────────────────────────────────────────┐  │
//!                    │  │         Cross-Cutting Concerns           │  │
//!                    │  │  config · observability · lifecycle      │  │
//!                    │  └─────────────────────────────────────────┘  │
//!                    └──────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod config;
pub mod content;
pub mod headers;
pub mod http;
pub mod relay;
pub mod routes;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::RelayConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::relay::{RelayEngine, UpstreamClient};
use crate::routes::{FileBackend, RouteStore};

#[derive(Parser)]
#[command(name = "api-relay")]
#[command(about = "Same-origin relay proxy for embedded widget APIs", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => RelayConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    tracing_subscriber::EnvFilter::new(&config.observability.log_filter)
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("api-relay v0.1.0 starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        relay_enabled = config.relay.enabled,
        routes_file = %config.relay.routes_file,
        upstream_timeout_secs = config.relay.upstream_timeout_secs,
        "Configuration loaded"
    );

    // Initialize metrics endpoint
    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    // Assemble the relay core
    let store = Arc::new(RouteStore::new(
        Box::new(FileBackend::new(&config.relay.routes_file)),
        Duration::from_secs(config.route_cache.ttl_secs),
    ));
    let upstream = UpstreamClient::new(
        Duration::from_secs(config.relay.upstream_timeout_secs),
        config.relay.max_redirects,
    )?;
    let engine = Arc::new(RelayEngine::new(config.relay.enabled, store, upstream));

    // Bind TCP listener
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    // Serve with graceful shutdown
    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();
    let server = HttpServer::new(&config, engine);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
