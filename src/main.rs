//! Edge router binary.
//!
//! Loads configuration, applies CLI overrides, and runs the server until a
//! shutdown signal arrives.

use std::path::PathBuf;

use clap::Parser;

use edge_router::config::{load_config, EdgeConfig};
use edge_router::lifecycle::{signals, Shutdown};
use edge_router::net::BoundedListener;
use edge_router::observability::{logging, metrics};
use edge_router::EdgeServer;

#[derive(Parser)]
#[command(name = "edge-router")]
#[command(about = "Static-asset and reverse-proxy front for a single origin", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overriding the config file (e.g. "0.0.0.0:80").
    #[arg(short, long)]
    listen: Option<String>,

    /// Document root for static routes, overriding the config file.
    #[arg(short, long)]
    root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => EdgeConfig::default(),
    };
    if let Some(listen) = args.listen {
        config.listener.bind_address = listen;
    }
    if let Some(root) = args.root {
        config.static_files.root = root;
    }

    logging::init(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        origin = %config.origin.url,
        document_root = %config.static_files.root.display(),
        routes = config.routes.len(),
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

    let listener = BoundedListener::bind(&config.listener).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::shutdown_signal().await;
        shutdown.trigger();
    });

    let server = EdgeServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
