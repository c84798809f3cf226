//! Keyward Server Binary
//!
//! Starts the TCP server for Keyward.

use std::sync::Arc;
use clap::Parser;
use keyward::{Config, Engine};
use keyward::network::Server;
use tracing_subscriber::{fmt, EnvFilter};

/// Keyward Server
#[derive(Parser, Debug)]
#[command(name = "keyward-server")]
#[command(about = "Multi-client key registry with owner-approved reads")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:12345")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Lines buffered per client before it is treated as dead
    #[arg(short = 'q', long, default_value = "1024")]
    queue_capacity: usize,

    /// Socket write timeout in milliseconds (0 disables it)
    #[arg(short = 'w', long, default_value = "5000")]
    write_timeout_ms: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,keyward=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("Keyward Server v{}", keyward::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    // Build config from args
    let config = Config::builder()
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .outbound_queue_capacity(args.queue_capacity)
        .write_timeout_ms(args.write_timeout_ms)
        .build();

    let engine = match Engine::open(config.clone()) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to start engine: {}", e);
            std::process::exit(1);
        }
    };

    let mut server = match Server::bind(config, engine) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to bind: {}", e);
            std::process::exit(1);
        }
    };

    // Set up Ctrl+C handler
    let shutdown = server.shutdown_handle();
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("Received Ctrl+C, initiating shutdown...");
        shutdown.shutdown();
    }) {
        tracing::warn!("Failed to install Ctrl+C handler: {}", e);
    }

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
