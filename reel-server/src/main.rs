//! reel-server - video catalog HTTP service
//!
//! Serves the video resource API over a SQLite store. The store endpoint is
//! required: startup aborts before binding if it is missing or unreachable.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use reel_common::config::{resolve_database_url, TomlConfig, DATABASE_URL_ENV};
use reel_server::db::StoreConnection;
use reel_server::{build_router, AppState};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for reel-server
#[derive(Parser, Debug)]
#[command(name = "reel-server")]
#[command(about = "Short-form video catalog service")]
#[command(version)]
struct Args {
    /// sqlx SQLite URL of the video store (overrides REEL_DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting reel-server v{}", env!("CARGO_PKG_VERSION"));

    let database_url = resolve_database_url(args.database_url.as_deref(), DATABASE_URL_ENV, &config)
        .context("Refusing to start without a video store")?;

    let connections = Arc::new(StoreConnection::sqlite(database_url, config.max_connections));

    // First connection attempt happens before serving so a bad store fails fast
    if let Err(e) = connections.acquire().await {
        error!("Failed to connect to video store: {}", e);
        return Err(e).context("Video store unreachable");
    }

    let state = AppState::with_connection(connections);
    let app = build_router(state);

    let bind = args.bind.unwrap_or(config.bind);
    let port = args.port.unwrap_or(config.port);
    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind, port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("reel-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
