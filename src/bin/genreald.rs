//! genreald: Genreal detection proxy daemon.
//!
//! Serves the audio, text and code detection endpoints over HTTP for the
//! browser frontend, forwarding each request to its hosted detector.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};

use genreal::ModalClient;
use genreal::server::config::{Config, Secrets};
use genreal::server::router;

/// Genreal daemon: detection proxy for hosted inference endpoints.
#[derive(Parser)]
#[command(name = "genreald")]
#[command(version = genreal::PKG_VERSION)]
#[command(about = "Genreal detection proxy daemon")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind to, overriding the config file.
    #[arg(short, long, env = "GENREAL_ADDRESS")]
    address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    // Load configuration
    let config = Config::load(args.config.as_deref())?;
    let address = args.address.unwrap_or_else(|| config.server.address.clone());

    // Fail fast on missing credentials unless explicitly allowed
    let credentials = match Secrets::resolve() {
        Ok(credentials) => Some(credentials),
        Err(e) if config.server.require_credentials => return Err(e.into()),
        Err(e) => {
            warn!(error = %e, "starting without credentials; analysis endpoints will answer 500");
            None
        }
    };

    let client = ModalClient::new(config.upstream.endpoints(), credentials)?;
    let app = router(Arc::new(client), &config.server);

    let listener = TcpListener::bind(&address).await?;
    info!(version = %genreal::version_string(), %address, "genreald listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("genreald shutting down");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
