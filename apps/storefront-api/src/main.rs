//! # Storefront API Server
//!
//! Boots the catalog backend and keeps it alive until shutdown.
//!
//! ## Running
//! ```bash
//! # Development: fresh schema and seed data on every start
//! APP_ENV=development cargo run -p storefront-api
//!
//! # Production
//! STOREFRONT_DB_PATH=/var/lib/storefront/catalog.db cargo run -p storefront-api --release
//! ```

use anyhow::Context;
use storefront_api::{initialize, init_tracing, AppConfig};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting storefront API");

    let config = AppConfig::load().context("invalid configuration")?;
    let (service, report) = initialize(&config)
        .await
        .context("failed to create database pool")?;

    if report.is_ready() {
        info!(
            attempts = report.attempts,
            seeded = report.seed.is_some(),
            "Storefront ready"
        );
    } else {
        warn!(
            attempts = report.attempts,
            last_error = report.last_error.as_deref().unwrap_or("unknown"),
            "Storefront running degraded"
        );
    }

    shutdown_signal().await;

    info!("Shutting down");
    service.close().await;

    Ok(())
}

/// Waits for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
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
