//! # Storefront API
//!
//! Process bootstrap for the storefront backend and the catalog read API
//! the HTTP controllers call.
//!
//! ## Boot Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  init_tracing()                                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  AppConfig::load()          APP_ENV, STOREFRONT_DB_PATH, ...            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  initialize(&config)                                                    │
//! │       ├── Database::connect_lazy                                        │
//! │       └── startup::initialize (retry, schema, seed)                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CatalogService (ready or degraded)                                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A degraded start still hands back a service. Its reads fail with
//! `SERVICE_UNAVAILABLE` until the database answers again.

pub mod config;
pub mod error;
pub mod service;

pub use config::{AppConfig, ConfigError};
pub use error::{ApiError, ErrorCode};
pub use service::CatalogService;

use storefront_db::startup::{self, StartupReport, TokioSleeper};
use storefront_db::{Database, DbResult};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,storefront=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Connects to the database and brings it to a usable state.
///
/// Never fails because the database is down; that ends in a degraded
/// service. Only a database path that can't form a connection URL is an
/// error.
pub async fn initialize(config: &AppConfig) -> DbResult<(CatalogService, StartupReport)> {
    info!(
        mode = %config.mode,
        path = %config.database_path.display(),
        "Initializing storefront"
    );

    let db = Database::connect_lazy(config.db_config())?;
    let report = startup::initialize(&db, config.mode, &config.retry, &TokioSleeper).await;

    let service = if report.is_ready() {
        CatalogService::new(db)
    } else {
        warn!(
            attempts = report.attempts,
            "Serving in degraded mode, catalog reads will fail until the database is reachable"
        );
        CatalogService::degraded(db)
    };

    Ok((service, report))
}
