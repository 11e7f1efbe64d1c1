//! # storefront-db: Database Layer for the Storefront Catalog
//!
//! SQLite access for categories and special offers, the reference-data
//! seeder, and the startup sequence that gets the database ready.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Storefront Data Flow                               │
//! │                                                                         │
//! │  storefront-api                                                        │
//! │   ├── initialize() ──► startup::initialize (once, at boot)             │
//! │   └── CatalogService ──► db.offers() / db.categories() (per request)  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  storefront-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌─────────────┐  ┌─────────┐  ┌───────────┐  │   │
//! │  │   │ Database  │  │ Repositories│  │ Seeder  │  │  startup  │  │   │
//! │  │   │ (pool.rs) │◄─│ OfferRepo   │  │ catalog │  │ retry +   │  │   │
//! │  │   │ SqlitePool│  │ CategoryRepo│  │ .json   │  │ backoff   │  │   │
//! │  │   └───────────┘  └─────────────┘  └─────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (WAL)                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded migrations, schema probe and drop
//! - [`error`] - Database error types
//! - [`repository`] - Offer and category stores
//! - [`seed`] - Reference data seeder
//! - [`startup`] - Connection retry loop and seeding policy
//!
//! ## Usage
//!
//! ```rust,ignore
//! use storefront_db::{Database, DbConfig};
//! use storefront_db::startup::{self, RetryPolicy, StartupMode, TokioSleeper};
//!
//! let db = Database::connect_lazy(DbConfig::new("./storefront.db"))?;
//! let report = startup::initialize(&db, StartupMode::Production, &RetryPolicy::default(), &TokioSleeper).await;
//!
//! let offers = db.offers().list_active(&CancellationToken::new()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod seed;
pub mod startup;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::offer::OfferRepository;

pub use seed::{SeedCatalog, SeedReport, Seeder};
pub use startup::{
    RetryPolicy, Sleeper, StartupFault, StartupMode, StartupOutcome, StartupReport, StartupState,
    StartupTarget, TokioSleeper,
};
