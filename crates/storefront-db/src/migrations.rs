//! # Catalog Schema
//!
//! Embedded SQL migrations for the storefront catalog, plus the schema probe
//! and drop used by the startup loop.
//!
//! ## Schema Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Schema Lifecycle                                   │
//! │                                                                         │
//! │  schema_present()  ── sqlite_master lists every catalog table?          │
//! │       │                                                                 │
//! │       ├── no  ──► run_migrations() ──► seed                             │
//! │       └── yes ──► skip seeding                                          │
//! │                                                                         │
//! │  drop_schema()     ── development mode only: drop catalog tables and    │
//! │                       _sqlx_migrations so the next run starts clean     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Changing the Schema
//! Add `migrations/sqlite/NNN_what_changed.sql` with the next number. Applied
//! files are checksummed, so an edited one fails every later start.

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::error::DbResult;

/// `migrations/sqlite`, compiled in.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Tables the catalog needs. Children come first so dropping in this order
/// never trips a foreign key.
pub const CATALOG_TABLES: [&str; 3] = ["category_images", "categories", "special_offers"];

/// Applies whatever `_sqlx_migrations` doesn't list yet.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;

    info!(total = MIGRATOR.migrations.len(), "Catalog schema up to date");
    Ok(())
}

/// Returns true when every catalog table exists.
///
/// Reads `sqlite_master` instead of probing a table and matching the error
/// text.
pub async fn schema_present(pool: &SqlitePool) -> DbResult<bool> {
    let found: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN (?1, ?2, ?3)",
    )
    .bind(CATALOG_TABLES[0])
    .bind(CATALOG_TABLES[1])
    .bind(CATALOG_TABLES[2])
    .fetch_one(pool)
    .await?;

    Ok(found == CATALOG_TABLES.len() as i64)
}

/// Drops every catalog table and the migration ledger.
pub async fn drop_schema(pool: &SqlitePool) -> DbResult<()> {
    warn!("Dropping catalog schema");

    let mut tx = pool.begin().await?;
    for table in CATALOG_TABLES.iter().chain(std::iter::once(&"_sqlx_migrations")) {
        sqlx::query(&format!("DROP TABLE IF EXISTS {table}"))
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    Ok(())
}

/// `(known, applied)` migration counts.
///
/// A database that was never migrated has no ledger table and reports zero
/// applied. Any other failure is returned.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let ledgers: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = '_sqlx_migrations'",
    )
    .fetch_one(pool)
    .await?;
    if ledgers == 0 {
        return Ok((total, 0));
    }

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
        .fetch_one(pool)
        .await?;

    Ok((total, applied as usize))
}
