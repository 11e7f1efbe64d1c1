//! # Connection Pool
//!
//! Opens the SQLite catalog database and hands out the stores.
//!
//! ## Two Ways to Open
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  DbConfig ──► connect_options()  sqlite://<path>?mode=rwc              │
//! │           │                      WAL, synchronous=NORMAL, foreign keys │
//! │           │                                                             │
//! │           ├── Database::new          opens a connection now and        │
//! │           │                          applies migrations (tools, tests) │
//! │           │                                                             │
//! │           └── Database::connect_lazy opens nothing until first use;    │
//! │                                      the startup loop pings through it │
//! │                                                                         │
//! │  Database (Clone, shares one SqlitePool)                                │
//! │     ├── offers()      OfferRepository                                   │
//! │     ├── categories()  CategoryRepository                                │
//! │     └── seeder()      Seeder                                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! WAL lets the catalog reads keep going while a seed transaction writes.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::category::CategoryRepository;
use crate::repository::offer::OfferRepository;
use crate::seed::Seeder;

// =============================================================================
// Configuration
// =============================================================================

/// Pool settings.
///
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/storefront/catalog.db")
///     .max_connections(4)
///     .run_migrations(false);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, created on first open. `:memory:` for a private
    /// in-memory database.
    pub database_path: PathBuf,

    /// Upper bound on open connections (default 10).
    pub max_connections: u32,

    /// Connections kept open while idle (default 0).
    pub min_connections: u32,

    /// How long a caller waits for a free connection before
    /// `DbError::PoolExhausted` (default 30s).
    pub connect_timeout: Duration,

    /// Idle connections are closed after this long. `None` keeps them, which
    /// an in-memory database needs to keep its contents (default 10 min).
    pub idle_timeout: Option<Duration>,

    /// Apply pending migrations in [`Database::new`] (default true).
    pub run_migrations: bool,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 10,
            min_connections: 0,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            run_migrations: true,
        }
    }

    /// A fresh, isolated in-memory database per call.
    ///
    /// One connection, never recycled: when the last connection to an
    /// in-memory database closes, its data is gone.
    pub fn in_memory() -> Self {
        DbConfig {
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: None,
            ..DbConfig::new(":memory:")
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    fn connect_options(&self) -> DbResult<SqliteConnectOptions> {
        let url = format!("sqlite://{}?mode=rwc", self.database_path.display());
        let options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| DbError::ConnectionFailed(format!("invalid database path: {e}")))?;

        // Foreign keys are off by default in SQLite; image rows cascade on them
        Ok(options
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true))
    }

    fn pool_options(&self) -> SqlitePoolOptions {
        let options = SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.connect_timeout)
            .idle_timeout(self.idle_timeout);

        match self.idle_timeout {
            Some(_) => options,
            None => options.max_lifetime(None),
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Handle to the catalog database. Clones share the pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool now and, unless disabled, migrates the schema.
    ///
    /// ## Errors
    /// - `ConnectionFailed` when the file can't be opened or created
    /// - `MigrationFailed` when a migration doesn't apply
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening catalog database");

        let options = config.connect_options()?;
        let pool = config
            .pool_options()
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;
        debug!(max_connections = config.max_connections, "Pool ready");

        let db = Database { pool };
        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Builds the pool without touching the database.
    ///
    /// Only an unusable path fails here. Reachability shows up on first use,
    /// which is what the startup loop's ping is for. Never migrates.
    pub fn connect_lazy(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Preparing lazy catalog pool");

        let options = config.connect_options()?;
        let pool = config.pool_options().connect_lazy_with(options);

        Ok(Database { pool })
    }

    /// Applies pending migrations; already-applied ones are skipped.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// The underlying pool, for tools and tests that need raw SQL.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn offers(&self) -> OfferRepository {
        OfferRepository::new(self.pool.clone())
    }

    pub fn categories(&self) -> CategoryRepository {
        CategoryRepository::new(self.pool.clone())
    }

    pub fn seeder(&self) -> Seeder {
        Seeder::new(self.pool.clone())
    }

    /// `SELECT 1` on a pooled connection.
    pub async fn ping(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// True when [`Self::ping`] succeeds.
    pub async fn health_check(&self) -> bool {
        self.ping().await.is_ok()
    }

    /// Closes every connection. Later reads fail with `ConnectionFailed`.
    pub async fn close(&self) {
        info!("Closing catalog database");
        self.pool.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_migrates_in_memory_database() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.health_check().await);
        assert!(migrations::schema_present(db.pool()).await.unwrap());
    }

    #[tokio::test]
    async fn test_lazy_pool_opens_on_first_use_without_schema() {
        let db = Database::connect_lazy(DbConfig::in_memory()).unwrap();

        db.ping().await.unwrap();
        assert!(!migrations::schema_present(db.pool()).await.unwrap());
    }

    #[tokio::test]
    async fn test_closed_pool_is_unreachable() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;

        let err = db.ping().await.unwrap_err();
        assert!(err.is_transient());
    }

    #[test]
    fn test_in_memory_keeps_its_connection() {
        let config = DbConfig::in_memory();

        assert_eq!(config.max_connections, 1);
        assert_eq!(config.min_connections, 1);
        assert!(config.idle_timeout.is_none());
        assert!(config.run_migrations);
    }

    #[test]
    fn test_builder_overrides_defaults() {
        let config = DbConfig::new("/tmp/catalog.db")
            .max_connections(4)
            .min_connections(2)
            .connect_timeout(Duration::from_secs(3))
            .run_migrations(false);

        assert_eq!(config.max_connections, 4);
        assert_eq!(config.min_connections, 2);
        assert_eq!(config.connect_timeout, Duration::from_secs(3));
        assert_eq!(config.idle_timeout, Some(Duration::from_secs(600)));
        assert!(!config.run_migrations);
    }
}
