//! # Storage Errors
//!
//! What can go wrong between the stores and SQLite, sorted so the startup
//! loop and the API can each decide what to do.
//!
//! ## Classification
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  sqlx::Error ──────────┐        MappingError (storefront-core)          │
//! │                        ▼               │                                │
//! │                     DbError ◄──────────┘                                │
//! │                        │                                                │
//! │        ┌───────────────┼──────────────────────┐                         │
//! │        ▼               ▼                      ▼                         │
//! │  is_transient()   fault() → StartupFault   From<DbError> for ApiError   │
//! │  (retry later)    (startup loop)           (storefront-api)             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::error::DatabaseError;
use storefront_core::MappingError;
use thiserror::Error;

use crate::startup::StartupFault;

/// Errors from the catalog database.
#[derive(Debug, Error)]
pub enum DbError {
    /// A row that had to exist doesn't.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A UNIQUE constraint rejected an insert.
    ///
    /// ## When This Occurs
    /// - Seeding ids that are already stored (two processes seeding at once)
    /// - Two images of one category with the same order
    #[error("Duplicate value for {field}")]
    UniqueViolation { field: String },

    /// An insert referenced a missing parent row.
    ///
    /// ## When This Occurs
    /// - A category image whose category id isn't stored
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// The database can't be reached right now.
    ///
    /// ## When This Occurs
    /// - The file or its directory can't be opened or created
    /// - SQLite stayed busy or locked past the busy timeout
    /// - The pool was closed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The database answers but the catalog tables aren't there.
    ///
    /// ## When This Occurs
    /// - A new database file before the schema was created
    /// - A read racing a development-mode schema drop
    #[error("Schema missing: {0}")]
    SchemaMissing(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// SQLite rejected a statement for any other reason.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// BEGIN or COMMIT of a seed batch failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Every pooled connection stayed busy for the whole acquire timeout.
    #[error("No free database connection")]
    PoolExhausted,

    /// The caller's cancellation token fired before the read finished.
    #[error("Operation cancelled")]
    Cancelled,

    /// A stored offer couldn't be turned into its public view.
    #[error("Mapping failed: {0}")]
    Mapping(#[from] MappingError),

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// True when the same call may succeed later without any change on our
    /// side.
    pub fn is_transient(&self) -> bool {
        matches!(self, DbError::ConnectionFailed(_) | DbError::PoolExhausted)
    }

    /// How the startup loop treats this error.
    pub fn fault(&self) -> StartupFault {
        match self {
            DbError::SchemaMissing(_) => StartupFault::SchemaMissing,
            e if e.is_transient() => StartupFault::TransientConnectivity,
            _ => StartupFault::Fatal,
        }
    }
}

// Primary result codes (low byte of an extended code).
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;
const SQLITE_CANTOPEN: i32 = 14;

/// Sorts an error SQLite itself reported.
///
/// | SQLite says                        | DbError             |
/// |------------------------------------|---------------------|
/// | BUSY, LOCKED, CANTOPEN             | `ConnectionFailed`  |
/// | `no such table: ...`               | `SchemaMissing`     |
/// | `UNIQUE constraint failed: t.col`  | `UniqueViolation`   |
/// | `FOREIGN KEY constraint failed`    | `ForeignKeyViolation` |
/// | anything else                      | `QueryFailed`       |
fn classify_sqlite(err: &dyn DatabaseError) -> DbError {
    let message = err.message();
    let primary = err
        .code()
        .and_then(|code| code.parse::<i32>().ok())
        .map(|code| code & 0xff);

    if let Some(SQLITE_BUSY | SQLITE_LOCKED | SQLITE_CANTOPEN) = primary {
        return DbError::ConnectionFailed(message.to_string());
    }

    if message.contains("no such table") {
        return DbError::SchemaMissing(message.to_string());
    }

    if let Some(field) = message.strip_prefix("UNIQUE constraint failed: ") {
        return DbError::UniqueViolation {
            field: field.to_string(),
        };
    }

    if message.contains("FOREIGN KEY constraint failed") {
        return DbError::ForeignKeyViolation {
            message: message.to_string(),
        };
    }

    DbError::QueryFailed(message.to_string())
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => classify_sqlite(&*db_err),
            sqlx::Error::Io(e) => DbError::ConnectionFailed(e.to_string()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => {
                DbError::ConnectionFailed("connection pool closed".to_string())
            }
            sqlx::Error::RowNotFound => DbError::not_found("row", "unknown"),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_classification() {
        assert_eq!(
            DbError::ConnectionFailed("refused".into()).fault(),
            StartupFault::TransientConnectivity
        );
        assert_eq!(DbError::PoolExhausted.fault(), StartupFault::TransientConnectivity);
        assert_eq!(
            DbError::SchemaMissing("no such table: special_offers".into()).fault(),
            StartupFault::SchemaMissing
        );
        assert_eq!(
            DbError::MigrationFailed("checksum".into()).fault(),
            StartupFault::Fatal
        );
        assert_eq!(DbError::Cancelled.fault(), StartupFault::Fatal);
    }

    #[test]
    fn test_pool_errors_are_transient() {
        assert!(DbError::from(sqlx::Error::PoolTimedOut).is_transient());
        assert!(DbError::from(sqlx::Error::PoolClosed).is_transient());
        assert!(!DbError::from(sqlx::Error::RowNotFound).is_transient());
    }
}
