//! # Catalog API Errors
//!
//! The one error shape catalog reads return to their callers.
//!
//! ## From Storage to Client
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the Storefront API                     │
//! │                                                                         │
//! │  HTTP controller              CatalogService                            │
//! │  ───────────────              ──────────────                            │
//! │                                                                         │
//! │  GET /offers/{id}                                                       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Service method: Result<T, ApiError>                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Unreachable / no schema ── DbError ──► SERVICE_UNAVAILABLE ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Corrupt row ─────────── Mapping ─────► DATA_INTEGRITY ─────────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  No such offer ─────────────────────► NOT_FOUND ────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Internal details are logged here and never reach the client.

use serde::Serialize;
use storefront_db::DbError;

/// Error body of a failed catalog read.
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Offer not found: 550e8400-e29b-41d4-a716-446655440001"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("{message}")]
pub struct ApiError {
    /// Stable code clients branch on
    pub code: ErrorCode,

    /// Safe to show; never carries SQL or row contents
    pub message: String,
}

/// Failure classes, serialized as `NOT_FOUND`, `SERVICE_UNAVAILABLE`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No such offer (404)
    NotFound,

    /// Database unreachable or not initialized yet (503)
    ServiceUnavailable,

    /// Caller went away before the read finished (499)
    Cancelled,

    /// A stored record is corrupt (500)
    DataIntegrity,

    /// Anything else (500)
    Internal,
}

impl ErrorCode {
    /// HTTP status the controller layer answers with.
    pub fn http_status(self) -> u16 {
        match self {
            ErrorCode::NotFound => 404,
            ErrorCode::ServiceUnavailable => 503,
            ErrorCode::Cancelled => 499,
            ErrorCode::DataIntegrity | ErrorCode::Internal => 500,
        }
    }
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// `"{resource} not found: {id}"`
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ServiceUnavailable, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Logs the storage detail, keeps the client message generic.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::ConnectionFailed(e) => {
                tracing::warn!("Database unreachable: {}", e);
                ApiError::unavailable("Database is unavailable")
            }
            DbError::PoolExhausted => ApiError::unavailable("Database is busy"),
            DbError::SchemaMissing(e) => {
                tracing::warn!("Catalog schema missing: {}", e);
                ApiError::unavailable("Catalog is not initialized")
            }
            DbError::Cancelled => ApiError::new(ErrorCode::Cancelled, "Request cancelled"),
            DbError::Mapping(e) => {
                tracing::error!(
                    offer_id = e.record_id(),
                    field = e.field(),
                    "Stored offer is corrupt: {}",
                    e
                );
                ApiError::new(
                    ErrorCode::DataIntegrity,
                    format!("Offer {} has corrupt data", e.record_id()),
                )
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Migration failed: {}", e);
                ApiError::internal("Database migration failed")
            }
            DbError::QueryFailed(e) => {
                tracing::error!("Database query failed: {}", e);
                ApiError::internal("Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::internal("Database transaction failed")
            }
            DbError::UniqueViolation { field } => {
                tracing::error!("Unique violation: {}", field);
                ApiError::internal("Database operation failed")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::internal("Database operation failed")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::internal("Database operation failed")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::MappingError;

    #[test]
    fn test_serializes_code_and_message() {
        let err = ApiError::not_found("Offer", "abc");
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["message"], "Offer not found: abc");
    }

    #[test]
    fn test_connectivity_maps_to_unavailable() {
        for err in [
            DbError::ConnectionFailed("unable to open database file".into()),
            DbError::PoolExhausted,
            DbError::SchemaMissing("no such table: special_offers".into()),
        ] {
            let api: ApiError = err.into();
            assert_eq!(api.code, ErrorCode::ServiceUnavailable);
            assert_eq!(api.code.http_status(), 503);
        }
    }

    #[test]
    fn test_mapping_failure_names_offer_but_hides_details() {
        let err = DbError::Mapping(MappingError::UnknownOfferType {
            id: "offer-7".into(),
            value: "Clearance".into(),
        });

        let api: ApiError = err.into();

        assert_eq!(api.code, ErrorCode::DataIntegrity);
        assert!(api.message.contains("offer-7"));
        assert!(!api.message.contains("Clearance"));
    }

    #[test]
    fn test_query_failure_is_generic() {
        let api: ApiError = DbError::QueryFailed("near \"SELEC\": syntax error".into()).into();

        assert_eq!(api.code, ErrorCode::Internal);
        assert_eq!(api.message, "Database operation failed");
    }

    #[test]
    fn test_cancelled() {
        let api: ApiError = DbError::Cancelled.into();
        assert_eq!(api.code, ErrorCode::Cancelled);
    }
}
