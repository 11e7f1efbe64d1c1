//! # Repository Module
//!
//! Read stores for the storefront catalog.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Store Call Lifecycle                                 │
//! │                                                                         │
//! │  CatalogService                                                        │
//! │       │  db.offers().list_active(&token)                               │
//! │       ▼                                                                 │
//! │  OfferRepository                                                       │
//! │       │  acquire pooled connection ── one SELECT ── release            │
//! │       │                                                                 │
//! │       │  raced against token.cancelled() ──► DbError::Cancelled        │
//! │       ▼                                                                 │
//! │  OfferRecord ── mapping::to_public ──► OfferView                       │
//! │                    (bad row: WARN + skip)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`offer::OfferRepository`] - Special offer reads
//! - [`category::CategoryRepository`] - Categories with their images

pub mod category;
pub mod offer;

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::{DbError, DbResult};

/// Runs a store operation unless `cancel` fires first.
///
/// On cancellation the operation future is dropped, which returns its pooled
/// connection. An already-cancelled token never starts the query.
pub(crate) async fn cancellable<T, F>(cancel: &CancellationToken, operation: F) -> DbResult<T>
where
    F: Future<Output = DbResult<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(DbError::Cancelled),
        result = operation => result,
    }
}
