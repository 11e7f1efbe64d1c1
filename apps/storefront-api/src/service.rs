//! Catalog read facade used by the HTTP controllers.

use storefront_core::{CategoryView, OfferView};
use storefront_db::Database;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;

/// Read-only catalog API.
///
/// Every method takes the request's cancellation token; a token cancelled
/// mid-read yields `ErrorCode::Cancelled`.
#[derive(Debug, Clone)]
pub struct CatalogService {
    db: Database,
    degraded: bool,
}

impl CatalogService {
    pub fn new(db: Database) -> Self {
        CatalogService {
            db,
            degraded: false,
        }
    }

    /// A service over a database that never became ready. Reads still go
    /// to the database and succeed once it comes back.
    pub fn degraded(db: Database) -> Self {
        CatalogService { db, degraded: true }
    }

    /// The database this service reads from.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// True when startup gave up waiting for the database.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Categories ordered by display order, each with its gallery images.
    pub async fn list_categories(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<CategoryView>, ApiError> {
        let categories = self.db.categories().list_all(cancel).await?;
        debug!(count = categories.len(), "Listed categories");
        Ok(categories)
    }

    /// Every offer, active or not, ordered by display order.
    pub async fn list_all_offers(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<OfferView>, ApiError> {
        let offers = self.db.offers().list_all(cancel).await?;
        debug!(count = offers.len(), "Listed all offers");
        Ok(offers)
    }

    /// Active offers only, ordered by display order.
    pub async fn list_active_offers(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<OfferView>, ApiError> {
        let offers = self.db.offers().list_active(cancel).await?;
        debug!(count = offers.len(), "Listed active offers");
        Ok(offers)
    }

    /// One offer by id.
    ///
    /// ## Errors
    /// - `NOT_FOUND` when no offer has this id
    /// - `DATA_INTEGRITY` when the stored row can't be decoded
    pub async fn get_offer_by_id(
        &self,
        id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<OfferView, ApiError> {
        let id = id.to_string();
        self.db
            .offers()
            .get_by_id(&id, cancel)
            .await?
            .ok_or_else(|| ApiError::not_found("Offer", &id))
    }

    /// True when the database answers a trivial query.
    pub async fn health_check(&self) -> bool {
        self.db.health_check().await
    }

    /// Closes the underlying pool.
    pub async fn close(&self) {
        self.db.close().await;
    }
}
