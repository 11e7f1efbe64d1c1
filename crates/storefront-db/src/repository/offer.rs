//! # Offer Repository
//!
//! Read operations over `special_offers`.
//!
//! ## Ordering
//! Every listing is ordered by `"order"` ascending. Equal orders keep
//! insertion order (`rowid`), so the same data always lists the same way.
//!
//! ## Per-Record Failures
//! A row whose type or blobs can't be mapped is logged at WARN with its id
//! and left out of the listing. The listing itself still succeeds.

use sqlx::{SqliteConnection, SqlitePool};
use storefront_core::{mapping, OfferRecord, OfferView};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::cancellable;
use crate::error::DbResult;

const SELECT_OFFERS: &str = r#"
    SELECT
        id,
        type,
        title,
        description,
        image_url,
        image_alt,
        display_config,
        timer,
        "order",
        is_active,
        metadata,
        created_at,
        updated_at
    FROM special_offers
"#;

/// Repository for special offer reads.
///
/// ## Usage
/// ```rust,ignore
/// let token = CancellationToken::new();
/// let repo = db.offers();
///
/// let active = repo.list_active(&token).await?;
/// let one = repo.get_by_id("550e8400-e29b-41d4-a716-446655440001", &token).await?;
/// ```
#[derive(Debug, Clone)]
pub struct OfferRepository {
    pool: SqlitePool,
}

impl OfferRepository {
    /// Creates a new OfferRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OfferRepository { pool }
    }

    /// Lists every offer, active or not.
    pub async fn list_all(&self, cancel: &CancellationToken) -> DbResult<Vec<OfferView>> {
        debug!("Listing all offers");

        let sql = format!(r#"{SELECT_OFFERS} ORDER BY "order" ASC, rowid ASC"#);
        let records = cancellable(cancel, self.fetch(&sql)).await?;

        Ok(map_listing(records))
    }

    /// Lists active offers only, in the same order as [`Self::list_all`].
    pub async fn list_active(&self, cancel: &CancellationToken) -> DbResult<Vec<OfferView>> {
        debug!("Listing active offers");

        let sql = format!(r#"{SELECT_OFFERS} WHERE is_active = 1 ORDER BY "order" ASC, rowid ASC"#);
        let records = cancellable(cancel, self.fetch(&sql)).await?;

        Ok(map_listing(records))
    }

    /// Gets an offer by its id.
    ///
    /// ## Returns
    /// * `Ok(Some(OfferView))` - Offer found
    /// * `Ok(None)` - No offer with that id
    /// * `Err(DbError::Mapping)` - Offer found but its stored form is invalid
    pub async fn get_by_id(
        &self,
        id: &str,
        cancel: &CancellationToken,
    ) -> DbResult<Option<OfferView>> {
        debug!(id = %id, "Getting offer by id");

        let sql = format!("{SELECT_OFFERS} WHERE id = ?1");
        let record = cancellable(cancel, async {
            let record = sqlx::query_as::<_, OfferRecord>(&sql)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(record)
        })
        .await?;

        match record {
            Some(record) => Ok(Some(mapping::to_public(&record)?)),
            None => Ok(None),
        }
    }

    /// Returns the raw stored rows, unmapped, in listing order.
    pub async fn fetch_records(&self) -> DbResult<Vec<OfferRecord>> {
        self.fetch(&format!(r#"{SELECT_OFFERS} ORDER BY "order" ASC, rowid ASC"#))
            .await
    }

    /// Counts stored offers.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM special_offers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn fetch(&self, sql: &str) -> DbResult<Vec<OfferRecord>> {
        let records = sqlx::query_as::<_, OfferRecord>(sql)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = records.len(), "Fetched offer rows");
        Ok(records)
    }
}

/// Inserts one stored offer row.
///
/// Used by the seeder inside its transaction.
pub(crate) async fn insert_record(conn: &mut SqliteConnection, record: &OfferRecord) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO special_offers (
            id, type, title, description, image_url, image_alt,
            display_config, timer, "order", is_active, metadata,
            created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        "#,
    )
    .bind(&record.id)
    .bind(&record.offer_type)
    .bind(&record.title)
    .bind(&record.description)
    .bind(&record.image_url)
    .bind(&record.image_alt)
    .bind(&record.display_config)
    .bind(&record.timer)
    .bind(record.order)
    .bind(record.is_active)
    .bind(&record.metadata)
    .bind(record.created_at)
    .bind(record.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

fn map_listing(records: Vec<OfferRecord>) -> Vec<OfferView> {
    records
        .iter()
        .filter_map(|record| match mapping::to_public(record) {
            Ok(view) => Some(view),
            Err(e) => {
                warn!(
                    id = %e.record_id(),
                    field = e.field(),
                    error = %e,
                    "Skipping offer that failed to map"
                );
                None
            }
        })
        .collect()
}
