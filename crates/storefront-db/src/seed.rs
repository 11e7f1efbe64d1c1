//! # Reference Data Seeder
//!
//! Inserts the fixed storefront catalog (categories, their images, special
//! offers) into an empty database.
//!
//! ## Seeding Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      seed_categories / seed_offers                      │
//! │                                                                         │
//! │  COUNT(*) > 0 ? ──yes──► log "already seeded", return 0                 │
//! │       │ no                                                              │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │    INSERT every row of the embedded catalog                             │
//! │  COMMIT ──► return rows inserted                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The catalog is `seed/catalog.json`, embedded at compile time. Offers go
//! through `mapping::to_stored`, so every stored blob is codec output.
//!
//! There is no lock between the emptiness check and the inserts: two
//! processes seeding the same empty file at once can both insert.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;
use storefront_core::{
    mapping, CategoryView, DisplayConfig, Metadata, OfferType, OfferView, Timer,
};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::category::{insert_category, CategoryRepository};
use crate::repository::offer::{insert_record, OfferRepository};

static CATALOG_JSON: &str = include_str!("../seed/catalog.json");

// =============================================================================
// Seed Catalog
// =============================================================================

/// Offer entry as written in the seed file (timestamps are assigned at
/// seed time).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedOffer {
    id: String,
    #[serde(rename = "type")]
    offer_type: OfferType,
    title: String,
    description: String,
    image_url: Option<String>,
    image_alt: Option<String>,
    display_config: DisplayConfig,
    timer: Option<Timer>,
    order: i64,
    is_active: bool,
    metadata: Option<Metadata>,
}

impl SeedOffer {
    fn into_view(self, now: DateTime<Utc>) -> OfferView {
        OfferView {
            id: self.id,
            offer_type: self.offer_type,
            title: self.title,
            description: self.description,
            image_url: self.image_url,
            image_alt: self.image_alt,
            display_config: self.display_config,
            timer: self.timer,
            order: self.order,
            is_active: self.is_active,
            metadata: self.metadata,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SeedFile {
    categories: Vec<CategoryView>,
    offers: Vec<SeedOffer>,
}

/// The parsed reference data set.
#[derive(Debug, Clone)]
pub struct SeedCatalog {
    pub categories: Vec<CategoryView>,
    pub offers: Vec<OfferView>,
}

impl SeedCatalog {
    /// Parses the embedded catalog, stamping offers with `now`.
    pub fn load(now: DateTime<Utc>) -> DbResult<Self> {
        let file: SeedFile = serde_json::from_str(CATALOG_JSON)
            .map_err(|e| DbError::Internal(format!("embedded seed catalog is invalid: {e}")))?;

        Ok(SeedCatalog {
            categories: file.categories,
            offers: file
                .offers
                .into_iter()
                .map(|offer| offer.into_view(now))
                .collect(),
        })
    }
}

// =============================================================================
// Seeder
// =============================================================================

/// Rows inserted by [`Seeder::seed_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub categories: u64,
    pub offers: u64,
}

impl SeedReport {
    /// True when nothing was inserted (both collections already had data).
    pub fn is_noop(&self) -> bool {
        self.categories == 0 && self.offers == 0
    }
}

/// Seeds reference data into empty collections.
#[derive(Debug, Clone)]
pub struct Seeder {
    pool: SqlitePool,
}

impl Seeder {
    /// Creates a new Seeder.
    pub fn new(pool: SqlitePool) -> Self {
        Seeder { pool }
    }

    /// Seeds categories and offers.
    pub async fn seed_all(&self) -> DbResult<SeedReport> {
        let report = SeedReport {
            categories: self.seed_categories().await?,
            offers: self.seed_offers().await?,
        };

        info!(
            categories = report.categories,
            offers = report.offers,
            "Seeding finished"
        );
        Ok(report)
    }

    /// Inserts the reference categories and their images.
    ///
    /// ## Returns
    /// Number of categories inserted; 0 when categories already exist.
    pub async fn seed_categories(&self) -> DbResult<u64> {
        let existing = CategoryRepository::new(self.pool.clone()).count().await?;
        if existing > 0 {
            info!(existing, "Categories already present, skipping seed");
            return Ok(0);
        }

        let now = Utc::now();
        let catalog = SeedCatalog::load(now)?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let mut inserted = 0;
        for view in &catalog.categories {
            let (category, images) = mapping::category_to_stored(view, now);
            insert_category(&mut tx, &category, &images).await?;
            debug!(id = %category.id, images = images.len(), "Seeded category");
            inserted += 1;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(count = inserted, "Seeded categories");
        Ok(inserted)
    }

    /// Inserts the reference special offers.
    ///
    /// ## Returns
    /// Number of offers inserted; 0 when offers already exist.
    pub async fn seed_offers(&self) -> DbResult<u64> {
        let existing = OfferRepository::new(self.pool.clone()).count().await?;
        if existing > 0 {
            info!(existing, "Special offers already present, skipping seed");
            return Ok(0);
        }

        let catalog = SeedCatalog::load(Utc::now())?;

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let mut inserted = 0;
        for view in &catalog.offers {
            let record = mapping::to_stored(view)?;
            insert_record(&mut tx, &record).await?;
            debug!(id = %record.id, offer_type = %record.offer_type, "Seeded offer");
            inserted += 1;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(count = inserted, "Seeded special offers");
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::Layout;

    #[test]
    fn test_embedded_catalog_parses() {
        let catalog = SeedCatalog::load(Utc::now()).unwrap();

        assert_eq!(catalog.categories.len(), 13);
        assert_eq!(catalog.offers.len(), 5);

        let tools = catalog
            .categories
            .iter()
            .find(|c| c.name == "Инструменты")
            .unwrap();
        assert_eq!(tools.images.len(), 3);
        assert!(tools.background_url.is_some());
    }

    #[test]
    fn test_catalog_covers_every_layout_and_timer() {
        let catalog = SeedCatalog::load(Utc::now()).unwrap();
        let layouts: Vec<_> = catalog
            .offers
            .iter()
            .map(|o| o.display_config.layout.tag())
            .collect();
        let timers: Vec<_> = catalog.offers.iter().map(|o| o.timer.clone()).collect();

        assert!(matches!(catalog.offers[0].display_config.layout, Layout::Overlay(_)));
        assert!(layouts.contains(&storefront_core::LayoutTag::ImageWithContent));
        assert!(layouts.contains(&storefront_core::LayoutTag::ImageOnly));
        assert!(timers.contains(&Some(Timer::None)));
        assert!(catalog.offers[4].metadata.is_none());
        assert!(catalog.offers[4].display_config.timer_position.is_none());
    }

    #[test]
    fn test_catalog_offers_round_trip_through_storage() {
        let catalog = SeedCatalog::load(Utc::now()).unwrap();
        for offer in &catalog.offers {
            let record = mapping::to_stored(offer).unwrap();
            assert_eq!(&mapping::to_public(&record).unwrap(), offer);
        }
    }
}
