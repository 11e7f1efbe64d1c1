//! # Category Repository
//!
//! Categories with their image galleries.

use std::collections::HashMap;

use sqlx::{SqliteConnection, SqlitePool};
use storefront_core::{mapping, CategoryImageRecord, CategoryRecord, CategoryView};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::cancellable;
use crate::error::DbResult;

/// Repository for category reads.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists every category ordered by `"order"`, then insertion order,
    /// each with its images ordered by image `"order"`.
    pub async fn list_all(&self, cancel: &CancellationToken) -> DbResult<Vec<CategoryView>> {
        debug!("Listing categories");

        let (categories, images) = cancellable(cancel, self.fetch_all()).await?;

        let mut by_category: HashMap<String, Vec<CategoryImageRecord>> = HashMap::new();
        for image in images {
            by_category
                .entry(image.category_id.clone())
                .or_default()
                .push(image);
        }

        let views = categories
            .into_iter()
            .map(|category| {
                let images = by_category.remove(&category.id).unwrap_or_default();
                mapping::category_to_public(category, images)
            })
            .collect::<Vec<_>>();

        debug!(count = views.len(), "Listed categories");
        Ok(views)
    }

    /// Counts stored categories.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn fetch_all(&self) -> DbResult<(Vec<CategoryRecord>, Vec<CategoryImageRecord>)> {
        let categories = sqlx::query_as::<_, CategoryRecord>(
            r#"
            SELECT
                id, name, description, color, icon_url, icon_alt,
                background_url, background_alt, "order", created_at, updated_at
            FROM categories
            ORDER BY "order" ASC, rowid ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let images = sqlx::query_as::<_, CategoryImageRecord>(
            r#"
            SELECT id, category_id, url, alt, "order"
            FROM category_images
            ORDER BY category_id, "order" ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok((categories, images))
    }
}

/// Inserts a category row and its image rows.
///
/// Used by the seeder inside its transaction.
pub(crate) async fn insert_category(
    conn: &mut SqliteConnection,
    category: &CategoryRecord,
    images: &[CategoryImageRecord],
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO categories (
            id, name, description, color, icon_url, icon_alt,
            background_url, background_alt, "order", created_at, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&category.id)
    .bind(&category.name)
    .bind(&category.description)
    .bind(&category.color)
    .bind(&category.icon_url)
    .bind(&category.icon_alt)
    .bind(&category.background_url)
    .bind(&category.background_alt)
    .bind(category.order)
    .bind(category.created_at)
    .bind(category.updated_at)
    .execute(&mut *conn)
    .await?;

    for image in images {
        sqlx::query(
            r#"
            INSERT INTO category_images (id, category_id, url, alt, "order")
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&image.id)
        .bind(&image.category_id)
        .bind(&image.url)
        .bind(&image.alt)
        .bind(image.order)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}
