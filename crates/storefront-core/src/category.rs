//! # Category Model
//!
//! Product categories shown on the storefront, each with an ordered gallery
//! of images.
//!
//! ```text
//! ┌──────────────────────┐        ┌──────────────────────────┐
//! │  categories          │ 1    * │  category_images         │
//! │  ──────────────────  │───────►│  ──────────────────────  │
//! │  id, name, color     │        │  id, url, alt, order     │
//! │  icon_url, icon_alt  │        │  category_id (CASCADE)   │
//! │  background_* (NULL) │        │  UNIQUE(category, order) │
//! └──────────────────────┘        └──────────────────────────┘
//! ```
//!
//! Categories carry no variant blobs, so the record/view mapping is a plain
//! structural copy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Stored Rows
// =============================================================================

/// A `categories` row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CategoryRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Design token such as `"green"` or `"blue"`.
    pub color: String,
    pub icon_url: String,
    pub icon_alt: String,
    pub background_url: Option<String>,
    pub background_alt: Option<String>,
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A `category_images` row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CategoryImageRecord {
    pub id: String,
    pub category_id: String,
    pub url: String,
    pub alt: String,
    pub order: i64,
}

// =============================================================================
// Public Views
// =============================================================================

/// Public representation of a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub color: String,
    pub icon_url: String,
    pub icon_alt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_alt: Option<String>,
    pub order: i64,
    /// Sorted by `order`.
    #[serde(default)]
    pub images: Vec<CategoryImageView>,
}

/// Public representation of a category gallery image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CategoryImageView {
    pub id: String,
    pub url: String,
    pub alt: String,
    pub order: i64,
    pub category_id: String,
}

impl From<CategoryImageRecord> for CategoryImageView {
    fn from(record: CategoryImageRecord) -> Self {
        CategoryImageView {
            id: record.id,
            url: record.url,
            alt: record.alt,
            order: record.order,
            category_id: record.category_id,
        }
    }
}

impl From<&CategoryImageView> for CategoryImageRecord {
    fn from(view: &CategoryImageView) -> Self {
        CategoryImageRecord {
            id: view.id.clone(),
            category_id: view.category_id.clone(),
            url: view.url.clone(),
            alt: view.alt.clone(),
            order: view.order,
        }
    }
}
