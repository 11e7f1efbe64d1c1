//! # Mapping Layer
//!
//! Pure conversion between stored rows and public views.
//!
//! ```text
//!   OfferRecord ──── to_public ────► OfferView
//!   (TEXT blobs)  ◄─── to_stored ───  (typed variants)
//!        │                                 │
//!        └──── codec::decode / encode ─────┘
//! ```
//!
//! `to_public(&to_stored(&view)?)? == view` holds for every view.

use crate::category::{CategoryImageRecord, CategoryImageView, CategoryRecord, CategoryView};
use crate::codec;
use crate::error::{CodecError, MappingError};
use crate::offer::{OfferRecord, OfferType, OfferView};
use chrono::{DateTime, Utc};

// =============================================================================
// Offers
// =============================================================================

/// Converts a stored offer row into its public view.
///
/// `display_config` is always decoded. `timer` and `metadata` are decoded
/// only when present and non-blank.
pub fn to_public(record: &OfferRecord) -> Result<OfferView, MappingError> {
    let malformed = |source: CodecError| MappingError::MalformedPayload {
        id: record.id.clone(),
        source,
    };

    let offer_type: OfferType =
        record
            .offer_type
            .parse()
            .map_err(|_| MappingError::UnknownOfferType {
                id: record.id.clone(),
                value: record.offer_type.clone(),
            })?;

    let display_config = codec::decode(&record.display_config).map_err(malformed)?;
    let timer = codec::decode_optional(record.timer.as_deref()).map_err(malformed)?;
    let metadata = codec::decode_optional(record.metadata.as_deref()).map_err(malformed)?;

    Ok(OfferView {
        id: record.id.clone(),
        offer_type,
        title: record.title.clone(),
        description: record.description.clone(),
        image_url: record.image_url.clone(),
        image_alt: record.image_alt.clone(),
        display_config,
        timer,
        order: record.order,
        is_active: record.is_active,
        metadata,
        created_at: record.created_at,
        updated_at: record.updated_at,
    })
}

/// Converts a public view into the row that stores it.
pub fn to_stored(view: &OfferView) -> Result<OfferRecord, MappingError> {
    let encode_failed = |source: CodecError| MappingError::Encode {
        id: view.id.clone(),
        source,
    };

    Ok(OfferRecord {
        id: view.id.clone(),
        offer_type: view.offer_type.as_str().to_string(),
        title: view.title.clone(),
        description: view.description.clone(),
        image_url: view.image_url.clone(),
        image_alt: view.image_alt.clone(),
        display_config: codec::encode(&view.display_config).map_err(encode_failed)?,
        timer: codec::encode_optional(view.timer.as_ref()).map_err(encode_failed)?,
        order: view.order,
        is_active: view.is_active,
        metadata: codec::encode_optional(view.metadata.as_ref()).map_err(encode_failed)?,
        created_at: view.created_at,
        updated_at: view.updated_at,
    })
}

// =============================================================================
// Categories
// =============================================================================

/// Builds a category view from its row and its image rows.
///
/// Images are sorted by `order`; rows from other categories are the caller's
/// responsibility to filter out.
pub fn category_to_public(record: CategoryRecord, images: Vec<CategoryImageRecord>) -> CategoryView {
    let mut images: Vec<CategoryImageView> = images.into_iter().map(Into::into).collect();
    images.sort_by_key(|image| image.order);

    CategoryView {
        id: record.id,
        name: record.name,
        description: record.description,
        color: record.color,
        icon_url: record.icon_url,
        icon_alt: record.icon_alt,
        background_url: record.background_url,
        background_alt: record.background_alt,
        order: record.order,
        images,
    }
}

/// Splits a category view into the rows that store it.
///
/// Views carry no timestamps, so the caller supplies `created_at`.
pub fn category_to_stored(
    view: &CategoryView,
    created_at: DateTime<Utc>,
) -> (CategoryRecord, Vec<CategoryImageRecord>) {
    let record = CategoryRecord {
        id: view.id.clone(),
        name: view.name.clone(),
        description: view.description.clone(),
        color: view.color.clone(),
        icon_url: view.icon_url.clone(),
        icon_alt: view.icon_alt.clone(),
        background_url: view.background_url.clone(),
        background_alt: view.background_alt.clone(),
        order: view.order,
        created_at,
        updated_at: None,
    };
    let images = view.images.iter().map(CategoryImageRecord::from).collect();

    (record, images)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BlobKind;
    use crate::offer::{
        CardSize, CountdownTimer, DisplayConfig, Layout, Metadata, OverlayConfig, Timer,
    };
    use chrono::TimeZone;

    fn view() -> OfferView {
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        OfferView {
            id: "550e8400-e29b-41d4-a716-446655440001".into(),
            offer_type: OfferType::PercentageDiscount,
            title: "Скидка 30%".into(),
            description: "На все товары".into(),
            image_url: Some("https://example.com/a.jpg".into()),
            image_alt: Some("banner".into()),
            display_config: DisplayConfig {
                background_color: "#FF6B6B".into(),
                text_color: "#FFFFFF".into(),
                accent_color: "#FFD93D".into(),
                size: CardSize::Large,
                show_gradient: true,
                timer_position: Some("bottom".into()),
                layout: Layout::Overlay(OverlayConfig {
                    content_position: "bottom".into(),
                    content_align: "left".into(),
                    overlay_opacity: 0.7,
                    overlay_color: "0, 0, 0".into(),
                }),
            },
            timer: Some(Timer::Countdown(CountdownTimer {
                end_date: Utc.with_ymd_and_hms(2025, 12, 31, 23, 59, 59).unwrap(),
                show_days: Some(true),
                show_hours: Some(true),
                show_minutes: Some(true),
                show_seconds: Some(false),
            })),
            order: 1,
            is_active: true,
            metadata: Some(Metadata {
                discount_percent: Some(30),
                ..Metadata::default()
            }),
            created_at: at,
            updated_at: at,
        }
    }

    #[test]
    fn test_round_trip_through_storage() {
        let original = view();
        let record = to_stored(&original).unwrap();
        assert_eq!(to_public(&record).unwrap(), original);
    }

    #[test]
    fn test_stored_type_is_pascal_case() {
        let record = to_stored(&view()).unwrap();
        assert_eq!(record.offer_type, "PercentageDiscount");
    }

    #[test]
    fn test_absent_optionals_store_as_null() {
        let mut v = view();
        v.timer = None;
        v.metadata = None;

        let record = to_stored(&v).unwrap();
        assert!(record.timer.is_none());
        assert!(record.metadata.is_none());
        assert_eq!(to_public(&record).unwrap(), v);
    }

    #[test]
    fn test_blank_blobs_map_to_none() {
        let mut record = to_stored(&view()).unwrap();
        record.timer = Some(String::new());
        record.metadata = Some("  ".into());

        let public = to_public(&record).unwrap();
        assert!(public.timer.is_none());
        assert!(public.metadata.is_none());
    }

    #[test]
    fn test_unknown_type_names_record() {
        let mut record = to_stored(&view()).unwrap();
        record.offer_type = "Clearance".into();

        match to_public(&record).unwrap_err() {
            MappingError::UnknownOfferType { id, value } => {
                assert_eq!(id, record.id);
                assert_eq!(value, "Clearance");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_blob_names_record_and_column() {
        let mut record = to_stored(&view()).unwrap();
        record.timer = Some("{\"type\":\"countdown\"}".into());

        let err = to_public(&record).unwrap_err();
        assert_eq!(err.record_id(), record.id);
        assert_eq!(err.field(), "timer");
        match err {
            MappingError::MalformedPayload { source, .. } => {
                assert_eq!(source.kind(), BlobKind::Timer);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_category_mapping_sorts_images_and_round_trips() {
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let record = CategoryRecord {
            id: "c1".into(),
            name: "Инструменты".into(),
            description: "Ручной и электроинструмент".into(),
            color: "orange".into(),
            icon_url: "/icons/tools.svg".into(),
            icon_alt: "tools".into(),
            background_url: None,
            background_alt: None,
            order: 3,
            created_at: at,
            updated_at: None,
        };
        let image = |id: &str, order| CategoryImageRecord {
            id: id.into(),
            category_id: "c1".into(),
            url: format!("/img/{id}.jpg"),
            alt: id.into(),
            order,
        };

        let view = category_to_public(record.clone(), vec![image("b", 2), image("a", 1)]);
        assert_eq!(
            view.images.iter().map(|i| i.id.as_str()).collect::<Vec<_>>(),
            ["a", "b"]
        );

        let (stored, images) = category_to_stored(&view, at);
        assert_eq!(stored, record);
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].category_id, "c1");
    }
}
