//! # Special Offer Model
//!
//! Typed, variant-aware representation of a promotional offer.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Offer Types                                     │
//! │                                                                         │
//! │  OfferView (public, camelCase)        OfferRecord (stored row)          │
//! │  ─────────────────────────────        ───────────────────────           │
//! │  offer_type: OfferType       ◄──────► type: "PercentageDiscount"        │
//! │  display_config: DisplayConfig ◄────► display_config: TEXT (JSON)       │
//! │  timer: Option<Timer>        ◄──────► timer: TEXT NULL (JSON)           │
//! │  metadata: Option<Metadata>  ◄──────► metadata: TEXT NULL (JSON)        │
//! │                                                                         │
//! │  DisplayConfig.layout: Layout                                           │
//! │  ├── ImageOnly                                                          │
//! │  ├── ImageWithContent(ImageWithContentConfig)                           │
//! │  └── Overlay(OverlayConfig)                                             │
//! │                                                                         │
//! │  Timer                                                                  │
//! │  ├── Countdown(CountdownTimer)   end date + show* flags                 │
//! │  ├── DateRange(DateRangeTimer)   start + end date                       │
//! │  └── None                                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stable Tag Strings
//! Every enum serializes to a fixed lowercase/camelCase string, never to its
//! position, so appending a variant never changes what is already stored.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{LayoutMismatch, UnknownOfferType};

// =============================================================================
// Offer Type
// =============================================================================

/// The kind of promotion an offer represents.
///
/// Public JSON uses camelCase (`"buyGet"`); the `type` column stores the
/// PascalCase variant name (`"BuyGet"`), see [`OfferType::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum OfferType {
    PercentageDiscount,
    FixedDiscount,
    BuyGet,
    LimitedOffer,
    SeasonalSale,
    NewArrival,
}

impl OfferType {
    /// All offer types, in declaration order.
    pub const ALL: [OfferType; 6] = [
        OfferType::PercentageDiscount,
        OfferType::FixedDiscount,
        OfferType::BuyGet,
        OfferType::LimitedOffer,
        OfferType::SeasonalSale,
        OfferType::NewArrival,
    ];

    /// Returns the name stored in the `type` column.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OfferType::PercentageDiscount => "PercentageDiscount",
            OfferType::FixedDiscount => "FixedDiscount",
            OfferType::BuyGet => "BuyGet",
            OfferType::LimitedOffer => "LimitedOffer",
            OfferType::SeasonalSale => "SeasonalSale",
            OfferType::NewArrival => "NewArrival",
        }
    }
}

impl fmt::Display for OfferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OfferType {
    type Err = UnknownOfferType;

    /// Parses the stored type name. Matching is exact.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OfferType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownOfferType(s.to_string()))
    }
}

// =============================================================================
// Display Config
// =============================================================================

/// Card size class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum CardSize {
    Small,
    Medium,
    Large,
}

/// Which side of the card the image sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ImagePosition {
    Left,
    Right,
}

/// Layout discriminant as it appears in the `layout` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum LayoutTag {
    ImageOnly,
    ImageWithContent,
    Overlay,
}

impl LayoutTag {
    /// Returns the serialized tag string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            LayoutTag::ImageOnly => "imageOnly",
            LayoutTag::ImageWithContent => "imageWithContent",
            LayoutTag::Overlay => "overlay",
        }
    }
}

/// Settings for the overlay layout (content drawn over the image).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OverlayConfig {
    /// top, center, bottom
    pub content_position: String,
    /// left, center, right
    pub content_align: String,
    /// Dimming of the image, 0.0..=1.0.
    pub overlay_opacity: f64,
    /// RGB triple without parentheses, e.g. `"0, 0, 0"`.
    pub overlay_color: String,
}

/// Settings for the side-by-side image and content layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ImageWithContentConfig {
    pub image_position: ImagePosition,
    /// Image width in percent, 0..=100.
    pub image_width: u8,
}

/// Card layout together with the settings only that layout uses.
#[derive(Debug, Clone, PartialEq)]
pub enum Layout {
    ImageOnly,
    ImageWithContent(ImageWithContentConfig),
    Overlay(OverlayConfig),
}

impl Layout {
    /// Returns the discriminant written to the `layout` field.
    pub fn tag(&self) -> LayoutTag {
        match self {
            Layout::ImageOnly => LayoutTag::ImageOnly,
            Layout::ImageWithContent(_) => LayoutTag::ImageWithContent,
            Layout::Overlay(_) => LayoutTag::Overlay,
        }
    }

    /// Returns the overlay settings when this is an overlay layout.
    pub fn overlay(&self) -> Option<&OverlayConfig> {
        match self {
            Layout::Overlay(config) => Some(config),
            _ => None,
        }
    }

    /// Returns the image/content settings when this is an image-with-content layout.
    pub fn image_with_content(&self) -> Option<&ImageWithContentConfig> {
        match self {
            Layout::ImageWithContent(config) => Some(config),
            _ => None,
        }
    }
}

/// How an offer card is drawn.
///
/// Serialized through [`DisplayConfigWire`], which keeps the flat storage
/// shape: a `layout` tag plus `overlayConfig` / `imageWithContentConfig`
/// siblings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DisplayConfigWire", into = "DisplayConfigWire")]
pub struct DisplayConfig {
    pub background_color: String,
    pub text_color: String,
    /// Accent for buttons and badges.
    pub accent_color: String,
    pub size: CardSize,
    pub show_gradient: bool,
    /// top, bottom, overlay
    pub timer_position: Option<String>,
    pub layout: Layout,
}

/// Stored/public JSON shape of [`DisplayConfig`].
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, rename = "DisplayConfig")]
#[serde(rename_all = "camelCase")]
pub struct DisplayConfigWire {
    pub background_color: String,
    pub text_color: String,
    pub accent_color: String,
    pub size: CardSize,
    #[serde(default)]
    pub show_gradient: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer_position: Option<String>,
    pub layout: LayoutTag,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlay_config: Option<OverlayConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_with_content_config: Option<ImageWithContentConfig>,
}

const OVERLAY_FIELD: &str = "overlayConfig";
const IMAGE_WITH_CONTENT_FIELD: &str = "imageWithContentConfig";

impl TryFrom<DisplayConfigWire> for DisplayConfig {
    type Error = LayoutMismatch;

    /// Exactly the sub-structure named by the tag must be present; a missing
    /// one and one belonging to another tag are both rejected.
    fn try_from(wire: DisplayConfigWire) -> Result<Self, Self::Error> {
        let tag = wire.layout.as_str();
        let missing = |field| LayoutMismatch::Missing { layout: tag, field };
        let foreign = |field| LayoutMismatch::Foreign { layout: tag, field };

        let layout = match (wire.layout, wire.overlay_config, wire.image_with_content_config) {
            (LayoutTag::ImageOnly, None, None) => Layout::ImageOnly,
            (LayoutTag::ImageWithContent, None, Some(config)) => Layout::ImageWithContent(config),
            (LayoutTag::ImageWithContent, None, None) => {
                return Err(missing(IMAGE_WITH_CONTENT_FIELD))
            }
            (LayoutTag::Overlay, Some(config), None) => Layout::Overlay(config),
            (LayoutTag::Overlay, None, None) => return Err(missing(OVERLAY_FIELD)),
            (LayoutTag::Overlay, _, Some(_)) => return Err(foreign(IMAGE_WITH_CONTENT_FIELD)),
            (_, Some(_), _) => return Err(foreign(OVERLAY_FIELD)),
            (LayoutTag::ImageOnly, None, Some(_)) => {
                return Err(foreign(IMAGE_WITH_CONTENT_FIELD))
            }
        };

        Ok(DisplayConfig {
            background_color: wire.background_color,
            text_color: wire.text_color,
            accent_color: wire.accent_color,
            size: wire.size,
            show_gradient: wire.show_gradient,
            timer_position: wire.timer_position,
            layout,
        })
    }
}

impl From<DisplayConfig> for DisplayConfigWire {
    fn from(config: DisplayConfig) -> Self {
        let layout = config.layout.tag();
        let (overlay_config, image_with_content_config) = match config.layout {
            Layout::ImageOnly => (None, None),
            Layout::ImageWithContent(c) => (None, Some(c)),
            Layout::Overlay(c) => (Some(c), None),
        };

        DisplayConfigWire {
            background_color: config.background_color,
            text_color: config.text_color,
            accent_color: config.accent_color,
            size: config.size,
            show_gradient: config.show_gradient,
            timer_position: config.timer_position,
            layout,
            overlay_config,
            image_with_content_config,
        }
    }
}

// =============================================================================
// Timer
// =============================================================================

/// Countdown to a fixed end date.
///
/// The `show_*` flags are independent; an absent flag stays absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CountdownTimer {
    #[ts(as = "String")]
    pub end_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_days: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_hours: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_minutes: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_seconds: Option<bool>,
}

/// Validity period of an offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeTimer {
    #[ts(as = "String")]
    pub start_date: DateTime<Utc>,
    #[ts(as = "String")]
    pub end_date: DateTime<Utc>,
}

/// Offer timer, discriminated by its `type` field.
///
/// ```json
/// {"type": "countdown", "endDate": "2025-12-31T23:59:59Z", "showDays": true}
/// {"type": "dateRange", "startDate": "...", "endDate": "..."}
/// {"type": "none"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Timer {
    Countdown(CountdownTimer),
    DateRange(DateRangeTimer),
    /// No timer is shown. Any date fields next to this tag are ignored.
    None,
}

// =============================================================================
// Metadata
// =============================================================================

/// Type-dependent extra data.
///
/// Which fields matter depends on the offer type (percent for
/// PercentageDiscount, amount + original price for FixedDiscount, ...), but
/// every field is optional and any combination round-trips untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_percent: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buy_quantity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get_quantity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_left: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_items: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub category_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub product_id: Option<Uuid>,
}

// =============================================================================
// Offer View / Record
// =============================================================================

/// Public representation of a special offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OfferView {
    pub id: String,
    #[serde(rename = "type")]
    pub offer_type: OfferType,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_alt: Option<String>,
    #[ts(as = "DisplayConfigWire")]
    pub display_config: DisplayConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer: Option<Timer>,
    pub order: i64,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A `special_offers` row exactly as stored.
///
/// The three blob columns hold JSON text produced by [`crate::codec`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OfferRecord {
    pub id: String,
    /// PascalCase `OfferType` name.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "type"))]
    pub offer_type: String,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub image_alt: Option<String>,
    pub display_config: String,
    pub timer: Option<String>,
    pub order: i64,
    pub is_active: bool,
    pub metadata: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offer_type_storage_names_parse_back() {
        for t in OfferType::ALL {
            assert_eq!(t.as_str().parse::<OfferType>().unwrap(), t);
        }
    }

    #[test]
    fn test_offer_type_parse_is_exact() {
        assert!("buyGet".parse::<OfferType>().is_err());
        assert!("BUYGET".parse::<OfferType>().is_err());
        assert_eq!(
            "Clearance".parse::<OfferType>().unwrap_err(),
            UnknownOfferType("Clearance".into())
        );
    }

    #[test]
    fn test_offer_type_public_json_is_camel_case() {
        let json = serde_json::to_string(&OfferType::PercentageDiscount).unwrap();
        assert_eq!(json, "\"percentageDiscount\"");
    }

    #[test]
    fn test_layout_accessors() {
        let overlay = Layout::Overlay(OverlayConfig {
            content_position: "bottom".into(),
            content_align: "left".into(),
            overlay_opacity: 0.7,
            overlay_color: "0, 0, 0".into(),
        });
        assert_eq!(overlay.tag(), LayoutTag::Overlay);
        assert!(overlay.overlay().is_some());
        assert!(overlay.image_with_content().is_none());

        assert_eq!(Layout::ImageOnly.tag().as_str(), "imageOnly");
    }

    #[test]
    fn test_wire_conversion_rejects_foreign_sub_structure() {
        let wire = DisplayConfigWire {
            background_color: "#000".into(),
            text_color: "#fff".into(),
            accent_color: "#f00".into(),
            size: CardSize::Small,
            show_gradient: false,
            timer_position: None,
            layout: LayoutTag::ImageOnly,
            overlay_config: Some(OverlayConfig {
                content_position: "top".into(),
                content_align: "center".into(),
                overlay_opacity: 0.5,
                overlay_color: "1, 2, 3".into(),
            }),
            image_with_content_config: None,
        };

        let err = DisplayConfig::try_from(wire).unwrap_err();
        assert_eq!(
            err,
            LayoutMismatch::Foreign {
                layout: "imageOnly",
                field: "overlayConfig"
            }
        );
    }

    #[test]
    fn test_wire_conversion_rejects_both_sub_structures() {
        let wire = DisplayConfigWire {
            background_color: "#000".into(),
            text_color: "#fff".into(),
            accent_color: "#f00".into(),
            size: CardSize::Medium,
            show_gradient: false,
            timer_position: None,
            layout: LayoutTag::Overlay,
            overlay_config: Some(OverlayConfig {
                content_position: "top".into(),
                content_align: "center".into(),
                overlay_opacity: 0.5,
                overlay_color: "1, 2, 3".into(),
            }),
            image_with_content_config: Some(ImageWithContentConfig {
                image_position: ImagePosition::Left,
                image_width: 40,
            }),
        };

        let err = DisplayConfig::try_from(wire).unwrap_err();
        assert!(matches!(
            err,
            LayoutMismatch::Foreign {
                field: "imageWithContentConfig",
                ..
            }
        ));
    }

    #[test]
    fn test_wire_conversion_requires_tagged_sub_structure() {
        let wire = DisplayConfigWire {
            background_color: "#000".into(),
            text_color: "#fff".into(),
            accent_color: "#f00".into(),
            size: CardSize::Large,
            show_gradient: true,
            timer_position: Some("bottom".into()),
            layout: LayoutTag::ImageWithContent,
            overlay_config: None,
            image_with_content_config: None,
        };

        let err = DisplayConfig::try_from(wire).unwrap_err();
        assert_eq!(
            err,
            LayoutMismatch::Missing {
                layout: "imageWithContent",
                field: "imageWithContentConfig"
            }
        );
    }
}
