//! # storefront-core: Catalog Model for the Storefront
//!
//! Pure types for categories and promotional offers, the codec for the offer
//! variant blobs, and the record/view mapping. No I/O lives here.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Storefront Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              storefront-api (CatalogService)                    │   │
//! │  │   list_categories, list_all_offers, get_offer_by_id, ...       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              storefront-db (stores, seeder, startup)            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │            ★ storefront-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   offer   │  │ category  │  │   codec   │  │  mapping  │  │   │
//! │  │   │ OfferView │  │ Category  │  │  encode   │  │ to_public │  │   │
//! │  │   │  Timer    │  │   View    │  │  decode   │  │ to_stored │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`offer`] - Offer types, display config, timer, metadata
//! - [`category`] - Category and gallery image types
//! - [`codec`] - JSON blob encode/decode for the variant columns
//! - [`mapping`] - Stored row <-> public view conversion
//! - [`error`] - Codec and mapping errors
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::codec;
//! use storefront_core::Timer;
//!
//! let blob = r#"{"type":"none","endDate":"2025-01-01T00:00:00Z"}"#;
//! let timer: Timer = codec::decode(blob).unwrap();
//! assert_eq!(timer, Timer::None);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod category;
pub mod codec;
pub mod error;
pub mod mapping;
pub mod offer;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use category::{CategoryImageRecord, CategoryImageView, CategoryRecord, CategoryView};
pub use codec::VariantBlob;
pub use error::{BlobKind, CodecError, MappingError};
pub use mapping::{category_to_public, category_to_stored, to_public, to_stored};
pub use offer::*;
