//! # Variant Codec
//!
//! Converts the three tagged-variant values of an offer to and from the JSON
//! text stored in their columns.
//!
//! ## Blob Columns
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Column           Type            Tag field   Values                    │
//! │  ──────────────   ─────────────   ─────────   ───────────────────────   │
//! │  display_config   DisplayConfig   layout      imageOnly                 │
//! │                                               imageWithContent          │
//! │                                               overlay                   │
//! │  timer            Timer           type        countdown                 │
//! │                                               dateRange                 │
//! │                                               none                      │
//! │  metadata         Metadata        (none)      flat optional fields      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//! - Encoding never writes `None` optionals or fields of an inactive variant.
//! - Decoding ignores unknown keys and fails with
//!   [`CodecError::MalformedPayload`] on invalid JSON, an absent or unknown tag,
//!   a missing field the active variant requires, or a layout sub-structure
//!   that doesn't match the layout tag.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{BlobKind, CodecError};
use crate::offer::{DisplayConfig, Metadata, Timer};

/// A value stored as a JSON blob in one offer column.
pub trait VariantBlob: Serialize + DeserializeOwned {
    const KIND: BlobKind;
}

impl VariantBlob for DisplayConfig {
    const KIND: BlobKind = BlobKind::DisplayConfig;
}

impl VariantBlob for Timer {
    const KIND: BlobKind = BlobKind::Timer;
}

impl VariantBlob for Metadata {
    const KIND: BlobKind = BlobKind::Metadata;
}

/// Serializes a value into its stored text form.
pub fn encode<T: VariantBlob>(value: &T) -> Result<String, CodecError> {
    serde_json::to_string(value).map_err(|e| CodecError::Encode {
        kind: T::KIND,
        reason: e.to_string(),
    })
}

/// Serializes an optional value; `None` stays `None` (SQL NULL).
pub fn encode_optional<T: VariantBlob>(value: Option<&T>) -> Result<Option<String>, CodecError> {
    value.map(encode::<T>).transpose()
}

/// Parses a stored blob into its typed value.
pub fn decode<T: VariantBlob>(blob: &str) -> Result<T, CodecError> {
    serde_json::from_str(blob).map_err(|e| CodecError::MalformedPayload {
        kind: T::KIND,
        reason: e.to_string(),
    })
}

/// Parses a nullable blob.
///
/// An absent, blank, or JSON `null` blob is `Ok(None)`.
pub fn decode_optional<T: VariantBlob>(blob: Option<&str>) -> Result<Option<T>, CodecError> {
    match blob.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => serde_json::from_str::<Option<T>>(text).map_err(|e| {
            CodecError::MalformedPayload {
                kind: T::KIND,
                reason: e.to_string(),
            }
        }),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
