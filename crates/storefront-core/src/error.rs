//! # Error Types
//!
//! Error types for the variant codec and the mapping layer.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                    │
//! │  ├── CodecError    - A single blob failed to encode/decode             │
//! │  └── MappingError  - A whole offer record failed to map                │
//! │                                                                         │
//! │  storefront-db errors (separate crate)                                 │
//! │  └── DbError       - Database operation failures                       │
//! │                                                                         │
//! │  storefront-api errors (in app)                                        │
//! │  └── ApiError      - What callers see (serialized)                     │
//! │                                                                         │
//! │  Flow: CodecError → MappingError → DbError → ApiError → Caller         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Per-Record Policy
//! A `MappingError` describes one bad row. Listings log it and drop that row;
//! they never fail the whole request because of it.

use std::fmt;

use thiserror::Error;

// =============================================================================
// Blob Kind
// =============================================================================

/// Which variant blob column a codec operation worked on.
///
/// `Display` prints the storage column name so log lines point straight at
/// the offending column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobKind {
    DisplayConfig,
    Timer,
    Metadata,
}

impl BlobKind {
    /// Returns the snake_case column name that stores this blob.
    pub const fn column(&self) -> &'static str {
        match self {
            BlobKind::DisplayConfig => "display_config",
            BlobKind::Timer => "timer",
            BlobKind::Metadata => "metadata",
        }
    }
}

impl fmt::Display for BlobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// =============================================================================
// Codec Error
// =============================================================================

/// Variant codec errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    /// The stored blob could not be decoded.
    ///
    /// ## When This Occurs
    /// - Blob is not syntactically valid JSON
    /// - Tag field (`layout`, `type`) is missing or not a known value
    /// - A field required by the active variant is missing
    #[error("malformed {kind} payload: {reason}")]
    MalformedPayload { kind: BlobKind, reason: String },

    /// A typed value could not be serialized.
    #[error("failed to encode {kind}: {reason}")]
    Encode { kind: BlobKind, reason: String },
}

impl CodecError {
    /// Returns the blob kind this error refers to.
    pub fn kind(&self) -> BlobKind {
        match self {
            CodecError::MalformedPayload { kind, .. } | CodecError::Encode { kind, .. } => *kind,
        }
    }
}

// =============================================================================
// Mapping Error
// =============================================================================

/// Errors converting between a stored offer row and its public view.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MappingError {
    /// The stored type string does not name a known `OfferType`.
    #[error("offer {id}: unknown offer type '{value}'")]
    UnknownOfferType { id: String, value: String },

    /// One of the offer's stored blobs failed to decode.
    #[error("offer {id}: {source}")]
    MalformedPayload {
        id: String,
        #[source]
        source: CodecError,
    },

    /// One of the offer's typed values failed to encode for storage.
    #[error("offer {id}: {source}")]
    Encode {
        id: String,
        #[source]
        source: CodecError,
    },
}

impl MappingError {
    /// Returns the identifier of the record that failed to map.
    pub fn record_id(&self) -> &str {
        match self {
            MappingError::UnknownOfferType { id, .. }
            | MappingError::MalformedPayload { id, .. }
            | MappingError::Encode { id, .. } => id,
        }
    }

    /// Returns the column at fault, or `"type"` for an unknown offer type.
    pub fn field(&self) -> &'static str {
        match self {
            MappingError::UnknownOfferType { .. } => "type",
            MappingError::MalformedPayload { source, .. } | MappingError::Encode { source, .. } => {
                source.kind().column()
            }
        }
    }
}

/// Parse error for `OfferType`'s `FromStr`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown offer type: '{0}'")]
pub struct UnknownOfferType(pub String);

/// Raised by the `DisplayConfig` wire conversion when the sub-structures
/// present don't agree with the layout tag. Surfaces as `MalformedPayload`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutMismatch {
    /// The tag's own sub-structure is absent.
    #[error("layout '{layout}' requires '{field}'")]
    Missing {
        layout: &'static str,
        field: &'static str,
    },

    /// A sub-structure belonging to another layout is present.
    #[error("layout '{layout}' does not allow '{field}'")]
    Foreign {
        layout: &'static str,
        field: &'static str,
    },
}
