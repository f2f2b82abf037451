//! Primitive scalar types of the arf IDL.
//!
//! Primitive names are ordinary identifiers at the lexical level: the parser recognises them in type position
//! through [`from_str`]. They are still reserved, so no field, option or declaration may use them as a name.
//!
//! ## Examples
//! ```rust
//! use arf_core::lang::primitives::{self, PrimitiveId};
//!
//! assert_eq!(primitives::from_str("uint64"), Some(PrimitiveId::Uint64));
//! assert!(primitives::is_legal_map_key(PrimitiveId::String));
//! assert!(!primitives::is_legal_map_key(PrimitiveId::Bytes));
//! ```

/// Stable identifier for every primitive type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveId {
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    Bool,
    String,
    Bytes,
    Timestamp,
}

/// Broad grouping used by docs and code generators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveFamily {
    SignedInt,
    UnsignedInt,
    Float,
    Bool,
    Text,
    Binary,
    Time,
}

/// Metadata for a primitive type.
#[derive(Debug, Clone, Copy)]
pub struct PrimitiveInfo {
    pub id: PrimitiveId,
    pub canonical: &'static str,
    pub family: PrimitiveFamily,
    /// Whether the type may be used as a `map<K, V>` key.
    pub map_key: bool,
}

/// Registry of all primitive types.
pub const PRIMITIVES: &[PrimitiveInfo] = &[
    info(PrimitiveId::Int8, "int8", PrimitiveFamily::SignedInt, true),
    info(PrimitiveId::Int16, "int16", PrimitiveFamily::SignedInt, true),
    info(PrimitiveId::Int32, "int32", PrimitiveFamily::SignedInt, true),
    info(PrimitiveId::Int64, "int64", PrimitiveFamily::SignedInt, true),
    info(PrimitiveId::Uint8, "uint8", PrimitiveFamily::UnsignedInt, true),
    info(PrimitiveId::Uint16, "uint16", PrimitiveFamily::UnsignedInt, true),
    info(PrimitiveId::Uint32, "uint32", PrimitiveFamily::UnsignedInt, true),
    info(PrimitiveId::Uint64, "uint64", PrimitiveFamily::UnsignedInt, true),
    info(PrimitiveId::Float32, "float32", PrimitiveFamily::Float, true),
    info(PrimitiveId::Float64, "float64", PrimitiveFamily::Float, true),
    info(PrimitiveId::Bool, "bool", PrimitiveFamily::Bool, true),
    info(PrimitiveId::String, "string", PrimitiveFamily::Text, true),
    // Byte blobs have no stable equality/hash representation across targets.
    info(PrimitiveId::Bytes, "bytes", PrimitiveFamily::Binary, false),
    info(PrimitiveId::Timestamp, "timestamp", PrimitiveFamily::Time, true),
];

/// Canonical spelling.
pub fn as_str(id: PrimitiveId) -> &'static str {
    info_for(id).canonical
}

/// Whether `id` may be used as a map key.
pub fn is_legal_map_key(id: PrimitiveId) -> bool {
    info_for(id).map_key
}

/// Full metadata.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: PrimitiveId) -> &'static PrimitiveInfo {
    PRIMITIVES.iter().find(|p| p.id == id).expect("primitive info missing")
}

/// Lookup by spelling (case-sensitive).
pub fn from_str(s: &str) -> Option<PrimitiveId> {
    PRIMITIVES.iter().find(|p| p.canonical == s).map(|p| p.id)
}

// --- helpers -----------------------------------------------------------------

const fn info(id: PrimitiveId, canonical: &'static str, family: PrimitiveFamily, map_key: bool) -> PrimitiveInfo {
    PrimitiveInfo {
        id,
        canonical,
        family,
        map_key,
    }
}
