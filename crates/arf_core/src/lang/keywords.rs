//! Define the reserved keyword vocabulary for the arf IDL.
//!
//! This module is the single source of truth for language keywords: a stable identifier ([`KeywordId`]) plus a
//! const metadata table ([`KEYWORDS`]) that records canonical spellings and categories.
//!
//! ## Notes
//! - Lookup via [`from_str`] is **case-sensitive**.
//! - Primitive type names (`int32`, `string`, ...) are reserved too, but they live in
//!   [`crate::lang::primitives`] because the parser treats them as types, not as keywords. Use
//!   [`crate::lang::conventions::is_reserved`] for the combined table.
//!
//! ## Examples
//! ```rust
//! use arf_core::lang::keywords::{self, KeywordId};
//!
//! assert_eq!(keywords::from_str("struct"), Some(KeywordId::Struct));
//! assert_eq!(keywords::as_str(KeywordId::Struct), "struct");
//! assert_eq!(keywords::from_str("Struct"), None);
//! ```

/// Stable identifier for every language keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordId {
    // Module structure
    Package,
    Import,
    As,

    // Declarations
    Struct,
    Enum,
    Union,
    Service,

    // Type constructors / modifiers
    Stream,
    Map,
    Array,
    Optional,
}

/// High-level grouping for documentation and tooling.
///
/// ## Notes
/// - Categories are metadata only; they do not enforce parsing context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordCategory {
    /// `package`, `import`, `as`.
    Module,
    /// Keywords that open a declaration body.
    Declaration,
    /// Keywords that start a type expression.
    Type,
}

/// Metadata for a keyword.
#[derive(Debug, Clone, Copy)]
pub struct KeywordInfo {
    pub id: KeywordId,
    pub canonical: &'static str,
    pub category: KeywordCategory,
}

/// Registry of all keywords.
///
/// ## Notes
/// - The ordering is not semantically meaningful, but is grouped for readability.
pub const KEYWORDS: &[KeywordInfo] = &[
    // Module structure
    info(KeywordId::Package, "package", KeywordCategory::Module),
    info(KeywordId::Import, "import", KeywordCategory::Module),
    info(KeywordId::As, "as", KeywordCategory::Module),
    // Declarations
    info(KeywordId::Struct, "struct", KeywordCategory::Declaration),
    info(KeywordId::Enum, "enum", KeywordCategory::Declaration),
    info(KeywordId::Union, "union", KeywordCategory::Declaration),
    info(KeywordId::Service, "service", KeywordCategory::Declaration),
    // Type constructors / modifiers
    info(KeywordId::Stream, "stream", KeywordCategory::Type),
    info(KeywordId::Map, "map", KeywordCategory::Type),
    info(KeywordId::Array, "array", KeywordCategory::Type),
    info(KeywordId::Optional, "optional", KeywordCategory::Type),
];

/// Canonical spelling.
pub fn as_str(id: KeywordId) -> &'static str {
    info_for(id).canonical
}

/// Category.
pub fn category(id: KeywordId) -> KeywordCategory {
    info_for(id).category
}

/// Full metadata.
///
/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: KeywordId) -> &'static KeywordInfo {
    KEYWORDS.iter().find(|k| k.id == id).expect("keyword info missing")
}

/// Lookup by spelling.
///
/// ## Returns
/// - `Some(KeywordId)` if the spelling matches this registry.
/// - `None` otherwise.
pub fn from_str(s: &str) -> Option<KeywordId> {
    KEYWORDS.iter().find(|k| k.canonical == s).map(|k| k.id)
}

// --- helpers -----------------------------------------------------------------

const fn info(id: KeywordId, canonical: &'static str, category: KeywordCategory) -> KeywordInfo {
    KeywordInfo { id, canonical, category }
}
