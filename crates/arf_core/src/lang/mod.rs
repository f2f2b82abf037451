//! arf language vocabulary registries.
//!
//! This module is the "front door" for language-level vocabulary: reserved keywords, primitive types,
//! punctuation, and naming conventions.
//!
//! The design goal is to avoid stringly-typed checks scattered across the compiler. Callers work with
//! **stable IDs** (e.g. `KeywordId`, `PrimitiveId`) and look up spellings/metadata via registry tables.
//!
//! ## Notes
//! - Registries are intentionally **pure**: no AST types, no IO, no side effects.
//! - The lexer/parser enforce syntax; registries provide spellings and metadata for shared use.
//!
//! ## Examples
//! ```rust
//! use arf_core::lang::keywords::{self, KeywordId};
//!
//! assert_eq!(keywords::from_str("service"), Some(KeywordId::Service));
//! assert_eq!(keywords::as_str(KeywordId::Service), "service");
//! ```

pub mod conventions;
pub mod keywords;
pub mod primitives;
pub mod punctuation;
