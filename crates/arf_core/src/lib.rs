//! Canonical vocabulary for the arf interface-definition language.
//!
//! This crate is intentionally small and dependency-free. It holds the data every other layer agrees on:
//! reserved keywords, primitive scalar types, punctuation spellings, and naming conventions.
//!
//! ## Notes
//!
//! - This is a "vocabulary" crate: **no IO**, no global state, and no AST types.
//! - The lexer/parser (`arf_syntax`) and the validator (`arf`) both consult these tables, so a spelling is only
//!   ever defined once.

pub mod lang;
