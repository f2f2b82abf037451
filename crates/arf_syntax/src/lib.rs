//! Syntax frontend for the arf IDL: lexer, parser, AST, diagnostics.
//!
//! ## Notes
//! - This crate is intentionally "syntax-only": it does not follow imports, resolve type names or validate
//!   declarations. Those live in the `arf` crate.
//! - Vocabulary identity (keywords/primitives/punctuation) comes from `arf_core::lang` registries.
//!
//! ## Examples
//! ```rust
//! use arf_syntax::{lexer, parser};
//!
//! let tokens = lexer::lex("package demo; struct Ping { id uint64 = 1; }").unwrap();
//! let file = parser::parse(&tokens).unwrap();
//! assert_eq!(file.package_name(), "demo");
//! assert_eq!(file.structs.len(), 1);
//! ```

pub mod ast;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod token_helpers;
