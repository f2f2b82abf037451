//! Parser for the arf IDL
//!
//! Converts a token stream into a [`SourceFile`] arena. The parser is recursive descent with one method per
//! production and recovers from errors in panic mode: after a grammar violation it skips to the next `;`, line
//! boundary, `}` or declaration keyword and carries on, so one pass reports every independent problem.
//!
//! ## Examples
//!
//! ```rust
//! use arf_syntax::{lexer, parser};
//!
//! let source = "package demo;\nstruct S { id uint64 = 1; }\nservice Api { Get(req S) -> S; }\n";
//! let tokens = lexer::lex(source).unwrap();
//! let file = parser::parse(&tokens).unwrap();
//! assert_eq!(file.services[0].methods.len(), 1);
//! ```

use crate::ast::*;
use crate::diagnostics::CompileError;
use crate::lexer::{Token, TokenKind};
use arf_core::lang::conventions;
use arf_core::lang::keywords::{self, KeywordCategory, KeywordId};
use arf_core::lang::primitives;
use arf_core::lang::punctuation::PunctuationId;

// NOTE: This module is split across multiple files using `include!` to keep all parser
// methods in the same Rust module (preserving privacy + call patterns) while avoiding
// a single large source file.

include!("parser/core.rs");
include!("parser/helpers.rs");
include!("parser/decl.rs");
include!("parser/types.rs");
include!("parser/util.rs");
include!("parser/api.rs");
include!("parser/tests.rs");
