//! Token types for the arf lexer.
//!
//! The lexer uses **registry-backed IDs** for language vocabulary:
//! - `Keyword(KeywordId)` for language keywords
//! - `Punctuation(PunctuationId)` for punctuation tokens
//!
//! ## Notes
//! - Primitive type names are plain `Ident` tokens; the parser recognises them in type position.
//! - Comments are kept in the stream so the parser can attach documentation to declarations.
//! - Use `crate::token_helpers` for ergonomic token matching at call sites.

use std::fmt;

use crate::ast::Span;
use arf_core::lang::keywords::{self, KeywordId};
use arf_core::lang::punctuation::{self, PunctuationId};

// ============================================================================
// TOKEN TYPES
// ============================================================================

/// Kind of token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    // ========== Keyword / punctuation (ID-based) ==========
    Keyword(KeywordId),
    Punctuation(PunctuationId),

    // ========== Identifiers and Literals ==========
    Ident(String),
    Int(i64),
    String(String),

    // ========== Trivia ==========
    /// `# text`, stored without the marker and without one leading space.
    Comment(String),

    // ========== Special ==========
    Eof,
}

/// Describes the token the way diagnostics quote it (`found identifier `x``).
impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Keyword(id) => write!(f, "keyword `{}`", keywords::as_str(*id)),
            TokenKind::Punctuation(id) => write!(f, "`{}`", punctuation::as_str(*id)),
            TokenKind::Ident(name) => write!(f, "identifier `{}`", name),
            TokenKind::Int(n) => write!(f, "number `{}`", n),
            TokenKind::String(s) => write!(f, "string {:?}", s),
            TokenKind::Comment(_) => write!(f, "comment"),
            TokenKind::Eof => write!(f, "end of file"),
        }
    }
}

/// A token with its kind and source span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    /// Construct a new token.
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// Resolve an identifier spelling to a keyword id, if reserved.
pub fn keyword_id(name: &str) -> Option<KeywordId> {
    keywords::from_str(name)
}
