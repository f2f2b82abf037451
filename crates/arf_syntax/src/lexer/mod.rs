//! Lexer for the arf IDL
//!
//! Handles tokenization including:
//! - Keywords (package, import, struct, enum, union, service, stream, map, array, optional, as)
//! - Identifiers and literals (decimal/hex integers, single- or double-quoted strings)
//! - Punctuation (`= ; ( ) { } < > , @ .` and `->`)
//! - `#` line comments, kept as tokens for documentation attachment
//!
//! The lexer never stops at the first problem: an unexpected character is reported and skipped, and scanning
//! continues so the parser still sees a useful token stream.
//!
//! ## Module Structure
//!
//! - `tokens` - Token types (TokenKind, Token)
//! - `strings` - String literal scanning
//! - `numbers` - Numeric literal scanning

mod numbers;
mod strings;
pub mod tokens;

pub use tokens::{Token, TokenKind, keyword_id};

use crate::ast::{Position, Span};
use crate::diagnostics::CompileError;
use arf_core::lang::punctuation::{self, PunctuationId};

/// Lexer for arf source code.
///
/// Converts source text into a stream of tokens. Whitespace (space, tab, CR, LF) is discarded; every token
/// records the line/column where it starts and ends.
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
    errors: Vec<CompileError>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Tokenize the entire source code.
    ///
    /// Returns every token (always ending with `Eof`) together with the errors found on the way.
    pub fn tokenize(mut self) -> (Vec<Token>, Vec<CompileError>) {
        while self.peek().is_some() {
            self.scan_token();
        }

        let end = self.position();
        self.tokens.push(Token::new(TokenKind::Eof, Span::at(end)));
        (self.tokens, self.errors)
    }

    // ========================================================================
    // Core character handling
    // ========================================================================

    fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn add_token(&mut self, kind: TokenKind, start: Position) {
        let end = self.position();
        self.tokens.push(Token::new(kind, Span::new(start, end)));
    }

    fn error(&mut self, message: String, start: Position) {
        let end = self.position();
        self.errors.push(CompileError::syntax(message, Span::new(start, end)));
    }

    // ========================================================================
    // Main scanning dispatch
    // ========================================================================

    fn scan_token(&mut self) {
        let start = self.position();
        let Some(c) = self.advance() else {
            return;
        };

        match c {
            ' ' | '\t' | '\r' | '\n' => {}

            '#' => self.scan_comment(start),

            '-' => {
                if self.match_char('>') {
                    self.add_token(TokenKind::Punctuation(PunctuationId::Arrow), start);
                } else {
                    self.error("unexpected character '-'".to_string(), start);
                }
            }

            '"' | '\'' => self.scan_string(start, c),

            '0'..='9' => self.scan_number(start, c),

            _ if is_ident_start(c) => self.scan_identifier(start, c),

            _ => match punctuation::from_char(c) {
                Some(id) => self.add_token(TokenKind::Punctuation(id), start),
                None => self.error(format!("unexpected character '{}'", c), start),
            },
        }
    }

    // ========================================================================
    // Comments and identifiers
    // ========================================================================

    fn scan_comment(&mut self, start: Position) {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            text.push(c);
            self.advance();
        }
        let text = text.strip_prefix(' ').unwrap_or(&text).trim_end().to_string();
        self.add_token(TokenKind::Comment(text), start);
    }

    fn scan_identifier(&mut self, start: Position, first: char) {
        let mut spelling = String::from(first);
        while let Some(c) = self.peek() {
            if is_ident_continue(c) {
                spelling.push(c);
                self.advance();
            } else {
                break;
            }
        }

        if let Some(id) = keyword_id(&spelling) {
            self.add_token(TokenKind::Keyword(id), start);
        } else {
            self.add_token(TokenKind::Ident(spelling), start);
        }
    }
}

// ============================================================================
// Helper functions
// ============================================================================

/// Check if a character can start an identifier (ASCII-only).
fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Check if a character can continue an identifier (ASCII-only).
fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Tokenize a source string, returning tokens and errors side by side.
///
/// The token stream is usable even when errors were reported.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn tokenize(source: &str) -> (Vec<Token>, Vec<CompileError>) {
    let (tokens, errors) = Lexer::new(source).tokenize();
    if !errors.is_empty() {
        tracing::debug!(errors = errors.len(), "lexer reported errors");
    }
    (tokens, errors)
}

/// Convenience function to lex a source string, failing if any error was reported.
pub fn lex(source: &str) -> Result<Vec<Token>, Vec<CompileError>> {
    let (tokens, errors) = tokenize(source);
    if errors.is_empty() { Ok(tokens) } else { Err(errors) }
}

// ============================================================================
// TESTS
// ============================================================================
