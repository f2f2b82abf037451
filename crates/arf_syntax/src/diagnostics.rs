//! Diagnostics shared by every stage of the front-end.
//!
//! A [`CompileError`] is position-only: it does not know which file it belongs to. The `arf` crate pairs it with
//! a path when rendering (`path:line:column: message`).

use std::fmt;

use crate::ast::Span;

/// A compile-time error with location information
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct CompileError {
    pub message: String,
    pub span: Span,
    pub kind: ErrorKind,
    pub notes: Vec<String>,
    pub hints: Vec<String>,
}

impl CompileError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            kind,
            notes: Vec::new(),
            hints: Vec::new(),
        }
    }

    /// Lexical error: unrecognized character, unterminated string, malformed number.
    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Syntax, message, span)
    }

    /// Grammar violation found by the parser.
    pub fn parse(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Parse, message, span)
    }

    pub fn resolution(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Resolution, message, span)
    }

    pub fn semantic(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Semantic, message, span)
    }

    pub fn import(message: impl Into<String>, span: Span) -> Self {
        Self::new(ErrorKind::Import, message, span)
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Syntax,
    Parse,
    Resolution,
    Semantic,
    Import,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Syntax => write!(f, "syntax error"),
            ErrorKind::Parse => write!(f, "parse error"),
            ErrorKind::Resolution => write!(f, "resolution error"),
            ErrorKind::Semantic => write!(f, "semantic error"),
            ErrorKind::Import => write!(f, "import error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Position;

    #[test]
    fn test_builders() {
        let err = CompileError::semantic("duplicate field `f`", Span::at(Position::new(1, 30)))
            .with_note("first declared here")
            .with_hint("rename one of the fields");
        assert_eq!(err.kind, ErrorKind::Semantic);
        assert_eq!(err.to_string(), "duplicate field `f`");
        assert_eq!(err.notes, vec!["first declared here".to_string()]);
        assert_eq!(err.hints.len(), 1);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ErrorKind::Import.to_string(), "import error");
        assert_eq!(ErrorKind::Parse.to_string(), "parse error");
    }
}
