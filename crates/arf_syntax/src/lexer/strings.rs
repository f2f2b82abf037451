//! String scanning for the arf lexer
//!
//! Handles single- and double-quoted string literals with backslash escapes.

use super::Lexer;
use super::tokens::TokenKind;
use crate::ast::Position;

/// Result of processing an escape sequence
enum EscapeResult {
    /// Successfully parsed escape character
    Char(char),
    /// Unknown escape - preserve as-is (backslash + char)
    Unknown(char),
    /// End of input during escape
    Eof,
}

impl<'a> Lexer<'a> {
    /// Process an escape sequence. Called after consuming the backslash.
    fn scan_escape(&mut self, quote: char) -> EscapeResult {
        match self.advance() {
            Some('n') => EscapeResult::Char('\n'),
            Some('t') => EscapeResult::Char('\t'),
            Some('r') => EscapeResult::Char('\r'),
            Some('\\') => EscapeResult::Char('\\'),
            Some(q) if q == quote => EscapeResult::Char(q),
            Some(c) => EscapeResult::Unknown(c),
            None => EscapeResult::Eof,
        }
    }

    /// Scan a string literal whose opening `quote` has been consumed.
    ///
    /// ## Notes
    /// - An unterminated literal consumes the rest of the input, is reported once, and still yields a
    ///   `String` token so parsing can continue.
    /// - A raw line break inside a terminated literal is reported but kept in the value.
    pub(super) fn scan_string(&mut self, start: Position, quote: char) {
        let mut value = String::new();
        let mut saw_line_break = false;

        loop {
            match self.advance() {
                None => {
                    self.error("unterminated string literal".to_string(), start);
                    self.add_token(TokenKind::String(value), start);
                    return;
                }
                Some(c) if c == quote => break,
                Some('\\') => match self.scan_escape(quote) {
                    EscapeResult::Char(c) => value.push(c),
                    EscapeResult::Unknown(c) => {
                        value.push('\\');
                        value.push(c);
                    }
                    EscapeResult::Eof => {
                        self.error("unterminated string literal".to_string(), start);
                        self.add_token(TokenKind::String(value), start);
                        return;
                    }
                },
                Some('\n') => {
                    saw_line_break = true;
                    value.push('\n');
                }
                Some(c) => value.push(c),
            }
        }

        if saw_line_break {
            self.error("line break in string literal".to_string(), start);
        }
        self.add_token(TokenKind::String(value), start);
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::Position;
    use crate::lexer::{TokenKind, lex, tokenize};

    #[test]
    fn test_both_quote_styles() {
        let tokens = lex(r#""hello" 'world'"#).unwrap();
        assert!(matches!(&tokens[0].kind, TokenKind::String(s) if s == "hello"));
        assert!(matches!(&tokens[1].kind, TokenKind::String(s) if s == "world"));
    }

    #[test]
    fn test_escapes() {
        let tokens = lex(r#""a\"b\\c\n" 'it\'s' "\q""#).unwrap();
        assert!(matches!(&tokens[0].kind, TokenKind::String(s) if s == "a\"b\\c\n"));
        assert!(matches!(&tokens[1].kind, TokenKind::String(s) if s == "it's"));
        assert!(matches!(&tokens[2].kind, TokenKind::String(s) if s == "\\q"));
    }

    #[test]
    fn test_unterminated_string_consumes_to_eof() {
        let (tokens, errors) = tokenize("import \"common;\nstruct S {}");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "unterminated string literal");
        assert_eq!(errors[0].span.start, Position::new(1, 8));
        assert!(matches!(&tokens[1].kind, TokenKind::String(s) if s.starts_with("common;")));
        assert_eq!(tokens.last().map(|t| &t.kind), Some(&TokenKind::Eof));
    }

    #[test]
    fn test_line_break_in_string() {
        let (tokens, errors) = tokenize("'a\nb'");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "line break in string literal");
        assert!(matches!(&tokens[0].kind, TokenKind::String(s) if s == "a\nb"));
    }
}
