//! Number scanning for the arf lexer
//!
//! Handles decimal and `0x` hexadecimal integer literals.

use super::tokens::TokenKind;
use super::{Lexer, is_ident_continue};
use crate::ast::Position;

impl<'a> Lexer<'a> {
    pub(super) fn scan_number(&mut self, start: Position, first: char) {
        let is_hex = first == '0' && matches!(self.peek(), Some('x' | 'X'));
        let mut digits = String::new();
        let mut literal = String::from(first);

        if is_hex {
            if let Some(x) = self.advance() {
                literal.push(x);
            }
        } else {
            digits.push(first);
        }

        let radix = if is_hex { 16 } else { 10 };
        while let Some(c) = self.peek() {
            if c.is_digit(radix) {
                digits.push(c);
                literal.push(c);
                self.advance();
            } else {
                break;
            }
        }

        // `12ab`, `0xfg`: swallow the rest of the word so it is reported once.
        let mut malformed = is_hex && digits.is_empty();
        while let Some(c) = self.peek() {
            if is_ident_continue(c) {
                malformed = true;
                literal.push(c);
                self.advance();
            } else {
                break;
            }
        }

        let value = if malformed {
            self.error(format!("malformed numeric literal '{}'", literal), start);
            None
        } else {
            match i64::from_str_radix(&digits, radix) {
                Ok(n) => Some(n),
                Err(_) => {
                    self.error(format!("numeric literal '{}' is out of range", literal), start);
                    None
                }
            }
        };

        // A placeholder keeps the parser in step after a reported error.
        self.add_token(TokenKind::Int(value.unwrap_or(0)), start);
    }
}

#[cfg(test)]
mod tests {
    use crate::lexer::{TokenKind, lex, tokenize};

    #[test]
    fn test_decimal_and_hex() {
        let tokens = lex("0 42 0x1F 0XfF").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Int(0));
        assert_eq!(tokens[1].kind, TokenKind::Int(42));
        assert_eq!(tokens[2].kind, TokenKind::Int(31));
        assert_eq!(tokens[3].kind, TokenKind::Int(255));
    }

    #[test]
    fn test_malformed_literals() {
        for source in ["12ab", "0x", "0xZZ", "1_000"] {
            let (tokens, errors) = tokenize(source);
            assert_eq!(errors.len(), 1, "{source}: {errors:?}");
            assert!(errors[0].message.starts_with("malformed numeric literal"), "{source}");
            assert_eq!(tokens.len(), 2, "{source}: placeholder + EOF");
        }
    }

    #[test]
    fn test_out_of_range() {
        let (_, errors) = tokenize("99999999999999999999");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("out of range"));
    }
}
