/// Miscellaneous parser utilities.
///
/// This chunk contains small shared parsing helpers that don't cleanly fit into "decl" or "types" (identifier
/// parsing, member names, annotations and literals).
impl<'a> Parser<'a> {
    // ========================================================================
    // Utilities
    // ========================================================================

    fn identifier_spanned(&mut self, msg: &str) -> Result<Spanned<Ident>, CompileError> {
        let token = self.peek();
        match &token.kind {
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Spanned::new(name.clone(), token.span))
            }
            _ => Err(self.unexpected(msg)),
        }
    }

    fn word(&mut self, what: &str) -> Result<Spanned<Ident>, CompileError> {
        self.identifier_spanned(&format!("expected {}", what))
    }

    /// Name of a field, union, union member or enum option.
    ///
    /// Reserved words are reported but still accepted so the rest of the member parses normally.
    fn member_name(&mut self, what: &str) -> Result<Spanned<Ident>, CompileError> {
        let token = self.peek();
        let name = match &token.kind {
            TokenKind::Ident(name) => name.clone(),
            TokenKind::Keyword(id) => keywords::as_str(*id).to_string(),
            _ => return Err(self.unexpected(&format!("expected {} name", what))),
        };
        self.advance();

        if conventions::is_reserved(&name) {
            self.errors.push(CompileError::parse(
                format!("`{}` is a reserved word and cannot be used as a {} name", name, what),
                token.span,
            ));
        }
        Ok(Spanned::new(name, token.span))
    }

    // ========================================================================
    // Annotations
    // ========================================================================

    /// `('@' name ('(' literal (',' literal)* ')')?)*`
    fn annotations(&mut self) -> Result<Vec<Annotation>, CompileError> {
        let mut annotations = Vec::new();

        while self.check_punct(PunctuationId::At) {
            let start = self.advance().span;

            let token = self.peek();
            let name = match &token.kind {
                TokenKind::Ident(name) => name.clone(),
                // `@optional`, `@stream`, ... are plain annotation names.
                TokenKind::Keyword(id) => keywords::as_str(*id).to_string(),
                _ => return Err(self.unexpected("expected annotation name after `@`")),
            };
            self.advance();
            let name = Spanned::new(name, token.span);

            let mut args = Vec::new();
            let mut end = name.span;
            if self.match_punct(PunctuationId::LParen) {
                if !self.check_punct(PunctuationId::RParen) {
                    args.push(self.literal()?);
                    while self.match_punct(PunctuationId::Comma) {
                        args.push(self.literal()?);
                    }
                }
                end = self
                    .expect_punct(PunctuationId::RParen, "expected `)` after annotation arguments")?
                    .span;
            }

            annotations.push(Annotation {
                name,
                args,
                span: start.merge(end),
            });
        }

        Ok(annotations)
    }

    // ========================================================================
    // Literals
    // ========================================================================

    fn literal(&mut self) -> Result<Spanned<Literal>, CompileError> {
        let token = self.peek();
        let literal = match &token.kind {
            TokenKind::Int(n) => Literal::Int(*n),
            TokenKind::String(s) => Literal::String(s.clone()),
            _ => return Err(self.unexpected("expected a string or number literal")),
        };
        self.advance();
        Ok(Spanned::new(literal, token.span))
    }

    /// An integer literal that must fit in `i32` (field indices, enum values).
    fn int32_literal(&mut self, what: &str) -> Result<Spanned<i32>, CompileError> {
        let token = self.peek();
        let TokenKind::Int(n) = token.kind else {
            return Err(self.unexpected(&format!("expected numeric {}", what)));
        };
        self.advance();

        let value = match i32::try_from(n) {
            Ok(v) => v,
            Err(_) => {
                self.errors.push(CompileError::parse(
                    format!("{} {} does not fit in a 32-bit signed integer", what, n),
                    token.span,
                ));
                0
            }
        };
        Ok(Spanned::new(value, token.span))
    }
}
