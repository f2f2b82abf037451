/// Token-stream helpers and error recovery.
///
/// This chunk contains the low-level primitives used throughout parsing:
/// - Peeking/consuming tokens (`peek`, `advance`)
/// - Matching / expecting keywords and punctuation
/// - Error recovery (`synchronize`, `recover`)
/// - Documentation lookup (`docs_before`)
impl<'a> Parser<'a> {
    // ========================================================================
    // Helpers
    // ========================================================================

    /// Return `true` if the current token is [`TokenKind::Eof`].
    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    /// Return the current token without consuming it.
    fn peek(&self) -> &'a Token {
        self.tokens.get(self.pos).copied().unwrap_or(&FALLBACK_EOF)
    }

    /// Return the token after the current token without consuming it.
    fn peek_next(&self) -> &'a Token {
        self.tokens.get(self.pos + 1).copied().unwrap_or(&FALLBACK_EOF)
    }

    /// Advance to the next token and return the token we just consumed.
    fn advance(&mut self) -> &'a Token {
        let token = self.peek();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    /// Return `true` if the current token is the given keyword.
    fn check_keyword(&self, id: KeywordId) -> bool {
        self.peek().kind.is_keyword(id)
    }

    /// Return `true` if the current token is the given punctuation.
    fn check_punct(&self, id: PunctuationId) -> bool {
        self.peek().kind.is_punctuation(id)
    }

    fn match_keyword(&mut self, id: KeywordId) -> bool {
        if self.check_keyword(id) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_punct(&mut self, id: PunctuationId) -> bool {
        if self.check_punct(id) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, id: KeywordId, msg: &str) -> Result<&'a Token, CompileError> {
        if self.check_keyword(id) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(msg))
        }
    }

    fn expect_punct(&mut self, id: PunctuationId, msg: &str) -> Result<&'a Token, CompileError> {
        if self.check_punct(id) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(msg))
        }
    }

    /// Build a parse error at the current token: "`msg`, found `token`".
    fn unexpected(&self, msg: &str) -> CompileError {
        CompileError::parse(format!("{}, found {}", msg, self.peek().kind), self.current_span())
    }

    fn current_span(&self) -> Span {
        self.peek().span
    }

    /// Return `true` at a token that can begin a declaration in some context.
    fn at_declaration_start(&self) -> bool {
        match self.peek().keyword_id() {
            Some(KeywordId::As) => false,
            Some(id) => keywords::category(id) != KeywordCategory::Type,
            None => self.check_punct(PunctuationId::At),
        }
    }

    // ========================================================================
    // Error recovery
    // ========================================================================

    /// Skip tokens until the next statement terminator or line boundary.
    ///
    /// Stops *after* a `;`, and *before* a `}`, a declaration keyword, an annotation, or the first token of a
    /// later line.
    fn synchronize(&mut self) {
        let line = self.peek().span.start.line;
        while !self.is_at_end() {
            if self.match_punct(PunctuationId::Semi) {
                return;
            }
            if self.check_punct(PunctuationId::RBrace)
                || self.at_declaration_start()
                || self.peek().span.start.line != line
            {
                return;
            }
            self.advance();
        }
    }

    /// Record `error`, synchronize, and guarantee forward progress relative to `started_at`.
    fn recover(&mut self, error: CompileError, started_at: usize) {
        self.errors.push(error);
        self.synchronize();
        if self.pos == started_at && !self.is_at_end() {
            self.advance();
        }
    }

    // ========================================================================
    // Documentation
    // ========================================================================

    /// Comment lines forming a contiguous run that ends on the line just above `line`.
    fn docs_before(&self, line: usize) -> Vec<String> {
        let end = self.comments.partition_point(|c| c.line < line);
        let mut start = end;
        let mut expected = line;
        while start > 0 && self.comments[start - 1].line + 1 == expected {
            start -= 1;
            expected -= 1;
        }
        self.comments[start..end].iter().map(|c| c.text.clone()).collect()
    }
}
