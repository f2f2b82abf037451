/// Type-expression parsing methods.
///
/// This chunk parses syntactic type expressions, including:
/// - Primitive scalars (`uint64`, `string`)
/// - Type constructors (`array<T>`, `map<K, V>`, `optional<T>`)
/// - User type references, simple (`Foo`) or dotted (`pkg.Outer.Inner`)
/// - Method parameters and the `stream T` marker
///
/// ## Notes
/// - Every user type reference gets a fresh [`TypeRefId`]; resolution results are stored against it later.
/// - `stream` is not a type: it only ever prefixes a method parameter or return value.
impl<'a> Parser<'a> {
    // ========================================================================
    // Types
    // ========================================================================

    fn type_expr(&mut self) -> Result<Spanned<Type>, CompileError> {
        let token = self.peek();
        let start = token.span;

        match &token.kind {
            TokenKind::Keyword(KeywordId::Map) => {
                self.advance();
                self.expect_punct(PunctuationId::Lt, "expected `<` after `map`")?;
                let key = self.type_expr()?;
                self.expect_punct(PunctuationId::Comma, "expected `,` between map key and value types")?;
                let value = self.type_expr()?;
                let end = self.expect_punct(PunctuationId::Gt, "expected `>` to close `map<...>`")?.span;
                Ok(Spanned::new(Type::Map(Box::new(key), Box::new(value)), start.merge(end)))
            }
            TokenKind::Keyword(KeywordId::Array) => {
                self.advance();
                let (inner, end) = self.single_type_argument("array")?;
                Ok(Spanned::new(Type::Array(Box::new(inner)), start.merge(end)))
            }
            TokenKind::Keyword(KeywordId::Optional) => {
                self.advance();
                let (inner, end) = self.single_type_argument("optional")?;
                Ok(Spanned::new(Type::Optional(Box::new(inner)), start.merge(end)))
            }
            TokenKind::Keyword(KeywordId::Stream) => Err(CompileError::parse(
                "`stream` can only prefix a method parameter or return type",
                start,
            )),
            TokenKind::Ident(name) => {
                self.advance();
                let mut path = vec![name.clone()];
                let mut end = start;
                while self.check_punct(PunctuationId::Dot) {
                    self.advance();
                    let component = self.identifier_spanned("expected type name after `.`")?;
                    end = component.span;
                    path.push(component.node);
                }

                if path.len() == 1 {
                    if let Some(primitive) = primitives::from_str(&path[0]) {
                        return Ok(Spanned::new(Type::Primitive(primitive), start));
                    }
                }

                let type_ref = TypeRef {
                    id: self.next_type_ref(),
                    path,
                };
                let ty = if type_ref.path.len() == 1 {
                    Type::Simple(type_ref)
                } else {
                    Type::Qualified(type_ref)
                };
                Ok(Spanned::new(ty, start.merge(end)))
            }
            _ => Err(self.unexpected("expected a type")),
        }
    }

    /// `'<' Type '>'` after `array` / `optional`.
    fn single_type_argument(&mut self, constructor: &str) -> Result<(Spanned<Type>, Span), CompileError> {
        self.expect_punct(PunctuationId::Lt, &format!("expected `<` after `{}`", constructor))?;
        let inner = self.type_expr()?;
        let end = self
            .expect_punct(PunctuationId::Gt, &format!("expected `>` to close `{}<...>`", constructor))?
            .span;
        Ok((inner, end))
    }

    fn next_type_ref(&mut self) -> TypeRefId {
        let id = TypeRefId(self.file.type_ref_count);
        self.file.type_ref_count += 1;
        id
    }

    // ========================================================================
    // Method parameters
    // ========================================================================

    /// `'stream' Type | name Type | Type`
    ///
    /// An identifier is a parameter name only when the token after it can start a type.
    fn method_param(&mut self) -> Result<MethodParam, CompileError> {
        let start = self.current_span();

        if self.match_keyword(KeywordId::Stream) {
            let inner = self.type_expr()?;
            let span = start.merge(inner.span);
            return Ok(MethodParam {
                name: None,
                ty: Spanned::new(Type::Streaming(Box::new(inner)), span),
                span,
            });
        }

        let name = if matches!(self.peek().kind, TokenKind::Ident(_)) && starts_type(self.peek_next()) {
            Some(self.identifier_spanned("expected parameter name")?)
        } else {
            None
        };
        let ty = self.type_expr()?;

        Ok(MethodParam {
            span: start.merge(ty.span),
            name,
            ty,
        })
    }
}

fn starts_type(token: &Token) -> bool {
    match &token.kind {
        TokenKind::Ident(_) => true,
        TokenKind::Keyword(id) => matches!(
            id,
            KeywordId::Map | KeywordId::Array | KeywordId::Optional | KeywordId::Stream
        ),
        _ => false,
    }
}
