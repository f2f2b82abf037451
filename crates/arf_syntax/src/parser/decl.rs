/// Declaration parsing.
///
/// This chunk covers the file header (`package`, `import`) and every declaration form: structs with their
/// fields, unions and nested declarations, enums with their options, and services with their methods.
///
/// ## Notes
/// - Bodies recover member by member: a broken field does not abort the enclosing struct.
/// - Declarations that are illegal in a given body (a `service` inside a struct, a `struct` inside an enum, ...)
///   are reported, parsed anyway so their own errors surface, and then rolled back out of the arena.
impl<'a> Parser<'a> {
    // ========================================================================
    // File header
    // ========================================================================

    /// `Package? Import*`
    fn header(&mut self) {
        if self.check_keyword(KeywordId::Package) {
            let started_at = self.pos;
            match self.package_decl() {
                Ok(pkg) => self.file.package = Some(pkg),
                Err(e) => self.recover(e, started_at),
            }
        }

        while self.check_keyword(KeywordId::Import) {
            let started_at = self.pos;
            match self.import_decl() {
                Ok(import) => self.file.imports.push(import),
                Err(e) => self.recover(e, started_at),
            }
        }
    }

    /// `'package' ident ('.' ident)* ';'`
    fn package_decl(&mut self) -> Result<PackageDecl, CompileError> {
        let start = self.expect_keyword(KeywordId::Package, "expected `package`")?.span;

        let mut components = vec![self.package_component()?];
        while self.match_punct(PunctuationId::Dot) {
            components.push(self.package_component()?);
        }
        let end = self
            .expect_punct(PunctuationId::Semi, "expected `;` after package name")?
            .span;

        let name = components.iter().map(|c| c.node.as_str()).collect::<Vec<_>>().join(".");
        Ok(PackageDecl {
            components,
            name,
            span: start.merge(end),
        })
    }

    fn package_component(&mut self) -> Result<Spanned<Ident>, CompileError> {
        let component = self.word("package name component")?;
        if !conventions::is_snake_case(&component.node) {
            self.errors.push(CompileError::parse(
                format!("package name component `{}` must be snake_case", component.node),
                component.span,
            ));
        }
        Ok(component)
    }

    /// `'import' string ('as' ident)? ';'`
    fn import_decl(&mut self) -> Result<ImportDecl, CompileError> {
        let start = self.expect_keyword(KeywordId::Import, "expected `import`")?.span;

        let path_token = self.peek();
        let path = match &path_token.kind {
            TokenKind::String(s) => {
                self.advance();
                Spanned::new(s.clone(), path_token.span)
            }
            _ => return Err(self.unexpected("expected import path string after `import`")),
        };

        let alias = if self.match_keyword(KeywordId::As) {
            let alias = self.identifier_spanned("expected import alias after `as`")?;
            if !conventions::is_snake_case(&alias.node) {
                self.errors.push(CompileError::parse(
                    format!("import alias `{}` must be snake_case", alias.node),
                    alias.span,
                ));
            }
            Some(alias)
        } else {
            None
        };

        let end = self
            .expect_punct(PunctuationId::Semi, "expected `;` after import")?
            .span;

        Ok(ImportDecl {
            path,
            alias,
            span: start.merge(end),
        })
    }

    // ========================================================================
    // Top level
    // ========================================================================

    fn top_level_item(&mut self) -> Result<(), CompileError> {
        let docs = self.docs_before(self.peek().span.start.line);
        let annotations = self.annotations()?;

        match self.peek().keyword_id() {
            Some(KeywordId::Struct) => {
                let id = self.struct_decl(None, annotations, docs)?;
                self.file.items.push(Item::Struct(id));
            }
            Some(KeywordId::Enum) => {
                let id = self.enum_decl(None, annotations, docs)?;
                self.file.items.push(Item::Enum(id));
            }
            Some(KeywordId::Service) => {
                let block = self.service_block(annotations, docs)?;
                self.merge_service(block);
            }
            Some(KeywordId::Import) => {
                let span = self.current_span();
                self.import_decl()?;
                self.errors.push(CompileError::parse(
                    "imports must appear before any struct, enum or service declaration",
                    span,
                ));
            }
            Some(KeywordId::Package) => {
                let span = self.current_span();
                self.package_decl()?;
                self.errors.push(CompileError::parse(
                    "the package declaration must be the first declaration of the file",
                    span,
                ));
            }
            _ => return Err(self.unexpected("expected `struct`, `enum` or `service`")),
        }
        Ok(())
    }

    /// Append a service block to the file, merging it into an earlier block of the same name.
    fn merge_service(&mut self, block: ServiceDecl) {
        let existing = self
            .file
            .services
            .iter_mut()
            .find(|s| s.name.node == block.name.node);

        match existing {
            Some(service) => {
                service.methods.extend(block.methods);
                service.blocks.extend(block.blocks);
                service.annotations.extend(block.annotations);
                service.docs.extend(block.docs);
            }
            None => {
                let id = ServiceId(self.file.services.len());
                self.file.services.push(block);
                self.file.items.push(Item::Service(id));
            }
        }
    }

    // ========================================================================
    // Structs
    // ========================================================================

    /// `'struct' Name '{' member* '}'`
    fn struct_decl(
        &mut self,
        parent: Option<StructId>,
        annotations: Vec<Annotation>,
        docs: Vec<String>,
    ) -> Result<StructId, CompileError> {
        let start = self.expect_keyword(KeywordId::Struct, "expected `struct`")?.span;
        let name = self.identifier_spanned("expected struct name")?;
        self.expect_punct(PunctuationId::LBrace, "expected `{` after struct name")?;

        let id = StructId(self.file.structs.len());
        self.file.structs.push(StructDecl {
            name,
            parent,
            fields: Vec::new(),
            structs: Vec::new(),
            enums: Vec::new(),
            annotations,
            docs,
            span: start,
        });

        while !self.check_punct(PunctuationId::RBrace) && !self.is_at_end() {
            let started_at = self.pos;
            if let Err(e) = self.struct_member(id) {
                self.recover(e, started_at);
            }
        }
        let end = self.close_body("struct", start);
        self.file.structs[id.0].span = start.merge(end);
        Ok(id)
    }

    /// Consume the `}` closing a body, reporting (not failing) when it is missing.
    fn close_body(&mut self, kind: &str, start: Span) -> Span {
        if self.check_punct(PunctuationId::RBrace) {
            return self.advance().span;
        }
        let error = self
            .unexpected(&format!("expected `}}` to close {}", kind))
            .with_note(format!("the {} starts at {}", kind, start.start));
        self.errors.push(error);
        self.current_span()
    }

    fn struct_member(&mut self, owner: StructId) -> Result<(), CompileError> {
        let docs = self.docs_before(self.peek().span.start.line);
        let annotations = self.annotations()?;

        match self.peek().keyword_id() {
            Some(KeywordId::Struct) => {
                let id = self.struct_decl(Some(owner), annotations, docs)?;
                self.file.structs[owner.0].structs.push(id);
            }
            Some(KeywordId::Enum) => {
                let id = self.enum_decl(Some(owner), annotations, docs)?;
                self.file.structs[owner.0].enums.push(id);
            }
            Some(KeywordId::Union) => {
                let union = self.union_decl(annotations, docs)?;
                self.file.structs[owner.0].fields.push(Field::Union(union));
            }
            Some(KeywordId::Service) => {
                let container = format!("struct `{}`", self.file.structs[owner.0].name.node);
                self.discard_declaration(&container);
            }
            _ if self.check_punct(PunctuationId::RBrace) => {
                return Err(self.unexpected("expected a declaration after annotations"));
            }
            _ => {
                let field = self.plain_field(annotations, docs)?;
                self.file.structs[owner.0].fields.push(Field::Plain(field));
            }
        }
        Ok(())
    }

    /// `name Type ('=' index)? ';'`
    fn plain_field(&mut self, annotations: Vec<Annotation>, docs: Vec<String>) -> Result<PlainField, CompileError> {
        let name = self.member_name("field")?;
        let ty = self.type_expr()?;

        let index = if self.match_punct(PunctuationId::Eq) {
            Some(self.int32_literal("field index")?)
        } else {
            None
        };

        let end = self
            .expect_punct(PunctuationId::Semi, "expected `;` after field")?
            .span;

        Ok(PlainField {
            span: name.span.merge(end),
            name,
            ty,
            index,
            annotations,
            docs,
        })
    }

    /// `'union' Name '{' plain_field* '}'`
    fn union_decl(&mut self, annotations: Vec<Annotation>, docs: Vec<String>) -> Result<UnionField, CompileError> {
        let start = self.expect_keyword(KeywordId::Union, "expected `union`")?.span;
        let name = self.member_name("union")?;
        self.expect_punct(PunctuationId::LBrace, "expected `{` after union name")?;

        let mut members = Vec::new();
        while !self.check_punct(PunctuationId::RBrace) && !self.is_at_end() {
            let started_at = self.pos;
            match self.union_member(&name.node) {
                Ok(Some(member)) => members.push(member),
                Ok(None) => {}
                Err(e) => self.recover(e, started_at),
            }
        }
        let end = self.close_body("union", start);

        Ok(UnionField {
            name,
            members,
            annotations,
            docs,
            span: start.merge(end),
        })
    }

    fn union_member(&mut self, union_name: &str) -> Result<Option<PlainField>, CompileError> {
        let docs = self.docs_before(self.peek().span.start.line);
        let annotations = self.annotations()?;

        if matches!(
            self.peek().keyword_id(),
            Some(KeywordId::Struct | KeywordId::Enum | KeywordId::Union | KeywordId::Service)
        ) {
            self.discard_declaration(&format!("union `{}`", union_name));
            return Ok(None);
        }
        if self.check_punct(PunctuationId::RBrace) {
            return Err(self.unexpected("expected a union member after annotations"));
        }

        let member = self.plain_field(annotations, docs)?;
        if matches!(member.ty.node, Type::Optional(_) | Type::Array(_)) {
            self.errors.push(CompileError::parse(
                format!(
                    "union member `{}` cannot be optional or repeated (found `{}`)",
                    member.name.node, member.ty.node
                ),
                member.ty.span,
            ));
        }
        Ok(Some(member))
    }

    // ========================================================================
    // Enums
    // ========================================================================

    /// `'enum' Name '{' (NAME '=' int ';')* '}'`
    fn enum_decl(
        &mut self,
        parent: Option<StructId>,
        annotations: Vec<Annotation>,
        docs: Vec<String>,
    ) -> Result<EnumId, CompileError> {
        let start = self.expect_keyword(KeywordId::Enum, "expected `enum`")?.span;
        let name = self.identifier_spanned("expected enum name")?;
        self.expect_punct(PunctuationId::LBrace, "expected `{` after enum name")?;

        let container = format!("enum `{}`", name.node);
        let mut options = Vec::new();
        while !self.check_punct(PunctuationId::RBrace) && !self.is_at_end() {
            let started_at = self.pos;
            match self.enum_option(&container) {
                Ok(Some(option)) => options.push(option),
                Ok(None) => {}
                Err(e) => self.recover(e, started_at),
            }
        }
        let end = self.close_body("enum", start);

        let id = EnumId(self.file.enums.len());
        self.file.enums.push(EnumDecl {
            name,
            parent,
            options,
            annotations,
            docs,
            span: start.merge(end),
        });
        Ok(id)
    }

    fn enum_option(&mut self, container: &str) -> Result<Option<EnumOption>, CompileError> {
        let docs = self.docs_before(self.peek().span.start.line);
        let annotations = self.annotations()?;

        if matches!(
            self.peek().keyword_id(),
            Some(KeywordId::Struct | KeywordId::Enum | KeywordId::Union | KeywordId::Service)
        ) {
            self.discard_declaration(container);
            return Ok(None);
        }
        if self.check_punct(PunctuationId::RBrace) {
            return Err(self.unexpected("expected an enum option after annotations"));
        }

        let name = self.member_name("enum option")?;
        self.expect_punct(PunctuationId::Eq, "expected `=` after enum option name")?;
        let value = self.int32_literal("enum option value")?;
        let end = self
            .expect_punct(PunctuationId::Semi, "expected `;` after enum option")?
            .span;

        Ok(Some(EnumOption {
            span: name.span.merge(end),
            name,
            value,
            annotations,
            docs,
        }))
    }

    // ========================================================================
    // Services
    // ========================================================================

    /// `'service' Name '{' method* '}'`
    fn service_block(&mut self, annotations: Vec<Annotation>, docs: Vec<String>) -> Result<ServiceDecl, CompileError> {
        let start = self.expect_keyword(KeywordId::Service, "expected `service`")?.span;
        let name = self.identifier_spanned("expected service name")?;
        self.expect_punct(PunctuationId::LBrace, "expected `{` after service name")?;

        let container = format!("service `{}`", name.node);
        let mut methods = Vec::new();
        while !self.check_punct(PunctuationId::RBrace) && !self.is_at_end() {
            let started_at = self.pos;
            match self.service_member(&container) {
                Ok(Some(method)) => methods.push(method),
                Ok(None) => {}
                Err(e) => self.recover(e, started_at),
            }
        }
        let end = self.close_body("service", start);

        Ok(ServiceDecl {
            name,
            methods,
            blocks: vec![start.merge(end)],
            annotations,
            docs,
        })
    }

    fn service_member(&mut self, container: &str) -> Result<Option<Method>, CompileError> {
        let docs = self.docs_before(self.peek().span.start.line);
        let annotations = self.annotations()?;

        if matches!(
            self.peek().keyword_id(),
            Some(KeywordId::Struct | KeywordId::Enum | KeywordId::Union | KeywordId::Service)
        ) {
            self.discard_declaration(container);
            return Ok(None);
        }
        if self.check_punct(PunctuationId::RBrace) {
            return Err(self.unexpected("expected a method after annotations"));
        }

        self.method(annotations, docs).map(Some)
    }

    /// `Name '(' params? ')' ('->' (param | '(' params ')'))? ';'`
    fn method(&mut self, annotations: Vec<Annotation>, docs: Vec<String>) -> Result<Method, CompileError> {
        let name = self.identifier_spanned("expected method name")?;
        self.expect_punct(PunctuationId::LParen, "expected `(` after method name")?;

        let mut inputs = Vec::new();
        if !self.check_punct(PunctuationId::RParen) {
            inputs.push(self.method_param()?);
            while self.match_punct(PunctuationId::Comma) {
                inputs.push(self.method_param()?);
            }
        }
        self.expect_punct(PunctuationId::RParen, "expected `)` after method parameters")?;

        let mut outputs = Vec::new();
        if self.match_punct(PunctuationId::Arrow) {
            if self.match_punct(PunctuationId::LParen) {
                outputs.push(self.method_param()?);
                while self.match_punct(PunctuationId::Comma) {
                    outputs.push(self.method_param()?);
                }
                self.expect_punct(PunctuationId::RParen, "expected `)` after method return types")?;
            } else {
                outputs.push(self.method_param()?);
            }
        }

        let end = self
            .expect_punct(PunctuationId::Semi, "expected `;` after method signature")?
            .span;

        Ok(Method {
            span: name.span.merge(end),
            name,
            inputs,
            outputs,
            annotations,
            docs,
        })
    }

    // ========================================================================
    // Illegal nesting
    // ========================================================================

    /// Report a declaration that may not appear in `container`, parse it for its own diagnostics, and roll the
    /// arena back so nothing of it survives.
    fn discard_declaration(&mut self, container: &str) {
        let keyword = self.peek();
        let kind = keyword.keyword_id().map(keywords::as_str).unwrap_or("declaration");
        self.errors.push(CompileError::parse(
            format!("`{}` declarations are not allowed inside {}", kind, container),
            keyword.span,
        ));

        let structs = self.file.structs.len();
        let enums = self.file.enums.len();
        let started_at = self.pos;

        let result = match keyword.keyword_id() {
            Some(KeywordId::Struct) => self.struct_decl(None, Vec::new(), Vec::new()).map(|_| ()),
            Some(KeywordId::Enum) => self.enum_decl(None, Vec::new(), Vec::new()).map(|_| ()),
            Some(KeywordId::Union) => self.union_decl(Vec::new(), Vec::new()).map(|_| ()),
            Some(KeywordId::Service) => self.service_block(Vec::new(), Vec::new()).map(|_| ()),
            _ => Ok(()),
        };
        if let Err(e) = result {
            self.recover(e, started_at);
        }

        self.file.structs.truncate(structs);
        self.file.enums.truncate(enums);
    }
}
