//! Abstract Syntax Tree definitions for arf
//!
//! A parsed file is an arena: every struct, enum and service lives in a flat `Vec` on [`SourceFile`] and is
//! addressed by a small integer id. Nesting is recorded through ids (`StructDecl::structs`, `StructDecl::parent`),
//! never through pointers, so a file can be cloned or moved freely and FQN computation is an upward walk over
//! `parent` ids.
//!
//! Type references carry a [`TypeRefId`] that is unique within their file. Resolution results are kept in a side
//! table keyed by that id (see the `arf` crate's resolver); nodes are never mutated after parsing.

use std::fmt;

use arf_core::lang::primitives::{self, PrimitiveId};

// ============================================================================
// Positions
// ============================================================================

/// A 1-based `(line, column)` position in source text. Columns count characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Source location span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// A zero-width span at `pos`.
    pub fn at(pos: Position) -> Self {
        Self { start: pos, end: pos }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// A node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

pub type Ident = String;

// ============================================================================
// Arena ids
// ============================================================================

/// Index of a struct in [`SourceFile::structs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StructId(pub usize);

/// Index of an enum in [`SourceFile::enums`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EnumId(pub usize);

/// Index of a service in [`SourceFile::services`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServiceId(pub usize);

/// Identity of one user-type reference within a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeRefId(pub usize);

// ============================================================================
// File
// ============================================================================

/// One parsed source unit.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SourceFile {
    pub package: Option<PackageDecl>,
    pub imports: Vec<ImportDecl>,
    /// Top-level declarations in source order. Reopened services appear once, at their first block.
    pub items: Vec<Item>,
    pub structs: Vec<StructDecl>,
    pub enums: Vec<EnumDecl>,
    pub services: Vec<ServiceDecl>,
    /// Number of [`TypeRefId`]s handed out while parsing this file.
    pub type_ref_count: usize,
}

/// A top-level declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Item {
    Struct(StructId),
    Enum(EnumId),
    Service(ServiceId),
}

impl SourceFile {
    /// Dotted package name, or `""` for a file without a `package` declaration.
    pub fn package_name(&self) -> &str {
        self.package.as_ref().map(|p| p.name.as_str()).unwrap_or("")
    }

    pub fn struct_decl(&self, id: StructId) -> &StructDecl {
        &self.structs[id.0]
    }

    pub fn enum_decl(&self, id: EnumId) -> &EnumDecl {
        &self.enums[id.0]
    }

    pub fn service(&self, id: ServiceId) -> &ServiceDecl {
        &self.services[id.0]
    }

    /// Structs declared at file scope.
    pub fn top_level_structs(&self) -> impl Iterator<Item = StructId> + '_ {
        self.items.iter().filter_map(|item| match item {
            Item::Struct(id) => Some(*id),
            _ => None,
        })
    }

    /// Enums declared at file scope.
    pub fn top_level_enums(&self) -> impl Iterator<Item = EnumId> + '_ {
        self.items.iter().filter_map(|item| match item {
            Item::Enum(id) => Some(*id),
            _ => None,
        })
    }

    pub fn struct_ids(&self) -> impl Iterator<Item = StructId> + '_ {
        (0..self.structs.len()).map(StructId)
    }

    pub fn enum_ids(&self) -> impl Iterator<Item = EnumId> + '_ {
        (0..self.enums.len()).map(EnumId)
    }

    pub fn service_ids(&self) -> impl Iterator<Item = ServiceId> + '_ {
        (0..self.services.len()).map(ServiceId)
    }

    /// Names of the structs enclosing `parent`, outermost first, followed by `name`.
    pub fn nested_path<'a>(&'a self, parent: Option<StructId>, name: &'a str) -> Vec<&'a str> {
        let mut path = vec![name];
        let mut current = parent;
        while let Some(id) = current {
            let decl = self.struct_decl(id);
            path.push(decl.name.node.as_str());
            current = decl.parent;
        }
        path.reverse();
        path
    }

    /// Dotted path of a struct relative to its package (`Outer.Inner`).
    pub fn struct_path(&self, id: StructId) -> String {
        let decl = self.struct_decl(id);
        self.nested_path(decl.parent, &decl.name.node).join(".")
    }

    /// Dotted path of an enum relative to its package (`Outer.Kind`).
    pub fn enum_path(&self, id: EnumId) -> String {
        let decl = self.enum_decl(id);
        self.nested_path(decl.parent, &decl.name.node).join(".")
    }
}

// ============================================================================
// Package / imports / annotations
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct PackageDecl {
    pub components: Vec<Spanned<Ident>>,
    /// Components joined with `.`.
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    /// The import literal as written, without quotes.
    pub path: Spanned<String>,
    pub alias: Option<Spanned<Ident>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Int(i64),
    String(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int(n) => write!(f, "{}", n),
            Literal::String(s) => write!(f, "{:?}", s),
        }
    }
}

/// `@name` or `@name(arg, ...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub name: Spanned<Ident>,
    pub args: Vec<Spanned<Literal>>,
    pub span: Span,
}

// ============================================================================
// Structs and fields
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    pub name: Spanned<Ident>,
    /// Enclosing struct, `None` at file scope.
    pub parent: Option<StructId>,
    pub fields: Vec<Field>,
    pub structs: Vec<StructId>,
    pub enums: Vec<EnumId>,
    pub annotations: Vec<Annotation>,
    pub docs: Vec<String>,
    pub span: Span,
}

/// A struct member: a single typed field or a union of alternatives.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Plain(PlainField),
    Union(UnionField),
}

impl Field {
    pub fn name(&self) -> &Spanned<Ident> {
        match self {
            Field::Plain(f) => &f.name,
            Field::Union(u) => &u.name,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Field::Plain(f) => f.span,
            Field::Union(u) => u.span,
        }
    }

    /// The plain fields carried by this member: itself, or every union alternative.
    pub fn plain_fields(&self) -> &[PlainField] {
        match self {
            Field::Plain(f) => std::slice::from_ref(f),
            Field::Union(u) => &u.members,
        }
    }
}

/// `name Type (= index)? ;`
#[derive(Debug, Clone, PartialEq)]
pub struct PlainField {
    pub name: Spanned<Ident>,
    pub ty: Spanned<Type>,
    pub index: Option<Spanned<i32>>,
    pub annotations: Vec<Annotation>,
    pub docs: Vec<String>,
    pub span: Span,
}

/// `union Name { member* }`
#[derive(Debug, Clone, PartialEq)]
pub struct UnionField {
    pub name: Spanned<Ident>,
    pub members: Vec<PlainField>,
    pub annotations: Vec<Annotation>,
    pub docs: Vec<String>,
    pub span: Span,
}

// ============================================================================
// Enums
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub name: Spanned<Ident>,
    pub parent: Option<StructId>,
    pub options: Vec<EnumOption>,
    pub annotations: Vec<Annotation>,
    pub docs: Vec<String>,
    pub span: Span,
}

/// `NAME = value ;`
#[derive(Debug, Clone, PartialEq)]
pub struct EnumOption {
    pub name: Spanned<Ident>,
    pub value: Spanned<i32>,
    pub annotations: Vec<Annotation>,
    pub docs: Vec<String>,
    pub span: Span,
}

// ============================================================================
// Services
// ============================================================================

/// A service, with the methods of every `service X { ... }` block of the same name in this file appended in
/// source order.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceDecl {
    pub name: Spanned<Ident>,
    pub methods: Vec<Method>,
    /// Span of each textual block, in source order.
    pub blocks: Vec<Span>,
    pub annotations: Vec<Annotation>,
    pub docs: Vec<String>,
}

impl ServiceDecl {
    pub fn span(&self) -> Span {
        self.blocks.first().copied().unwrap_or(self.name.span)
    }
}

/// `Name(params) (-> returns)? ;`
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: Spanned<Ident>,
    pub inputs: Vec<MethodParam>,
    pub outputs: Vec<MethodParam>,
    pub annotations: Vec<Annotation>,
    pub docs: Vec<String>,
    pub span: Span,
}

/// One input or output of a method. Stream parameters never carry a name.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodParam {
    pub name: Option<Spanned<Ident>>,
    pub ty: Spanned<Type>,
    pub span: Span,
}

impl MethodParam {
    pub fn is_streaming(&self) -> bool {
        matches!(self.ty.node, Type::Streaming(_))
    }
}

// ============================================================================
// Types
// ============================================================================

/// A reference to a user-declared struct or enum, as written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeRef {
    pub id: TypeRefId,
    pub path: Vec<Ident>,
}

impl TypeRef {
    pub fn dotted(&self) -> String {
        self.path.join(".")
    }
}

/// Type expressions (closed set).
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Primitive(PrimitiveId),
    Array(Box<Spanned<Type>>),
    Map(Box<Spanned<Type>>, Box<Spanned<Type>>),
    Optional(Box<Spanned<Type>>),
    /// Only produced by the `stream` prefix of a method parameter or return.
    Streaming(Box<Spanned<Type>>),
    /// A single-component name, resolved relative to the enclosing scope.
    Simple(TypeRef),
    /// A dotted name (`pkg.Outer.Inner` or `alias.Name`).
    Qualified(TypeRef),
}

impl Type {
    /// The user-type reference, if this type is one.
    pub fn type_ref(&self) -> Option<&TypeRef> {
        match self {
            Type::Simple(r) | Type::Qualified(r) => Some(r),
            _ => None,
        }
    }

    /// Strip a `stream` wrapper.
    pub fn without_stream(&self) -> &Type {
        match self {
            Type::Streaming(inner) => &inner.node,
            other => other,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(id) => write!(f, "{}", primitives::as_str(*id)),
            Type::Array(inner) => write!(f, "array<{}>", inner.node),
            Type::Map(k, v) => write!(f, "map<{}, {}>", k.node, v.node),
            Type::Optional(inner) => write!(f, "optional<{}>", inner.node),
            Type::Streaming(inner) => write!(f, "stream {}", inner.node),
            Type::Simple(r) | Type::Qualified(r) => write!(f, "{}", r.dotted()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spanned<T>(node: T) -> Spanned<T> {
        Spanned::new(node, Span::default())
    }

    #[test]
    fn test_type_display() {
        let key = spanned(Type::Primitive(PrimitiveId::String));
        let value = spanned(Type::Qualified(TypeRef {
            id: TypeRefId(0),
            path: vec!["common".into(), "Contact".into()],
        }));
        let ty = Type::Optional(Box::new(spanned(Type::Map(Box::new(key), Box::new(value)))));
        assert_eq!(ty.to_string(), "optional<map<string, common.Contact>>");
    }

    #[test]
    fn test_span_merge() {
        let a = Span::new(Position::new(1, 5), Position::new(1, 9));
        let b = Span::new(Position::new(2, 1), Position::new(2, 3));
        assert_eq!(a.merge(b), Span::new(Position::new(1, 5), Position::new(2, 3)));
    }

    #[test]
    fn test_nested_path() {
        let mut file = SourceFile::default();
        let outer = StructDecl {
            name: spanned("Outer".to_string()),
            parent: None,
            fields: Vec::new(),
            structs: vec![StructId(1)],
            enums: Vec::new(),
            annotations: Vec::new(),
            docs: Vec::new(),
            span: Span::default(),
        };
        let inner = StructDecl {
            name: spanned("Inner".to_string()),
            parent: Some(StructId(0)),
            structs: Vec::new(),
            ..outer.clone()
        };
        file.structs = vec![outer, inner];
        assert_eq!(file.struct_path(StructId(1)), "Outer.Inner");
        assert_eq!(file.nested_path(Some(StructId(1)), "Kind"), vec!["Outer", "Inner", "Kind"]);
    }
}
