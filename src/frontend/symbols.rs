//! Declaration identities and fully-qualified name lookup
//!
//! A declaration is identified by the file it lives in and its index in that file's arena ([`DeclRef`]). FQNs are
//! derived, never stored: package name, then the chain of enclosing structs, then the declaration's own name.

use std::fmt;

use arf_syntax::ast::{EnumId, Item, ServiceId, SourceFile, StructId};

use super::program::{FileId, Program};

/// A struct or enum declaration somewhere in the program. These are the only legal targets of a type reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DeclRef {
    Struct(FileId, StructId),
    Enum(FileId, EnumId),
}

impl DeclRef {
    pub fn file(self) -> FileId {
        match self {
            DeclRef::Struct(file, _) | DeclRef::Enum(file, _) => file,
        }
    }

    pub fn is_struct(self) -> bool {
        matches!(self, DeclRef::Struct(..))
    }

    pub fn kind(self) -> &'static str {
        match self {
            DeclRef::Struct(..) => "struct",
            DeclRef::Enum(..) => "enum",
        }
    }
}

/// Anything a dotted name can denote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    Decl(DeclRef),
    Service(FileId, ServiceId),
    Package(String),
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Decl(decl) => write!(f, "{}", decl.kind()),
            Symbol::Service(..) => write!(f, "service"),
            Symbol::Package(_) => write!(f, "package"),
        }
    }
}

/// Join a package name and a relative path. The root package adds no prefix.
pub fn qualify(package: &str, path: &str) -> String {
    if package.is_empty() {
        path.to_string()
    } else {
        format!("{}.{}", package, path)
    }
}

impl Program {
    pub fn fqn_of(&self, decl: DeclRef) -> String {
        let file = self.file(decl.file());
        let path = match decl {
            DeclRef::Struct(_, id) => file.ast.struct_path(id),
            DeclRef::Enum(_, id) => file.ast.enum_path(id),
        };
        qualify(file.package(), &path)
    }

    pub fn service_fqn(&self, file: FileId, service: ServiceId) -> String {
        let file = self.file(file);
        qualify(file.package(), &file.ast.service(service).name.node)
    }

    /// Find `path` among the top-level declarations of `file`, descending through nested structs.
    pub fn find_in_file<S: AsRef<str>>(&self, file: FileId, path: &[S]) -> Option<Symbol> {
        let (first, rest) = path.split_first()?;
        let first = first.as_ref();
        let ast = &self.file(file).ast;

        for item in &ast.items {
            match *item {
                Item::Struct(id) if ast.struct_decl(id).name.node == first => {
                    return if rest.is_empty() {
                        Some(Symbol::Decl(DeclRef::Struct(file, id)))
                    } else {
                        self.find_in_struct(file, id, rest).map(Symbol::Decl)
                    };
                }
                Item::Enum(id) if rest.is_empty() && ast.enum_decl(id).name.node == first => {
                    return Some(Symbol::Decl(DeclRef::Enum(file, id)));
                }
                Item::Service(id) if rest.is_empty() && ast.service(id).name.node == first => {
                    return Some(Symbol::Service(file, id));
                }
                _ => {}
            }
        }
        None
    }

    /// Find `path` among the declarations nested in `container`.
    pub fn find_in_struct<S: AsRef<str>>(&self, file: FileId, container: StructId, path: &[S]) -> Option<DeclRef> {
        let ast = &self.file(file).ast;
        let mut current = container;
        let mut remaining = path;

        loop {
            let (first, rest) = remaining.split_first()?;
            let first = first.as_ref();
            let decl = ast.struct_decl(current);

            if rest.is_empty() {
                if let Some(id) = find_enum(ast, &decl.enums, first) {
                    return Some(DeclRef::Enum(file, id));
                }
                return find_struct(ast, &decl.structs, first).map(|id| DeclRef::Struct(file, id));
            }

            current = find_struct(ast, &decl.structs, first)?;
            remaining = rest;
        }
    }

    /// Resolve an absolute dotted name.
    ///
    /// Package prefixes are tried longest first, down to the root package; the remainder is looked up in every
    /// file of that package. A name that denotes a package itself yields [`Symbol::Package`].
    pub fn lookup_fqn<S: AsRef<str>>(&self, components: &[S]) -> Option<Symbol> {
        for split in (0..components.len()).rev() {
            let package = join(&components[..split]);
            let rest = &components[split..];
            for &file in self.files_in_package(&package) {
                if let Some(symbol) = self.find_in_file(file, rest) {
                    return Some(symbol);
                }
            }
        }

        let whole = join(components);
        if !whole.is_empty() && self.has_package(&whole) {
            return Some(Symbol::Package(whole));
        }
        None
    }
}

fn find_struct(ast: &SourceFile, ids: &[StructId], name: &str) -> Option<StructId> {
    ids.iter().copied().find(|&id| ast.struct_decl(id).name.node == name)
}

fn find_enum(ast: &SourceFile, ids: &[EnumId], name: &str) -> Option<EnumId> {
    ids.iter().copied().find(|&id| ast.enum_decl(id).name.node == name)
}

fn join<S: AsRef<str>>(components: &[S]) -> String {
    components.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(".")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::program::LoadedFile;
    use arf_syntax::{lexer, parser};
    use std::path::PathBuf;

    fn program(sources: &[&str]) -> Program {
        let files = sources
            .iter()
            .enumerate()
            .map(|(i, source)| {
                let tokens = lexer::lex(source).unwrap();
                LoadedFile {
                    path: PathBuf::from(format!("f{}.arf", i)),
                    ast: parser::parse(&tokens).unwrap(),
                    import_targets: Vec::new(),
                }
            })
            .collect();
        Program::new(files)
    }

    #[test]
    fn test_fqn_of_nested_declarations() {
        let program = program(&["package acme.v1;\nstruct Outer { struct Inner { enum Kind { A = 0; } } }"]);
        assert_eq!(program.fqn_of(DeclRef::Struct(FileId(0), StructId(1))), "acme.v1.Outer.Inner");
        assert_eq!(program.fqn_of(DeclRef::Enum(FileId(0), EnumId(0))), "acme.v1.Outer.Inner.Kind");
    }

    #[test]
    fn test_root_package_fqn_has_no_prefix() {
        let program = program(&["struct S {}"]);
        assert_eq!(program.fqn_of(DeclRef::Struct(FileId(0), StructId(0))), "S");
    }

    #[test]
    fn test_lookup_fqn_prefers_longest_package() {
        let program = program(&[
            "package a;\nstruct b { struct C {} }",
            "package a.b;\nstruct C {}",
            "package x;\nservice Api {}",
        ]);
        assert_eq!(
            program.lookup_fqn(&["a", "b", "C"]),
            Some(Symbol::Decl(DeclRef::Struct(FileId(1), StructId(0))))
        );
        assert_eq!(program.lookup_fqn(&["x", "Api"]), Some(Symbol::Service(FileId(2), ServiceId(0))));
        assert_eq!(program.lookup_fqn(&["a", "b"]), Some(Symbol::Decl(DeclRef::Struct(FileId(0), StructId(0)))));
        assert_eq!(program.lookup_fqn(&["x"]), Some(Symbol::Package("x".into())));
        assert_eq!(program.lookup_fqn(&["a", "Missing"]), None);
    }

    #[test]
    fn test_find_in_struct() {
        let program = program(&["struct A { struct B { enum E { X = 0; } } }"]);
        assert_eq!(
            program.find_in_struct(FileId(0), StructId(0), &["B", "E"]),
            Some(DeclRef::Enum(FileId(0), EnumId(0)))
        );
        assert_eq!(program.find_in_struct(FileId(0), StructId(0), &["E"]), None);
    }
}
