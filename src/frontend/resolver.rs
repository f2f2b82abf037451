//! Type reference resolution
//!
//! Maps each user type reference (`Foo`, `Outer.Inner`, `alias.Foo`, `pkg.sub.Foo`) to the struct or enum it
//! denotes. Results are not written back into the AST; they are kept in a [`Resolutions`] side-table keyed by
//! file and [`TypeRefId`].
//!
//! ## Lookup order
//!
//! 1. A first component naming an import alias of the file is rewritten to the imported file's package and looked
//!    up as a fully-qualified name.
//! 2. A first component equal to the first component of the file's own package is tried as a fully-qualified name.
//! 3. Otherwise the name is searched from the innermost enclosing struct outward, then at file scope, then in the
//!    other files of the same package, then in the root package (files without a `package` declaration).
//! 4. Dotted names finally fall back to the own package as prefix, and then to an absolute lookup.

use std::collections::{BTreeMap, HashMap};

use arf_syntax::ast::{Span, StructId, TypeRef, TypeRefId};
use arf_syntax::diagnostics::CompileError;

use super::program::{FileId, Program};
use super::symbols::{DeclRef, Symbol};

/// The declaration a type reference resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    pub decl: DeclRef,
    pub fqn: String,
}

/// Resolution results for every type reference of a program.
#[derive(Debug, Clone, Default)]
pub struct Resolutions {
    entries: HashMap<(FileId, TypeRefId), ResolvedType>,
}

impl Resolutions {
    pub fn get(&self, file: FileId, type_ref: TypeRefId) -> Option<&ResolvedType> {
        self.entries.get(&(file, type_ref))
    }

    pub(crate) fn insert(&mut self, file: FileId, type_ref: TypeRefId, resolved: ResolvedType) {
        self.entries.insert((file, type_ref), resolved);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Import aliases in effect in each file, explicit (`as name`) or synthesized from the imported package.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    per_file: HashMap<FileId, BTreeMap<String, FileId>>,
}

impl AliasTable {
    pub fn get(&self, file: FileId, alias: &str) -> Option<FileId> {
        self.per_file.get(&file)?.get(alias).copied()
    }

    /// Aliases of `file`, sorted by name.
    pub fn aliases(&self, file: FileId) -> impl Iterator<Item = (&str, FileId)> + '_ {
        self.per_file
            .get(&file)
            .into_iter()
            .flat_map(|m| m.iter().map(|(k, v)| (k.as_str(), *v)))
    }

    /// Record `alias` for `file`. Returns `false` if the alias was already taken.
    pub(crate) fn insert(&mut self, file: FileId, alias: &str, target: FileId) -> bool {
        let aliases = self.per_file.entry(file).or_default();
        if aliases.contains_key(alias) {
            return false;
        }
        aliases.insert(alias.to_string(), target);
        true
    }
}

/// Resolves type references against a loaded program.
pub struct TypeResolver<'p> {
    program: &'p Program,
    aliases: &'p AliasTable,
}

impl<'p> TypeResolver<'p> {
    pub fn new(program: &'p Program, aliases: &'p AliasTable) -> Self {
        Self { program, aliases }
    }

    /// Resolve `type_ref`, written at `span` inside `scope` (the enclosing struct, if any) of `file`.
    ///
    /// ## Errors
    /// Returns a resolution error when the name is undefined or denotes a service or a package.
    pub fn resolve(
        &self,
        file: FileId,
        scope: Option<StructId>,
        type_ref: &TypeRef,
        span: Span,
    ) -> Result<ResolvedType, CompileError> {
        let dotted = type_ref.dotted();
        match self.lookup(file, scope, &type_ref.path) {
            Some(Symbol::Decl(decl)) => {
                let fqn = self.program.fqn_of(decl);
                tracing::trace!(name = %dotted, fqn = %fqn, "resolved type reference");
                Ok(ResolvedType { decl, fqn })
            }
            Some(Symbol::Service(service_file, service)) => Err(CompileError::resolution(
                format!(
                    "cannot use service {} as a type",
                    self.program.service_fqn(service_file, service)
                ),
                span,
            )),
            Some(Symbol::Package(package)) => Err(CompileError::resolution(
                format!("cannot use package {} as a type", package),
                span,
            )),
            None => Err(CompileError::resolution(format!("undefined type {}", dotted), span)),
        }
    }

    /// Find what `path` denotes from inside `scope` of `file`.
    pub fn lookup(&self, file: FileId, scope: Option<StructId>, path: &[String]) -> Option<Symbol> {
        let program = self.program;
        let (first, rest) = path.split_first()?;
        let own_package = program.file(file).package();

        if let Some(target) = self.aliases.get(file, first) {
            let rewritten: Vec<&str> = program
                .file(target)
                .package()
                .split('.')
                .filter(|c| !c.is_empty())
                .chain(rest.iter().map(String::as_str))
                .collect();
            if let Some(symbol) = program.lookup_fqn(&rewritten) {
                return Some(symbol);
            }
        }

        if own_package.split('.').next() == Some(first.as_str()) {
            if let Some(symbol) = program.lookup_fqn(path) {
                return Some(symbol);
            }
        }

        let ast = &program.file(file).ast;
        let mut container = scope;
        while let Some(id) = container {
            if let Some(decl) = program.find_in_struct(file, id, path) {
                return Some(Symbol::Decl(decl));
            }
            container = ast.struct_decl(id).parent;
        }

        if let Some(symbol) = program.find_in_file(file, path) {
            return Some(symbol);
        }
        for &sibling in program.files_in_package(own_package) {
            if sibling == file {
                continue;
            }
            if let Some(symbol) = program.find_in_file(sibling, path) {
                return Some(symbol);
            }
        }
        if !own_package.is_empty() {
            for &root in program.files_in_package("") {
                if let Some(symbol) = program.find_in_file(root, path) {
                    return Some(symbol);
                }
            }
        }

        if rest.is_empty() {
            return None;
        }
        if !own_package.is_empty() {
            let prefixed: Vec<&str> = own_package
                .split('.')
                .chain(path.iter().map(String::as_str))
                .collect();
            if let Some(symbol) = program.lookup_fqn(&prefixed) {
                return Some(symbol);
            }
        }
        program.lookup_fqn(path)
    }
}
