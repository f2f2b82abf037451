//! The validated output of a compilation
//!
//! [`ValidatedTree`] owns every parsed file together with the resolution side-table, and indexes the declarations
//! by package. Reopened services are merged into one [`MergedService`] per FQN, with repeated identical methods
//! collapsed to their first declaration.

use std::collections::{BTreeMap, HashMap, HashSet};

use arf_syntax::ast::{EnumDecl, EnumId, Method, ServiceId, Span, StructDecl, StructId, TypeRefId};

use super::program::{FileId, Program};
use super::resolver::{AliasTable, ResolvedType, Resolutions};
use super::symbols::{DeclRef, qualify};

/// A fully validated program.
#[derive(Debug, Clone)]
pub struct ValidatedTree {
    program: Program,
    aliases: AliasTable,
    resolutions: Resolutions,
    packages: BTreeMap<String, PackageTree>,
}

/// Everything the files of one package declare.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageTree {
    /// Dotted package name, `""` for the root package.
    pub name: String,
    pub files: Vec<FileId>,
    /// Every struct of the package, nested ones included, in file then source order.
    pub structs: Vec<DeclRef>,
    pub enums: Vec<DeclRef>,
    pub services: Vec<MergedService>,
    pub imports: Vec<PackageImport>,
}

/// One logical service: every block declaring the same FQN, across files.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedService {
    pub name: String,
    pub fqn: String,
    pub blocks: Vec<(FileId, Span)>,
    pub methods: Vec<MethodRef>,
}

/// Address of a method inside a file's service arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodRef {
    pub file: FileId,
    pub service: ServiceId,
    pub index: usize,
}

/// An import of one of the package's files.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageImport {
    pub file: FileId,
    /// The import literal as written.
    pub path: String,
    pub target: FileId,
    /// The alias the import binds, explicit or synthesized. Imports of root-package files bind none.
    pub alias: Option<String>,
}

impl ValidatedTree {
    pub(crate) fn build(program: Program, aliases: AliasTable, resolutions: Resolutions) -> Self {
        let packages = program
            .package_names()
            .map(|name| (name.to_string(), package_tree(&program, name)))
            .collect();

        Self {
            program,
            aliases,
            resolutions,
            packages,
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn resolutions(&self) -> &Resolutions {
        &self.resolutions
    }

    /// Packages ordered by name.
    pub fn packages(&self) -> impl Iterator<Item = &PackageTree> + '_ {
        self.packages.values()
    }

    pub fn package(&self, name: &str) -> Option<&PackageTree> {
        self.packages.get(name)
    }

    pub fn resolved(&self, file: FileId, type_ref: TypeRefId) -> Option<&ResolvedType> {
        self.resolutions.get(file, type_ref)
    }

    pub fn fqn_of(&self, decl: DeclRef) -> String {
        self.program.fqn_of(decl)
    }

    pub fn struct_decl(&self, file: FileId, id: StructId) -> &StructDecl {
        self.program.file(file).ast.struct_decl(id)
    }

    pub fn enum_decl(&self, file: FileId, id: EnumId) -> &EnumDecl {
        self.program.file(file).ast.enum_decl(id)
    }

    pub fn method(&self, method: MethodRef) -> &Method {
        &self.program.file(method.file).ast.service(method.service).methods[method.index]
    }
}

fn package_tree(program: &Program, name: &str) -> PackageTree {
    let files = program.files_in_package(name).to_vec();
    let mut structs = Vec::new();
    let mut enums = Vec::new();
    let mut services: Vec<MergedService> = Vec::new();
    let mut by_name: HashMap<&str, usize> = HashMap::new();
    let mut merged_methods: HashSet<(usize, &str)> = HashSet::new();
    let mut imports = Vec::new();

    for &file in &files {
        let loaded = program.file(file);
        let ast = &loaded.ast;

        structs.extend(ast.struct_ids().map(|id| DeclRef::Struct(file, id)));
        enums.extend(ast.enum_ids().map(|id| DeclRef::Enum(file, id)));

        for id in ast.service_ids() {
            let decl = ast.service(id);
            let slot = *by_name.entry(decl.name.node.as_str()).or_insert_with(|| {
                services.push(MergedService {
                    name: decl.name.node.clone(),
                    fqn: qualify(name, &decl.name.node),
                    blocks: Vec::new(),
                    methods: Vec::new(),
                });
                services.len() - 1
            });

            let service = &mut services[slot];
            service.blocks.extend(decl.blocks.iter().map(|&span| (file, span)));
            for (index, method) in decl.methods.iter().enumerate() {
                if merged_methods.insert((slot, method.name.node.as_str())) {
                    service.methods.push(MethodRef { file, service: id, index });
                }
            }
        }

        for (import, target) in ast.imports.iter().zip(&loaded.import_targets) {
            let Some(target) = *target else { continue };
            let alias = match &import.alias {
                Some(alias) => Some(alias.node.clone()),
                None => program
                    .file(target)
                    .package()
                    .rsplit('.')
                    .next()
                    .filter(|last| !last.is_empty())
                    .map(str::to_string),
            };
            imports.push(PackageImport {
                file,
                path: import.path.node.clone(),
                target,
                alias,
            });
        }
    }

    tracing::trace!(
        package = name,
        structs = structs.len(),
        enums = enums.len(),
        services = services.len(),
        "indexed package"
    );

    PackageTree {
        name: name.to_string(),
        files,
        structs,
        enums,
        services,
        imports,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::config::CycleDetection;
    use crate::frontend::validator::test_support::load_files;
    use crate::frontend::validator::{check_consistency, check_declarations, resolve_types};

    fn tree(files: &[(&str, &str)]) -> ValidatedTree {
        let program = load_files(files);
        let (aliases, diagnostics) = check_declarations(&program);
        assert!(diagnostics.is_empty());
        let (resolutions, diagnostics) = resolve_types(&program, &aliases);
        assert!(diagnostics.is_empty());
        assert!(check_consistency(&program, &resolutions, CycleDetection::Full).is_empty());
        ValidatedTree::build(program, aliases, resolutions)
    }

    #[test]
    fn test_packages_group_files() {
        let tree = tree(&[
            ("main.arf", "package p;\nimport \"more\";\nimport \"util\";\nstruct A { b B; }\n"),
            ("more.arf", "package p;\nstruct B { enum Kind { X = 0; } }\n"),
            ("util.arf", "struct Util {}\n"),
        ]);

        let names: Vec<&str> = tree.packages().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["", "p"]);

        let p = tree.package("p").unwrap();
        assert_eq!(p.files, [FileId(0), FileId(1)]);
        let structs: Vec<String> = p.structs.iter().map(|&d| tree.fqn_of(d)).collect();
        assert_eq!(structs, ["p.A", "p.B"]);
        assert_eq!(tree.fqn_of(p.enums[0]), "p.B.Kind");

        assert_eq!(p.imports.len(), 2);
        assert_eq!(p.imports[0].alias.as_deref(), Some("p"));
        assert_eq!(p.imports[1].alias, None);
    }

    #[test]
    fn test_reopened_services_are_merged() {
        let tree = tree(&[
            ("main.arf", "package p;\nimport \"more\";\nstruct S {}\nservice Api { Get(S); }\nservice Api { Get(S); Put(S); }\n"),
            ("more.arf", "package p;\nservice Api { Delete(S); Get(S); }\n"),
        ]);

        let p = tree.package("p").unwrap();
        assert_eq!(p.services.len(), 1);
        let api = &p.services[0];
        assert_eq!(api.fqn, "p.Api");
        assert_eq!(api.blocks.len(), 3);
        let methods: Vec<&str> = api.methods.iter().map(|&m| tree.method(m).name.node.as_str()).collect();
        assert_eq!(methods, ["Get", "Put", "Delete"]);
        assert_eq!(api.methods[0].file, FileId(0));
    }
}
