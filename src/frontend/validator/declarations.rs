//! Phase 1: local well-formedness
//!
//! Checks everything that can be decided without resolving type references:
//! - import aliases (explicit or synthesized from the imported package) are unique per file
//! - every struct, enum and service FQN is declared once across the program (services may be reopened)
//! - fields, field indices, enum options and method parameters are unique within their declaration
//! - naming conventions and reserved words
//! - at most one stream parameter and one stream return value per method, each in last position

use std::collections::HashMap;

use arf_core::lang::conventions::{self, NamingConvention};
use arf_syntax::ast::{EnumId, Field, Ident, Method, MethodParam, PlainField, ServiceId, Span, Spanned, StructId};
use arf_syntax::diagnostics::CompileError;

use super::Report;
use crate::frontend::diagnostics::FileDiagnostic;
use crate::frontend::program::{FileId, Program};
use crate::frontend::resolver::AliasTable;
use crate::frontend::symbols::qualify;

/// Run phase 1. Returns the import alias table built on the way, together with every violation found.
#[tracing::instrument(skip_all, fields(files = program.len()))]
pub fn check_declarations(program: &Program) -> (AliasTable, Vec<FileDiagnostic>) {
    let mut checker = DeclarationChecker {
        program,
        report: Report::new(program),
    };

    let aliases = checker.import_aliases();
    checker.fqn_clashes();

    for (file, loaded) in program.files() {
        for id in loaded.ast.struct_ids() {
            checker.check_struct(file, id);
        }
        for id in loaded.ast.enum_ids() {
            checker.check_enum(file, id);
        }
        for id in loaded.ast.service_ids() {
            checker.check_service(file, id);
        }
    }

    let diagnostics = checker.report.finish();
    tracing::debug!(errors = diagnostics.len(), "declaration checks finished");
    (aliases, diagnostics)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclKind {
    Struct,
    Enum,
    Service,
}

struct DeclarationChecker<'p> {
    program: &'p Program,
    report: Report<'p>,
}

impl<'p> DeclarationChecker<'p> {
    // ========================================================================
    // Imports and FQNs
    // ========================================================================

    fn import_aliases(&mut self) -> AliasTable {
        let mut table = AliasTable::default();

        let program = self.program;
        for (file, loaded) in program.files() {
            for (import, target) in loaded.ast.imports.iter().zip(&loaded.import_targets) {
                let Some(target) = *target else { continue };

                let (alias, span) = match &import.alias {
                    Some(alias) => (alias.node.as_str(), alias.span),
                    None => match program.file(target).package().rsplit('.').next() {
                        Some(last) if !last.is_empty() => (last, import.span),
                        // Nothing to synthesize an alias from: the file is in the root package.
                        _ => continue,
                    },
                };

                if !table.insert(file, alias, target) {
                    self.report
                        .push(file, CompileError::import(format!("duplicate import alias `{}`", alias), span));
                }
            }
        }

        table
    }

    fn fqn_clashes(&mut self) {
        let program = self.program;
        let mut seen: HashMap<String, (DeclKind, FileId, Span)> = HashMap::new();

        for (file, loaded) in program.files() {
            let ast = &loaded.ast;
            let package = loaded.package();

            let structs = ast
                .struct_ids()
                .map(|id| (DeclKind::Struct, ast.struct_path(id), ast.struct_decl(id).name.span));
            let enums = ast
                .enum_ids()
                .map(|id| (DeclKind::Enum, ast.enum_path(id), ast.enum_decl(id).name.span));
            let services = ast
                .service_ids()
                .map(|id| (DeclKind::Service, ast.service(id).name.node.clone(), ast.service(id).name.span));

            for (kind, path, span) in structs.chain(enums).chain(services) {
                let fqn = qualify(package, &path);
                match seen.get(&fqn) {
                    None => {
                        seen.insert(fqn, (kind, file, span));
                    }
                    // Reopening a service in another file is checked in phase 3.
                    Some((DeclKind::Service, _, _)) if kind == DeclKind::Service => {}
                    Some(&(_, first_file, first_span)) => {
                        let location = self.report.location(first_file, first_span);
                        self.report.push(
                            file,
                            CompileError::semantic(format!("{} is already defined at {}", fqn, location), span),
                        );
                    }
                }
            }
        }
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    fn check_struct(&mut self, file: FileId, id: StructId) {
        let program = self.program;
        let decl = program.file(file).ast.struct_decl(id);
        let struct_name = decl.name.node.as_str();
        self.check_name(file, "struct", &decl.name, NamingConvention::CamelCase);

        // Plain fields, unions and union members share one namespace.
        let mut names: HashMap<&str, Span> = HashMap::new();
        let mut indices: HashMap<i32, (&str, Span)> = HashMap::new();

        for field in &decl.fields {
            if let Field::Union(union) = field {
                self.claim_name(file, struct_name, &union.name, &mut names);
                self.check_name(file, "union", &union.name, NamingConvention::SnakeCase);
            }

            for plain in field.plain_fields() {
                self.claim_name(file, struct_name, &plain.name, &mut names);
                self.check_name(file, "field", &plain.name, NamingConvention::SnakeCase);
                self.claim_index(file, struct_name, plain, &mut indices);
            }
        }
    }

    fn claim_name(
        &mut self,
        file: FileId,
        struct_name: &str,
        name: &'p Spanned<Ident>,
        names: &mut HashMap<&'p str, Span>,
    ) {
        match names.get(name.node.as_str()) {
            Some(&first) => {
                let location = self.report.location(file, first);
                self.report.push(
                    file,
                    CompileError::semantic(
                        format!(
                            "field `{}` is already defined in struct `{}` at {}",
                            name.node, struct_name, location
                        ),
                        name.span,
                    ),
                );
            }
            None => {
                names.insert(name.node.as_str(), name.span);
            }
        }
    }

    fn claim_index(
        &mut self,
        file: FileId,
        struct_name: &str,
        field: &'p PlainField,
        indices: &mut HashMap<i32, (&'p str, Span)>,
    ) {
        let Some(index) = &field.index else { return };

        match indices.get(&index.node) {
            Some(&(owner, first)) => {
                let location = self.report.location(file, first);
                self.report.push(
                    file,
                    CompileError::semantic(
                        format!(
                            "field index {} of `{}` is already used by `{}` in struct `{}` at {}",
                            index.node, field.name.node, owner, struct_name, location
                        ),
                        index.span,
                    ),
                );
            }
            None => {
                indices.insert(index.node, (field.name.node.as_str(), index.span));
            }
        }
    }

    fn check_enum(&mut self, file: FileId, id: EnumId) {
        let program = self.program;
        let decl = program.file(file).ast.enum_decl(id);
        self.check_name(file, "enum", &decl.name, NamingConvention::CamelCase);

        if decl.options.is_empty() {
            self.report.push(
                file,
                CompileError::semantic(
                    format!("enum `{}` must have at least one option", decl.name.node),
                    decl.name.span,
                ),
            );
        }

        let mut names: HashMap<&str, Span> = HashMap::new();
        for option in &decl.options {
            self.check_name(file, "enum option", &option.name, NamingConvention::ScreamingSnakeCase);

            // Duplicate values are allowed: they alias each other.
            if let Some(&first) = names.get(option.name.node.as_str()) {
                let location = self.report.location(file, first);
                self.report.push(
                    file,
                    CompileError::semantic(
                        format!(
                            "option `{}` is already defined in enum `{}` at {}",
                            option.name.node, decl.name.node, location
                        ),
                        option.name.span,
                    ),
                );
            } else {
                names.insert(option.name.node.as_str(), option.name.span);
            }
        }
    }

    fn check_service(&mut self, file: FileId, id: ServiceId) {
        let program = self.program;
        let service = program.file(file).ast.service(id);
        self.check_name(file, "service", &service.name, NamingConvention::CamelCase);

        for method in &service.methods {
            self.check_name(file, "method", &method.name, NamingConvention::MethodCase);
            self.check_params(file, method, &method.inputs, "parameter");
            self.check_params(file, method, &method.outputs, "return value");
        }
    }

    /// Checks one side (inputs or outputs) of a method signature.
    fn check_params(&mut self, file: FileId, method: &Method, params: &[MethodParam], what: &str) {
        let method_name = &method.name.node;

        let streams: Vec<&MethodParam> = params.iter().filter(|p| p.is_streaming()).collect();
        if let Some(extra) = streams.get(1) {
            self.report.push(
                file,
                CompileError::semantic(
                    format!("method `{}` can only have one stream {}", method_name, what),
                    extra.span,
                ),
            );
        } else if let (Some(stream), Some(last)) = (streams.first(), params.last()) {
            if !std::ptr::eq(*stream, last) {
                self.report.push(
                    file,
                    CompileError::semantic(
                        format!("the stream {} of method `{}` must be the last one", what, method_name),
                        stream.span,
                    ),
                );
            }
        }

        let plain: Vec<&MethodParam> = params.iter().filter(|p| !p.is_streaming()).collect();
        let named = plain.iter().filter(|p| p.name.is_some()).count();
        if named != 0 && named != plain.len() {
            let first_unnamed = plain.iter().find(|p| p.name.is_none()).map_or(method.span, |p| p.span);
            self.report.push(
                file,
                CompileError::semantic(
                    format!("{}s of method `{}` must be either all named or all unnamed", what, method_name),
                    first_unnamed,
                ),
            );
        }

        let mut seen: HashMap<&str, Span> = HashMap::new();
        for name in params.iter().filter_map(|p| p.name.as_ref()) {
            if seen.insert(name.node.as_str(), name.span).is_some() {
                self.report.push(
                    file,
                    CompileError::semantic(
                        format!("duplicate {} name `{}` in method `{}`", what, name.node, method_name),
                        name.span,
                    ),
                );
            }
            self.check_name(file, what, name, NamingConvention::SnakeCase);
        }
    }

    // ========================================================================
    // Naming
    // ========================================================================

    fn check_name(&mut self, file: FileId, what: &str, name: &Spanned<Ident>, convention: NamingConvention) {
        let message = if conventions::is_reserved(&name.node) {
            format!("`{}` is a reserved word and cannot be used as a {} name", name.node, what)
        } else if !convention.accepts(&name.node) {
            format!("{} name `{}` must be {}", what, name.node, convention.describe())
        } else {
            return;
        };
        self.report.push(file, CompileError::semantic(message, name.span));
    }
}
