//! Phase 2: type resolution
//!
//! Resolves every user type reference of every struct field (union members included) and every method
//! parameter and return value, recursively through `array`, `map`, `optional` and `stream`. Two shape rules are
//! checked here because they depend on what a name resolves to:
//! - map keys are primitives other than `bytes`, enums or structs; never `optional`, `array` or `map`
//! - method inputs and outputs are user-defined structs, optionally behind `stream`

use arf_core::lang::primitives;
use arf_syntax::ast::{Spanned, StructId, Type};
use arf_syntax::diagnostics::CompileError;

use super::Report;
use crate::frontend::diagnostics::FileDiagnostic;
use crate::frontend::program::{FileId, Program};
use crate::frontend::resolver::{AliasTable, Resolutions, TypeResolver};

/// Run phase 2. Every reference that resolved is recorded in the returned table, even when other references of
/// the program failed.
#[tracing::instrument(skip_all, fields(files = program.len()))]
pub fn resolve_types(program: &Program, aliases: &AliasTable) -> (Resolutions, Vec<FileDiagnostic>) {
    let mut pass = ResolutionPass {
        resolver: TypeResolver::new(program, aliases),
        resolutions: Resolutions::default(),
        report: Report::new(program),
    };

    for (file, loaded) in program.files() {
        let ast = &loaded.ast;

        for id in ast.struct_ids() {
            for field in &ast.struct_decl(id).fields {
                for plain in field.plain_fields() {
                    pass.resolve(file, Some(id), &plain.ty);
                }
            }
        }

        for id in ast.service_ids() {
            for method in &ast.service(id).methods {
                for param in method.inputs.iter().chain(&method.outputs) {
                    pass.resolve(file, None, &param.ty);
                    pass.check_rpc_type(file, &param.ty);
                }
            }
        }
    }

    let diagnostics = pass.report.finish();
    tracing::debug!(
        resolved = pass.resolutions.len(),
        errors = diagnostics.len(),
        "type resolution finished"
    );
    (pass.resolutions, diagnostics)
}

struct ResolutionPass<'p> {
    resolver: TypeResolver<'p>,
    resolutions: Resolutions,
    report: Report<'p>,
}

impl ResolutionPass<'_> {
    fn resolve(&mut self, file: FileId, scope: Option<StructId>, ty: &Spanned<Type>) {
        match &ty.node {
            Type::Primitive(_) => {}
            Type::Array(inner) | Type::Optional(inner) | Type::Streaming(inner) => self.resolve(file, scope, inner),
            Type::Map(key, value) => {
                self.resolve(file, scope, key);
                self.resolve(file, scope, value);
                if !is_legal_map_key(&key.node) {
                    self.report.push(
                        file,
                        CompileError::resolution(format!("cannot use {} as a map key", key.node), key.span),
                    );
                }
            }
            Type::Simple(type_ref) | Type::Qualified(type_ref) => {
                match self.resolver.resolve(file, scope, type_ref, ty.span) {
                    Ok(resolved) => self.resolutions.insert(file, type_ref.id, resolved),
                    Err(error) => self.report.push(file, error),
                }
            }
        }
    }

    /// Method inputs and outputs must name a struct. References that failed to resolve were already reported.
    fn check_rpc_type(&mut self, file: FileId, ty: &Spanned<Type>) {
        let legal = match ty.node.without_stream().type_ref() {
            Some(type_ref) => match self.resolutions.get(file, type_ref.id) {
                Some(resolved) => resolved.decl.is_struct(),
                None => return,
            },
            None => false,
        };

        if !legal {
            self.report.push(
                file,
                CompileError::resolution(
                    format!(
                        "types used within methods are required to be user-defined structs, cannot use {}",
                        ty.node.without_stream()
                    ),
                    ty.span,
                ),
            );
        }
    }
}

/// Structural part of the map key rule. Any resolved user type is accepted.
fn is_legal_map_key(key: &Type) -> bool {
    match key {
        Type::Primitive(id) => primitives::is_legal_map_key(*id),
        Type::Simple(_) | Type::Qualified(_) => true,
        Type::Array(_) | Type::Map(..) | Type::Optional(_) | Type::Streaming(_) => false,
    }
}
