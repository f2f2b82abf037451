//! Semantic validation
//!
//! Three ordered phases run over a fully loaded [`Program`]:
//!
//! - [`declarations`] - local well-formedness: import aliases, FQN clashes, duplicate fields/indices/options/
//!   parameters, naming conventions, stream placement.
//! - [`resolution`] - resolves every type reference and checks map keys and RPC signature types.
//! - [`consistency`] - reopened service signatures and cyclic direct struct references.
//!
//! Each phase collects every problem it finds. The pipeline only starts a phase when the previous one reported
//! nothing, since each phase relies on the invariants the previous one established.

pub mod consistency;
pub mod declarations;
pub mod resolution;

pub use consistency::check_consistency;
pub use declarations::check_declarations;
pub use resolution::resolve_types;

use arf_syntax::ast::Span;
use arf_syntax::diagnostics::CompileError;

use super::diagnostics::FileDiagnostic;
use super::program::{FileId, Program};

/// Diagnostics collected by one phase.
struct Report<'p> {
    program: &'p Program,
    diagnostics: Vec<FileDiagnostic>,
}

impl<'p> Report<'p> {
    fn new(program: &'p Program) -> Self {
        Self {
            program,
            diagnostics: Vec::new(),
        }
    }

    fn push(&mut self, file: FileId, error: CompileError) {
        let path = self.program.file(file).path.clone();
        self.diagnostics.push(FileDiagnostic::new(path, error));
    }

    /// `path:line:column` of `span` in `file`, for messages that mention a second location.
    fn location(&self, file: FileId, span: Span) -> String {
        format!(
            "{}:{}:{}",
            self.program.file(file).path.display(),
            span.start.line,
            span.start.column
        )
    }

    fn finish(self) -> Vec<FileDiagnostic> {
        self.diagnostics
    }
}
