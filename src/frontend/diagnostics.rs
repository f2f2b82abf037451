//! Diagnostics reported by a compilation
//!
//! Every [`CompileError`] produced by the syntax crate or a validator phase is paired with the path of the file it
//! belongs to. A compilation that fails returns a [`CompileFailure`] naming the stage that stopped it.

use std::fmt;
use std::path::PathBuf;

use arf_syntax::diagnostics::CompileError;
use miette::Diagnostic;
use thiserror::Error;

/// A [`CompileError`] located in a specific file.
///
/// Renders as `path:line:column: message`.
#[derive(Debug, Clone, PartialEq)]
pub struct FileDiagnostic {
    pub path: PathBuf,
    pub error: CompileError,
}

impl FileDiagnostic {
    pub fn new(path: impl Into<PathBuf>, error: CompileError) -> Self {
        Self {
            path: path.into(),
            error,
        }
    }

    pub fn message(&self) -> &str {
        &self.error.message
    }

    pub fn line(&self) -> usize {
        self.error.span.start.line
    }

    pub fn column(&self) -> usize {
        self.error.span.start.column
    }
}

impl fmt::Display for FileDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}",
            self.path.display(),
            self.line(),
            self.column(),
            self.error.message
        )
    }
}

/// The point at which a compilation stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Reading, lexing and parsing the import graph.
    Load,
    /// Phase 1: local well-formedness.
    Declarations,
    /// Phase 2: cross-file type resolution.
    Resolution,
    /// Phase 3: whole-program consistency.
    Consistency,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Load => write!(f, "load"),
            Stage::Declarations => write!(f, "declarations"),
            Stage::Resolution => write!(f, "resolution"),
            Stage::Consistency => write!(f, "consistency"),
        }
    }
}

/// Aggregated failure of a compilation.
///
/// Each variant holds every diagnostic of the stage that failed; later stages never ran. `Display` renders the
/// diagnostics newline-joined.
#[derive(Debug, Clone, Error, Diagnostic)]
pub enum CompileFailure {
    #[error("{}", render(.0))]
    #[diagnostic(code(arf::load), help("fix the syntax and import errors listed above"))]
    Load(Vec<FileDiagnostic>),

    #[error("{}", render(.0))]
    #[diagnostic(code(arf::declarations))]
    Declarations(Vec<FileDiagnostic>),

    #[error("{}", render(.0))]
    #[diagnostic(code(arf::resolution))]
    Resolution(Vec<FileDiagnostic>),

    #[error("{}", render(.0))]
    #[diagnostic(code(arf::consistency))]
    Consistency(Vec<FileDiagnostic>),
}

impl CompileFailure {
    pub(crate) fn at(stage: Stage, diagnostics: Vec<FileDiagnostic>) -> Self {
        match stage {
            Stage::Load => CompileFailure::Load(diagnostics),
            Stage::Declarations => CompileFailure::Declarations(diagnostics),
            Stage::Resolution => CompileFailure::Resolution(diagnostics),
            Stage::Consistency => CompileFailure::Consistency(diagnostics),
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            CompileFailure::Load(_) => Stage::Load,
            CompileFailure::Declarations(_) => Stage::Declarations,
            CompileFailure::Resolution(_) => Stage::Resolution,
            CompileFailure::Consistency(_) => Stage::Consistency,
        }
    }

    pub fn diagnostics(&self) -> &[FileDiagnostic] {
        match self {
            CompileFailure::Load(d)
            | CompileFailure::Declarations(d)
            | CompileFailure::Resolution(d)
            | CompileFailure::Consistency(d) => d,
        }
    }

    pub fn into_diagnostics(self) -> Vec<FileDiagnostic> {
        match self {
            CompileFailure::Load(d)
            | CompileFailure::Declarations(d)
            | CompileFailure::Resolution(d)
            | CompileFailure::Consistency(d) => d,
        }
    }
}

fn render(diagnostics: &[FileDiagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}
