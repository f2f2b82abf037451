//! arf compiler frontend
//!
//! This module contains the semantic half of the frontend:
//! - `module`: source collaborators and import graph loading
//! - `program`: the loaded files, indexed by package
//! - `symbols`: declaration identities and FQN lookup
//! - `resolver`: type reference resolution
//! - `validator`: the three validation phases
//! - `tree`: the validated output
//! - `pipeline`: the `compile` entry points
//! - `diagnostics`: file-qualified diagnostics and the aggregated failure

// Syntax components are provided by the arf_syntax crate.
pub use arf_syntax::{ast, lexer, parser};

pub mod config;
pub mod diagnostics;
pub mod module;
pub mod pipeline;
pub mod program;
pub mod resolver;
pub mod symbols;
pub mod tree;
pub mod validator;

pub use config::{CompileOptions, CycleDetection};
pub use diagnostics::{CompileFailure, FileDiagnostic, Stage};
pub use module::{FsSourceProvider, MemorySourceProvider, SourceError, SourceProvider};
pub use pipeline::{compile, compile_sources, compile_with};
pub use program::{FileId, Program};
pub use tree::{MergedService, MethodRef, PackageImport, PackageTree, ValidatedTree};
