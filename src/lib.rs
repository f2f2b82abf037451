#![forbid(unsafe_code)]
//! arf IDL compiler frontend
//!
//! arf describes structs, enums and RPC services in `.arf` files. This crate loads a program from its entry file
//! and every file it imports, resolves each type reference to the declaration it names and validates the whole
//! program in three phases. The result is a [`ValidatedTree`] indexed by package, ready for code generation.
//!
//! ```no_run
//! let tree = arf::compile("api/main.arf")?;
//! for package in tree.packages() {
//!     println!("{}: {} structs", package.name, package.structs.len());
//! }
//! # Ok::<(), arf::CompileFailure>(())
//! ```
//!
//! ## Panic Policy
//!
//! This codebase follows explicit error handling:
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`. Malformed input never panics: it always produces at least one diagnostic.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **True invariants**: If a panic represents a compiler bug (logic error), use `.expect("INVARIANT: reason")` with a
//!   clear explanation.

pub mod cli;
pub mod frontend;

pub use frontend::ast;
pub use frontend::lexer;
pub use frontend::parser;
pub use frontend::symbols;

pub use frontend::{
    CompileFailure, CompileOptions, CycleDetection, FileDiagnostic, MemorySourceProvider, SourceProvider, Stage,
    ValidatedTree, compile, compile_sources, compile_with,
};
