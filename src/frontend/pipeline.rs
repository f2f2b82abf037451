//! The `compile` entry point
//!
//! ```text
//! entry path ─► load import graph ─► phase 1 ─► phase 2 ─► phase 3 ─► ValidatedTree
//!                 (lex + parse)     declarations resolution consistency
//! ```
//!
//! Each stage collects every diagnostic it can find; the pipeline stops after the first stage that reported any.

use std::path::Path;

use super::config::CompileOptions;
use super::diagnostics::{CompileFailure, FileDiagnostic, Stage};
use super::module::{FsSourceProvider, ModuleCollector, SourceProvider};
use super::tree::ValidatedTree;
use super::validator;

/// Compile the program rooted at `entry` from the filesystem, with default options.
///
/// ## Errors
/// Returns the diagnostics of the first stage that failed.
pub fn compile(entry: impl AsRef<Path>) -> Result<ValidatedTree, CompileFailure> {
    compile_with(entry, &CompileOptions::default())
}

/// Compile the program rooted at `entry` from the filesystem.
///
/// ## Errors
/// Returns the diagnostics of the first stage that failed.
pub fn compile_with(entry: impl AsRef<Path>, options: &CompileOptions) -> Result<ValidatedTree, CompileFailure> {
    compile_sources(entry.as_ref(), &FsSourceProvider, options)
}

/// Compile the program rooted at `entry`, reading every file through `provider`.
///
/// ## Errors
/// Returns the diagnostics of the first stage that failed.
#[tracing::instrument(skip_all, fields(entry = %entry.display()))]
pub fn compile_sources(
    entry: &Path,
    provider: &dyn SourceProvider,
    options: &CompileOptions,
) -> Result<ValidatedTree, CompileFailure> {
    let (program, diagnostics) = ModuleCollector::new(provider, &options.extension).collect(entry);
    fail_on(Stage::Load, diagnostics)?;

    let (aliases, diagnostics) = validator::check_declarations(&program);
    fail_on(Stage::Declarations, diagnostics)?;

    let (resolutions, diagnostics) = validator::resolve_types(&program, &aliases);
    fail_on(Stage::Resolution, diagnostics)?;

    let diagnostics = validator::check_consistency(&program, &resolutions, options.cycle_detection);
    fail_on(Stage::Consistency, diagnostics)?;

    tracing::debug!(files = program.len(), types = resolutions.len(), "compilation succeeded");
    Ok(ValidatedTree::build(program, aliases, resolutions))
}

fn fail_on(stage: Stage, diagnostics: Vec<FileDiagnostic>) -> Result<(), CompileFailure> {
    if diagnostics.is_empty() {
        return Ok(());
    }
    tracing::debug!(stage = %stage, errors = diagnostics.len(), "compilation stopped");
    Err(CompileFailure::at(stage, diagnostics))
}
