//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::frontend::lexer::{self, TokenKind};
use crate::frontend::{CompileOptions, FileDiagnostic, ValidatedTree, compile_with};

use super::{CliError, CliResult, ExitCode};

/// Maximum source file size (10 MB)
const MAX_SOURCE_SIZE: u64 = 10 * 1024 * 1024;

/// Compile `file` and print a summary of every package.
pub fn check_file(file: &Path, options: &CompileOptions) -> CliResult<ExitCode> {
    match compile_with(file, options) {
        Ok(tree) => {
            print!("{}", summary(&tree));
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            tracing::info!(stage = %failure.stage(), errors = failure.diagnostics().len(), "check failed");
            Err(CliError::failure(format!("{:?}", miette::Report::new(failure))))
        }
    }
}

/// Tokenize `file` and print one token per line.
pub fn print_tokens(file: &Path) -> CliResult<ExitCode> {
    let source = read_source(file)?;
    let (tokens, errors) = lexer::tokenize(&source);

    for token in &tokens {
        if matches!(token.kind, TokenKind::Eof) {
            break;
        }
        println!("{:>4}:{:<4} {}", token.span.start.line, token.span.start.column, token.kind);
    }

    if errors.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }
    let rendered: Vec<String> = errors
        .into_iter()
        .map(|error| FileDiagnostic::new(file, error).to_string())
        .collect();
    Err(CliError::failure(rendered.join("\n")))
}

/// Read a source file, refusing anything unreasonably large.
pub fn read_source(file: &Path) -> CliResult<String> {
    let metadata = fs::metadata(file)
        .map_err(|e| CliError::failure(format!("Cannot access file '{}': {}", file.display(), e)))?;

    if metadata.len() > MAX_SOURCE_SIZE {
        return Err(CliError::failure(format!(
            "Source file '{}' is too large ({} bytes, max {} bytes)",
            file.display(),
            metadata.len(),
            MAX_SOURCE_SIZE
        )));
    }

    fs::read_to_string(file).map_err(|e| CliError::failure(format!("Error reading file '{}': {}", file.display(), e)))
}

/// Per-package counts, then one line per merged service.
pub fn summary(tree: &ValidatedTree) -> String {
    let mut out = String::new();
    for package in tree.packages() {
        let name = if package.name.is_empty() { "<root>" } else { package.name.as_str() };
        let _ = writeln!(
            out,
            "package {}: {}, {}, {}, {}",
            name,
            plural(package.files.len(), "file"),
            plural(package.structs.len(), "struct"),
            plural(package.enums.len(), "enum"),
            plural(package.services.len(), "service"),
        );
        for service in &package.services {
            let _ = writeln!(out, "  service {}: {}", service.fqn, plural(service.methods.len(), "method"));
        }
    }
    out
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", count, noun)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::frontend::{MemorySourceProvider, compile_sources};

    #[test]
    fn test_summary() {
        let provider = MemorySourceProvider::new()
            .with_file("main.arf", "package shop;\nimport \"base\";\nstruct Cart { item base.Item; }\nservice Checkout { Pay(Cart); Cancel(Cart); }\n")
            .with_file("base.arf", "package base;\nstruct Item { kind Kind; enum Kind { A = 0; } }\n");
        let tree = compile_sources(Path::new("main.arf"), &provider, &CompileOptions::default()).unwrap();

        insta::assert_snapshot!(summary(&tree), @r"
        package base: 1 file, 1 struct, 1 enum, 0 services
        package shop: 1 file, 1 struct, 0 enums, 1 service
          service shop.Checkout: 2 methods
        ");
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(0, "enum"), "0 enums");
        assert_eq!(plural(1, "file"), "1 file");
    }

    #[test]
    fn test_read_source_missing_file() {
        let err = read_source(Path::new("definitely/not/here.arf")).unwrap_err();
        assert_eq!(err.exit_code, ExitCode::FAILURE);
        assert!(err.message.starts_with("Cannot access file"));
    }
}
