//! Import graph loading
//!
//! Resolves import literals like `import "sub/types";` to source files through a [`SourceProvider`], and loads and
//! parses every file reachable from the entry file.
//!
//! ## Notes
//! - Traversal is depth-first with a visited set keyed by normalized path, so diamond and cyclic imports load each
//!   file exactly once and are not errors.
//! - A file that fails to lex or parse is still recorded; loading carries on so one run reports every broken file.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use arf_syntax::ast::Span;
use arf_syntax::diagnostics::CompileError;
use arf_syntax::{lexer, parser};
use thiserror::Error;

use super::diagnostics::FileDiagnostic;
use super::program::{FileId, LoadedFile, Program};

// ============================================================================
// Source collaborator
// ============================================================================

/// Failure to obtain the text of a source file.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("{} is a directory, not a source file", .0.display())]
    IsDirectory(PathBuf),

    #[error("cannot read {}: {source}", .path.display())]
    Unreadable { path: PathBuf, source: io::Error },
}

/// Maps import literals to files and reads their content.
pub trait SourceProvider {
    /// Path of the file imported as `literal` from `importer`.
    ///
    /// Appends `.{extension}` unless the literal already ends with it, and resolves the result against the
    /// importer's directory. Other dots in the file name are kept: `"common.v2"` becomes `common.v2.arf`.
    fn resolve(&self, importer: &Path, literal: &str, extension: &str) -> PathBuf {
        let mut relative = PathBuf::from(literal);
        if relative.extension() != Some(OsStr::new(extension)) {
            let mut name = relative.into_os_string();
            name.push(".");
            name.push(extension);
            relative = PathBuf::from(name);
        }
        let base = importer.parent().unwrap_or_else(|| Path::new(""));
        self.normalize(&base.join(relative))
    }

    /// Key under which `path` is tracked as visited.
    fn normalize(&self, path: &Path) -> PathBuf {
        normalize_path(path)
    }

    fn read(&self, path: &Path) -> Result<String, SourceError>;
}

/// Reads sources from the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSourceProvider;

impl SourceProvider for FsSourceProvider {
    fn normalize(&self, path: &Path) -> PathBuf {
        let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        normalize_path(&absolute)
    }

    fn read(&self, path: &Path) -> Result<String, SourceError> {
        let metadata = fs::metadata(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => SourceError::NotFound(path.to_path_buf()),
            _ => SourceError::Unreadable {
                path: path.to_path_buf(),
                source: e,
            },
        })?;
        if metadata.is_dir() {
            return Err(SourceError::IsDirectory(path.to_path_buf()));
        }
        fs::read_to_string(path).map_err(|source| SourceError::Unreadable {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// In-memory sources keyed by path, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemorySourceProvider {
    files: HashMap<PathBuf, String>,
}

impl MemorySourceProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, source: impl Into<String>) {
        self.files.insert(normalize_path(path.as_ref()), source.into());
    }

    pub fn with_file(mut self, path: impl AsRef<Path>, source: impl Into<String>) -> Self {
        self.insert(path, source);
        self
    }
}

impl SourceProvider for MemorySourceProvider {
    fn read(&self, path: &Path) -> Result<String, SourceError> {
        let key = normalize_path(path);
        if let Some(source) = self.files.get(&key) {
            return Ok(source.clone());
        }
        if self.files.keys().any(|p| p.starts_with(&key)) {
            return Err(SourceError::IsDirectory(key));
        }
        Err(SourceError::NotFound(key))
    }
}

/// Lexically resolve `.` and `..` components.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else if !matches!(
                    out.components().next_back(),
                    Some(Component::RootDir | Component::Prefix(_))
                ) {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

// ============================================================================
// Module collection
// ============================================================================

/// Loads the import graph rooted at an entry file.
pub(crate) struct ModuleCollector<'s> {
    provider: &'s dyn SourceProvider,
    extension: &'s str,
    files: Vec<LoadedFile>,
    visited: HashMap<PathBuf, FileId>,
    diagnostics: Vec<FileDiagnostic>,
}

impl<'s> ModuleCollector<'s> {
    pub(crate) fn new(provider: &'s dyn SourceProvider, extension: &'s str) -> Self {
        Self {
            provider,
            extension,
            files: Vec::new(),
            visited: HashMap::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Load `entry` and everything it imports.
    ///
    /// The returned diagnostics cover read failures, lexer and parser errors of every reachable file.
    pub(crate) fn collect(mut self, entry: &Path) -> (Program, Vec<FileDiagnostic>) {
        let entry = self.provider.normalize(entry);
        if let Err(e) = self.load(&entry) {
            self.diagnostics
                .push(FileDiagnostic::new(entry, CompileError::import(e.to_string(), Span::default())));
        }
        (Program::new(self.files), self.diagnostics)
    }

    fn load(&mut self, path: &Path) -> Result<FileId, SourceError> {
        if let Some(&id) = self.visited.get(path) {
            tracing::debug!(path = %path.display(), "already loaded, skipping");
            return Ok(id);
        }

        let source = self.provider.read(path)?;
        let id = FileId(self.files.len());
        self.visited.insert(path.to_path_buf(), id);
        tracing::debug!(path = %path.display(), file = id.0, "loaded source file");

        let (tokens, lex_errors) = lexer::tokenize(&source);
        let (ast, parse_errors) = parser::parse_file(&tokens);
        // A lexer error tends to cascade into the parser; only the root cause is reported.
        let errors = if lex_errors.is_empty() { parse_errors } else { lex_errors };
        self.diagnostics
            .extend(errors.into_iter().map(|e| FileDiagnostic::new(path, e)));

        let imports: Vec<(String, Span)> = ast
            .imports
            .iter()
            .map(|i| (i.path.node.clone(), i.span))
            .collect();
        self.files.push(LoadedFile {
            path: path.to_path_buf(),
            ast,
            import_targets: Vec::new(),
        });

        let mut targets = Vec::with_capacity(imports.len());
        for (literal, span) in imports {
            let target = self.provider.resolve(path, &literal, self.extension);
            match self.load(&target) {
                Ok(target_id) => targets.push(Some(target_id)),
                Err(e) => {
                    let error = CompileError::import(format!("cannot import \"{}\": {}", literal, e), span);
                    self.diagnostics.push(FileDiagnostic::new(path, error));
                    targets.push(None);
                }
            }
        }
        self.files[id.0].import_targets = targets;

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(provider: &MemorySourceProvider, entry: &str) -> (Program, Vec<FileDiagnostic>) {
        ModuleCollector::new(provider, "arf").collect(Path::new(entry))
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("a/./b/../c.arf")), PathBuf::from("a/c.arf"));
        assert_eq!(normalize_path(Path::new("../x/y")), PathBuf::from("../x/y"));
        assert_eq!(normalize_path(Path::new("/a/../../b")), PathBuf::from("/b"));
    }

    #[test]
    fn test_resolve_appends_extension() {
        let provider = MemorySourceProvider::new();
        let importer = Path::new("protos/main.arf");
        assert_eq!(provider.resolve(importer, "common", "arf"), PathBuf::from("protos/common.arf"));
        assert_eq!(provider.resolve(importer, "sub/pkg", "arf"), PathBuf::from("protos/sub/pkg.arf"));
        assert_eq!(provider.resolve(importer, "../x.arf", "arf"), PathBuf::from("x.arf"));
    }

    #[test]
    fn test_resolve_keeps_dots_in_file_names() {
        let provider = MemorySourceProvider::new();
        let importer = Path::new("protos/main.arf");
        assert_eq!(provider.resolve(importer, "common.v2", "arf"), PathBuf::from("protos/common.v2.arf"));
        assert_eq!(provider.resolve(importer, "api.idl", "arf"), PathBuf::from("protos/api.idl.arf"));
        assert_eq!(provider.resolve(importer, "api.idl", "idl"), PathBuf::from("protos/api.idl"));
    }

    #[test]
    fn test_memory_provider_reports_directories() {
        let provider = MemorySourceProvider::new().with_file("protos/sub/a.arf", "");
        assert!(matches!(provider.read(Path::new("protos/sub")), Err(SourceError::IsDirectory(_))));
        assert!(matches!(provider.read(Path::new("protos/b.arf")), Err(SourceError::NotFound(_))));
    }

    #[test]
    fn test_diamond_imports_load_once() {
        let provider = MemorySourceProvider::new()
            .with_file("main.arf", "import \"left\";\nimport \"right\";\n")
            .with_file("left.arf", "import \"base\";\n")
            .with_file("right.arf", "import \"base\";\n")
            .with_file("base.arf", "struct Base {}\n");

        let (program, diagnostics) = collect(&provider, "main.arf");
        assert!(diagnostics.is_empty(), "{:?}", diagnostics);
        assert_eq!(program.len(), 4);
        assert_eq!(program.file(FileId::ENTRY).path, PathBuf::from("main.arf"));
        assert_eq!(program.file(FileId(1)).import_targets, vec![Some(FileId(2))]);
        assert_eq!(program.file(FileId(3)).import_targets, vec![Some(FileId(2))]);
    }

    #[test]
    fn test_cyclic_imports_terminate() {
        let provider = MemorySourceProvider::new()
            .with_file("a.arf", "import \"b\";\n")
            .with_file("b.arf", "import \"a\";\n");

        let (program, diagnostics) = collect(&provider, "a.arf");
        assert!(diagnostics.is_empty());
        assert_eq!(program.len(), 2);
        assert_eq!(program.file(FileId(1)).import_targets, vec![Some(FileId::ENTRY)]);
    }

    #[test]
    fn test_missing_import_is_reported_at_import() {
        let provider = MemorySourceProvider::new().with_file("main.arf", "package p;\n\nimport \"nope\";\n");

        let (program, diagnostics) = collect(&provider, "main.arf");
        assert_eq!(program.len(), 1);
        assert_eq!(program.file(FileId::ENTRY).import_targets, vec![None]);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].to_string(),
            "main.arf:3:1: cannot import \"nope\": file not found: nope.arf"
        );
    }

    #[test]
    fn test_errors_from_every_file_are_collected() {
        let provider = MemorySourceProvider::new()
            .with_file("main.arf", "import \"other\";\nstruct S { a string = ; }\n")
            .with_file("other.arf", "struct T { $ }\n");

        let (_, diagnostics) = collect(&provider, "main.arf");
        let paths: Vec<_> = diagnostics.iter().map(|d| d.path.clone()).collect();
        assert_eq!(paths, [PathBuf::from("main.arf"), PathBuf::from("other.arf")]);
    }

    #[test]
    fn test_missing_entry_file() {
        let provider = MemorySourceProvider::new();
        let (program, diagnostics) = collect(&provider, "main.arf");
        assert!(program.is_empty());
        assert_eq!(diagnostics[0].to_string(), "main.arf:1:1: file not found: main.arf");
    }
}
