//! The set of files taking part in one compilation
//!
//! [`Program`] owns every parsed file of the import graph, indexed by [`FileId`] in discovery order, and groups
//! them by the package they declare.

use std::collections::BTreeMap;
use std::path::PathBuf;

use arf_syntax::ast::SourceFile;

/// Identity of a file within a [`Program`]. The entry file is always `FileId(0)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(pub usize);

impl FileId {
    pub const ENTRY: FileId = FileId(0);
}

/// A parsed source file and where its imports led.
#[derive(Debug, Clone)]
pub struct LoadedFile {
    pub path: PathBuf,
    pub ast: SourceFile,
    /// One entry per `ast.imports`, in order. `None` when the target could not be loaded.
    pub import_targets: Vec<Option<FileId>>,
}

impl LoadedFile {
    pub fn package(&self) -> &str {
        self.ast.package_name()
    }
}

/// Every file of the import graph, plus a package index.
#[derive(Debug, Clone, Default)]
pub struct Program {
    files: Vec<LoadedFile>,
    packages: BTreeMap<String, Vec<FileId>>,
}

impl Program {
    pub fn new(files: Vec<LoadedFile>) -> Self {
        let mut packages: BTreeMap<String, Vec<FileId>> = BTreeMap::new();
        for (index, file) in files.iter().enumerate() {
            packages
                .entry(file.package().to_string())
                .or_default()
                .push(FileId(index));
        }
        Self { files, packages }
    }

    pub fn file(&self, id: FileId) -> &LoadedFile {
        &self.files[id.0]
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn file_ids(&self) -> impl Iterator<Item = FileId> + '_ {
        (0..self.files.len()).map(FileId)
    }

    pub fn files(&self) -> impl Iterator<Item = (FileId, &LoadedFile)> + '_ {
        self.files.iter().enumerate().map(|(i, f)| (FileId(i), f))
    }

    /// Files declaring `package`, in discovery order. `""` is the root package.
    pub fn files_in_package(&self, package: &str) -> &[FileId] {
        self.packages.get(package).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_package(&self, package: &str) -> bool {
        self.packages.contains_key(package)
    }

    /// Declared package names, sorted.
    pub fn package_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.packages.keys().map(String::as_str)
    }
}
