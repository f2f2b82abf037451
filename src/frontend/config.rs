//! Compilation options

use arf_core::lang::conventions;

/// How far phase 3 looks for cyclic direct struct references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CycleDetection {
    /// Depth-first search over the whole direct-reference graph; catches cycles of any length.
    #[default]
    Full,
    /// Only self references (`A -> A`) and two-hop cycles (`A -> B -> A`).
    Shallow,
}

/// Options for one compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Extension appended to import literals that have none, without the dot.
    pub extension: String,
    pub cycle_detection: CycleDetection,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            extension: conventions::FILE_EXTENSION.to_string(),
            cycle_detection: CycleDetection::default(),
        }
    }
}

impl CompileOptions {
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub fn with_cycle_detection(mut self, cycle_detection: CycleDetection) -> Self {
        self.cycle_detection = cycle_detection;
        self
    }
}
