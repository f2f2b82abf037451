#![no_main]

use std::path::Path;

use arf::{CompileOptions, MemorySourceProvider, compile_sources};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let provider = MemorySourceProvider::new().with_file("main.arf", s);
        // Any failure must carry at least one diagnostic
        if let Err(failure) = compile_sources(Path::new("main.arf"), &provider, &CompileOptions::default()) {
            assert!(!failure.diagnostics().is_empty());
        }
    }
});
