//! Keyword and primitive spellings are defined once, in `arf_core::lang`.
//!
//! Flags `== "struct"` comparisons and `"map" =>` match arms in library sources. Registry files and `tests.rs`
//! modules are exempt, as are comment lines.

use std::fs;
use std::path::{Path, PathBuf};

use arf_core::lang::{keywords, primitives};

fn vocabulary() -> Vec<&'static str> {
    let mut words: Vec<&'static str> = keywords::KEYWORDS
        .iter()
        .map(|k| k.canonical)
        .chain(primitives::PRIMITIVES.iter().map(|p| p.canonical))
        .collect();
    words.sort_unstable();
    words.dedup();
    words
}

fn is_exempt(relative: &str) -> bool {
    !relative.ends_with(".rs") || relative.starts_with("crates/arf_core/src/lang/") || relative.ends_with("/tests.rs")
}

fn compares_spelling(line: &str, words: &[&str]) -> bool {
    if line.trim_start().starts_with("//") {
        return false;
    }
    words
        .iter()
        .any(|w| line.contains(&format!("== \"{w}\"")) || line.contains(&format!("\"{w}\" =>")))
}

fn rust_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else { return };
    for path in entries.flatten().map(|e| e.path()) {
        if path.is_dir() {
            rust_files(&path, out);
        } else {
            out.push(path);
        }
    }
}

#[test]
fn test_no_stringly_vocabulary_checks() {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let words = vocabulary();

    let mut files = Vec::new();
    rust_files(&root.join("src"), &mut files);
    rust_files(&root.join("crates"), &mut files);

    let mut offenders = Vec::new();
    for path in files {
        let relative = path.strip_prefix(&root).unwrap_or(&path).to_string_lossy().replace('\\', "/");
        if is_exempt(&relative) {
            continue;
        }
        let Ok(contents) = fs::read_to_string(&path) else { continue };
        for (index, line) in contents.lines().enumerate() {
            if compares_spelling(line, &words) {
                offenders.push(format!("{}:{}: {}", relative, index + 1, line.trim()));
            }
        }
    }

    assert!(
        offenders.is_empty(),
        "compare against arf_core::lang ids instead of spellings:\n{}",
        offenders.join("\n")
    );
}

#[test]
fn test_detects_comparisons_and_match_arms() {
    let words = vocabulary();
    assert!(compares_spelling(r#"if name == "map" {"#, &words));
    assert!(compares_spelling(r#"    "bytes" => false,"#, &words));
    assert!(!compares_spelling(r#"// name == "map""#, &words));
    assert!(!compares_spelling(r#"if name == "mapping" {"#, &words));
}
