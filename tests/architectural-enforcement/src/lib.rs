//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - The core engine stays headless (no terminal crates)
//! - No `unwrap()`/`expect()` shortcuts in production code
//! - No sleep() calls in production code; timing comes from ticks
//!
//! The helpers here scan source files as text. Production code is
//! everything before a file's first `#[cfg(test)]`; doc and line comments
//! are ignored.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// A source line breaking a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File containing the line
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// The offending line, trimmed
    pub text: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.path.display(), self.line, self.text)
    }
}

/// Root of the workspace this crate lives in
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .canonicalize()
        .unwrap_or_else(|_| Path::new(env!("CARGO_MANIFEST_DIR")).join("../.."))
}

/// Every `.rs` file under `dir`, sorted
pub fn rust_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| path.extension().is_some_and(|ext| ext == "rs"))
        .collect();
    files.sort();
    files
}

/// Production lines of a source file: `(line number, text)` pairs before
/// the first `#[cfg(test)]`, comments skipped
pub fn production_lines(source: &str) -> Vec<(usize, &str)> {
    source
        .lines()
        .enumerate()
        .take_while(|(_, line)| !line.trim_start().starts_with("#[cfg(test)]"))
        .filter(|(_, line)| !line.trim_start().starts_with("//"))
        .map(|(i, line)| (i + 1, line))
        .collect()
}

/// Production lines under `dir` containing any of `needles`
pub fn find_in_production(dir: &Path, needles: &[&str]) -> Vec<Violation> {
    let mut violations = Vec::new();
    for path in rust_files(dir) {
        let Ok(source) = fs::read_to_string(&path) else {
            continue;
        };
        for (line, text) in production_lines(&source) {
            if needles.iter().any(|needle| text.contains(needle)) {
                violations.push(Violation {
                    path: path.clone(),
                    line,
                    text: text.trim().to_string(),
                });
            }
        }
    }
    violations
}

/// Format violations for an assertion message
pub fn report(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_production_lines_stop_at_test_module() {
        let source = "fn a() {}\n// x.unwrap()\n/// y.unwrap()\nfn b() {}\n#[cfg(test)]\nmod tests {}\n";
        let lines = production_lines(source);
        assert_eq!(lines, vec![(1, "fn a() {}"), (4, "fn b() {}")]);
    }
}
