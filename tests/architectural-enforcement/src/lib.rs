//! Architectural Enforcement Integration Tests
//!
//! Source scanners shared by the integration tests in `tests/`. They enforce:
//! - No thread sleeps in production code, and timer sleeps only where the
//!   panel schedules user-visible timing
//! - Async I/O inside async functions
//! - No `unwrap()`/`expect()` in production code
//!
//! The scan is line based. Everything from a file's first `#[cfg(test)]`
//! onward counts as test code.

use std::fs;
use std::path::{Path, PathBuf};

/// Production source trees, relative to the workspace root
pub const PRODUCTION_DIRS: &[&str] = &["newsbot/core/src", "newsbot/cli/src"];

/// One scanned source file
#[derive(Debug)]
pub struct SourceFile {
    /// Path on disk
    pub path: PathBuf,
    /// File contents, split into lines
    pub lines: Vec<String>,
}

impl SourceFile {
    /// Lines as string slices, for the helpers below
    pub fn line_refs(&self) -> Vec<&str> {
        self.lines.iter().map(String::as_str).collect()
    }

    /// File name without directories
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
    }

    /// `path:line - kind: code` for violation reports
    pub fn violation(&self, idx: usize, kind: &str) -> String {
        format!(
            "{}:{} - {}: {}",
            self.path.display(),
            idx + 1,
            kind,
            self.lines[idx].trim()
        )
    }
}

/// Workspace root, two levels above this crate
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// Every `.rs` file under the production trees
pub fn production_sources() -> Vec<SourceFile> {
    let root = workspace_root();
    let mut sources = Vec::new();

    for dir in PRODUCTION_DIRS {
        let path = root.join(dir);
        if !path.exists() {
            continue;
        }

        for entry in walkdir::WalkDir::new(&path)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if entry.path().extension().and_then(|s| s.to_str()) != Some("rs") {
                continue;
            }
            let Ok(content) = fs::read_to_string(entry.path()) else {
                continue;
            };
            sources.push(SourceFile {
                path: entry.path().to_path_buf(),
                lines: content.lines().map(str::to_string).collect(),
            });
        }
    }

    sources
}

/// Code before any `//` comment
pub fn code_part(line: &str) -> &str {
    line.split("//").next().unwrap_or(line)
}

/// Whether the line starts a function signature
pub fn is_fn_signature(line: &str) -> bool {
    let trimmed = line.trim_start();
    let after_vis = if let Some(rest) = trimmed.strip_prefix("pub(crate) ") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("pub ") {
        rest
    } else {
        trimmed
    };
    let after_async = after_vis.strip_prefix("async ").unwrap_or(after_vis);
    after_async.starts_with("fn ")
}

/// Whether the line is at or after the file's `#[cfg(test)]` module
pub fn is_in_test_code(lines: &[&str], current_idx: usize) -> bool {
    lines[..=current_idx]
        .iter()
        .any(|line| line.trim() == "#[cfg(test)]")
}

/// Index of the nearest function signature at or above the line
pub fn enclosing_fn(lines: &[&str], current_idx: usize) -> Option<usize> {
    (0..=current_idx).rev().find(|&i| is_fn_signature(lines[i]))
}

/// Check if line is inside an async function or async block
pub fn is_in_async_function(lines: &[&str], current_idx: usize) -> bool {
    for i in (0..=current_idx).rev() {
        let line = code_part(lines[i]);
        if line.contains("async move") || line.contains("async {") {
            return true;
        }
        if is_fn_signature(line) {
            return line.contains("async fn ");
        }
    }
    false
}

/// Check if line is inside a plain (non-async) function
pub fn is_in_non_async_function(lines: &[&str], current_idx: usize) -> bool {
    !is_in_async_function(lines, current_idx) && enclosing_fn(lines, current_idx).is_some()
}

/// Print a report and fail if there are violations
pub fn report(violations: &[String], headline: &str, guidance: &[&str]) {
    if violations.is_empty() {
        return;
    }

    eprintln!("\n❌ CRITICAL: {headline}\n");
    for violation in violations {
        eprintln!("  ❌ {violation}");
    }
    eprintln!();
    for line in guidance {
        eprintln!("{line}");
    }

    panic!(
        "\nFound {} violation(s) in production code.\nFix these before merging!",
        violations.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fn_signature_detection() {
        assert!(is_fn_signature("fn main() {"));
        assert!(is_fn_signature("    pub fn load() -> Result<()> {"));
        assert!(is_fn_signature("    pub(crate) fn new() -> Self {"));
        assert!(is_fn_signature("pub async fn send(&self) {"));
        assert!(!is_fn_signature("    let f = fn_pointer;"));
        assert!(!is_fn_signature("    // fn commented"));
    }

    #[test]
    fn test_async_function_detection() {
        let code = vec![
            "async fn bad_function() {",
            "    let contents = std::fs::read_to_string(\"file.txt\")?;",
            "}",
        ];
        assert!(is_in_async_function(&code, 1));
        assert!(!is_in_non_async_function(&code, 1));
    }

    #[test]
    fn test_spawned_block_counts_as_async() {
        let code = vec![
            "    pub fn start(&self) {",
            "        tokio::spawn(async move {",
            "            std::thread::sleep(TICK);",
            "        });",
        ];
        assert!(is_in_async_function(&code, 2));
    }

    #[test]
    fn test_non_async_function_detection() {
        let code = vec![
            "pub fn load_config() {",
            "    let contents = std::fs::read_to_string(\"config.toml\")?;",
            "}",
        ];
        assert!(is_in_non_async_function(&code, 1));
    }

    #[test]
    fn test_test_module_detection() {
        let code = vec![
            "fn real() {}",
            "#[cfg(test)]",
            "mod tests {",
            "    fn helper() { Some(1).unwrap(); }",
            "}",
        ];
        assert!(!is_in_test_code(&code, 0));
        assert!(is_in_test_code(&code, 3));
    }

    #[test]
    fn test_code_part_strips_comments() {
        assert_eq!(code_part("let x = 1; // .unwrap()"), "let x = 1; ");
    }
}
