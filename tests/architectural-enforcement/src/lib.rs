//! Architectural Enforcement
//!
//! Source-scanning checks that keep the workspace's layering honest:
//! - The carousel frame path stays free of async runtimes, network clients
//!   and wall-clock reads; time only enters through `now_ms` arguments
//! - The core never blocks a runtime thread
//! - The core has no terminal or UI dependencies
//!
//! The helpers here are shared by the tests under `tests/`.

use std::fs;
use std::path::{Path, PathBuf};

/// A forbidden pattern found in production code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File containing the match
    pub path: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// The pattern that matched
    pub pattern: &'static str,
    /// The offending line, trimmed
    pub text: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{} - `{}`: {}",
            self.path.display(),
            self.line,
            self.pattern,
            self.text
        )
    }
}

/// Workspace root, resolved from this crate's manifest directory
#[must_use]
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// A source directory relative to the workspace root
///
/// # Panics
///
/// Panics if the directory does not exist, so a moved module cannot make a
/// check pass vacuously.
#[must_use]
pub fn source_dir(relative: &str) -> PathBuf {
    let path = workspace_root().join(relative);
    assert!(path.is_dir(), "missing source directory: {}", path.display());
    path
}

/// Scan every `.rs` file under `dir` for `patterns`
///
/// Comment text and everything from a `#[cfg(test)]` line onwards are
/// ignored; test modules sit at the bottom of each file in this workspace.
#[must_use]
pub fn scan(dir: &Path, patterns: &[&'static str]) -> Vec<Violation> {
    let mut violations = Vec::new();

    for entry in walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
    {
        let Ok(content) = fs::read_to_string(entry.path()) else {
            continue;
        };
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.starts_with("#[cfg(test)]") {
                break;
            }
            if trimmed.starts_with("//") {
                continue;
            }
            let code = line.split("//").next().unwrap_or(line);
            for pattern in patterns {
                if code.contains(pattern) {
                    violations.push(Violation {
                        path: entry.path().to_path_buf(),
                        line: idx + 1,
                        pattern,
                        text: trimmed.to_string(),
                    });
                }
            }
        }
    }

    violations
}

/// Print violations and fail the test if there are any
///
/// # Panics
///
/// Panics when `violations` is non-empty.
pub fn report(title: &str, hint: &str, violations: &[Violation]) {
    if violations.is_empty() {
        return;
    }
    eprintln!("\n❌ {title}\n");
    for violation in violations {
        eprintln!("  ❌ {violation}");
    }
    eprintln!("\n{hint}");
    panic!("\nFound {} violation(s): {title}", violations.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_scan_skips_comments_and_test_modules() {
        let dir = std::env::temp_dir().join(format!("arch-scan-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let mut file = fs::File::create(dir.join("sample.rs")).unwrap();
        writeln!(file, "use tokio::sync::mpsc;").unwrap();
        writeln!(file, "// tokio in a comment").unwrap();
        writeln!(file, "let x = 1; // tokio trailing").unwrap();
        writeln!(file, "#[cfg(test)]").unwrap();
        writeln!(file, "mod tests {{ use tokio::test; }}").unwrap();
        drop(file);

        let found = scan(&dir, &["tokio"]);
        fs::remove_dir_all(&dir).unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].line, 1);
    }
}
