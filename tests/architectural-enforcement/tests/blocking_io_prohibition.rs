//! Integration Test: Blocking I/O Prohibition
//!
//! **Policy**: The core and the terminal surface run on a tokio runtime and
//! must not block it.
//! **Required**: `reqwest`'s async client and `tokio::time`, never
//! `reqwest::blocking` or `std::thread::sleep`.
//!
//! The config loader reads its small TOML file with `std::fs` before any
//! runtime work starts, so `std::fs` is allowed there and only there.

use architectural_enforcement::{report, scan, source_dir};

const RUNTIME_DIRS: [&str; 3] = ["arcana/core/src", "arcana/cli/src", "tui/src"];

/// No blocking HTTP or sleeps anywhere on the runtime
#[test]
fn test_no_blocking_calls_on_runtime() {
    let forbidden = ["reqwest::blocking", "std::thread::sleep", "thread::sleep("];

    let violations: Vec<_> = RUNTIME_DIRS
        .iter()
        .flat_map(|dir| scan(&source_dir(dir), &forbidden))
        .collect();

    report(
        "Blocking calls in runtime code",
        "Use `tokio::time::sleep(..).await` and the async reqwest client.",
        &violations,
    );
}

/// Only the config loader touches the filesystem in the core
#[test]
fn test_core_filesystem_access_is_config_only() {
    let violations: Vec<_> = scan(&source_dir("arcana/core/src"), &["std::fs"])
        .into_iter()
        .filter(|v| !v.path.components().any(|c| c.as_os_str() == "config"))
        .collect();

    report(
        "Filesystem access outside the config loader",
        "Load files in the config module or in a binary.",
        &violations,
    );
}

/// The core stays headless
#[test]
fn test_core_has_no_ui_dependencies() {
    let violations = scan(
        &source_dir("arcana/core/src"),
        &["ratatui", "crossterm", "clap::"],
    );

    report(
        "UI dependencies in the headless core",
        "Terminal and CLI code belongs in `tui/` or `arcana/cli/`.",
        &violations,
    );
}
