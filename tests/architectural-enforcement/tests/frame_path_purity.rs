//! Integration Test: Frame Path Purity
//!
//! The carousel physics and animation primitives run once per display frame
//! and are driven by timestamps the surface passes in. They must not reach for
//! an async runtime, the network, threads, or the wall clock, and they must
//! not log above `debug`.

use architectural_enforcement::{report, scan, source_dir};

const FRAME_PATH_DIRS: [&str; 2] = ["arcana/core/src/carousel", "arcana/core/src/animation"];

/// The frame path has no async, network, thread or clock dependencies
#[test]
fn test_frame_path_has_no_runtime_dependencies() {
    let forbidden = [
        "tokio",
        "reqwest",
        "futures",
        "async fn",
        ".await",
        "std::thread",
        "Instant::now",
        "SystemTime",
    ];

    let violations: Vec<_> = FRAME_PATH_DIRS
        .iter()
        .flat_map(|dir| scan(&source_dir(dir), &forbidden))
        .collect();

    report(
        "Runtime dependencies in the carousel frame path",
        "Pass `now_ms` in from the caller and keep I/O in the surfaces.",
        &violations,
    );
}

/// Per-frame code logs at debug or below
#[test]
fn test_frame_path_logs_quietly() {
    let violations: Vec<_> = FRAME_PATH_DIRS
        .iter()
        .flat_map(|dir| scan(&source_dir(dir), &["info!(", "warn!(", "error!("]))
        .collect();

    report(
        "Noisy logging in the carousel frame path",
        "Use debug! for per-gesture and per-settle events.",
        &violations,
    );
}

/// The markdown renderer is a pure function of its input
#[test]
fn test_markdown_is_pure() {
    let violations = scan(
        &source_dir("arcana/core/src/markdown"),
        &["tokio", "reqwest", "std::fs", "std::net", "tracing::"],
    );

    report(
        "I/O in the markdown renderer",
        "Rendering takes text and returns HTML; nothing else.",
        &violations,
    );
}
