//! Core Crate Boundaries
//!
//! `tessera-core` must build and run without a terminal. It may not name
//! ratatui, crossterm or tokio, may not sleep, and may not panic through
//! `unwrap()`/`expect()` in production code.

use std::fs;

use architectural_enforcement::{find_in_production, report, workspace_root};

#[test]
fn test_core_has_no_terminal_dependencies() {
    let manifest = fs::read_to_string(workspace_root().join("engine/core/Cargo.toml")).unwrap();
    for forbidden in ["ratatui", "crossterm", "tokio"] {
        assert!(
            !manifest.contains(forbidden),
            "engine/core/Cargo.toml depends on {forbidden}"
        );
    }

    let violations = find_in_production(
        &workspace_root().join("engine/core/src"),
        &["ratatui::", "crossterm::", "tokio::"],
    );
    assert!(violations.is_empty(), "terminal crates in core:\n{}", report(&violations));
}

#[test]
fn test_core_has_no_panicking_shortcuts() {
    let violations = find_in_production(
        &workspace_root().join("engine/core/src"),
        &[".unwrap()", ".expect("],
    );
    assert!(violations.is_empty(), "unwrap/expect in core:\n{}", report(&violations));
}

#[test]
fn test_no_sleep_in_production_code() {
    let root = workspace_root();
    for dir in ["engine/core/src", "tui/src"] {
        let violations = find_in_production(&root.join(dir), &["thread::sleep", "time::sleep"]);
        assert!(violations.is_empty(), "sleep calls in {dir}:\n{}", report(&violations));
    }
}
