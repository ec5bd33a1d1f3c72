//! Shared utilities for CLI commands

use sf_runner::{CancelFlag, Preview, RunnerError};
use std::fmt;

/// Exit status for a run stopped by Ctrl-C
pub(crate) const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Characters of rendered SQL shown per script in a dry run
pub(crate) const PREVIEW_CHARS: usize = 500;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Empty on purpose: the message was already printed by `fail`
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Print a fatal runner error and convert it to the matching exit code
pub(crate) fn fail(err: RunnerError) -> anyhow::Error {
    eprintln!("✗ {}", err);
    let code = match err {
        RunnerError::Interrupted { .. } => INTERRUPTED_EXIT_CODE,
        _ => 1,
    };
    ExitCode(code).into()
}

/// First `PREVIEW_CHARS` characters of `sql`, with `...` when cut
pub(crate) fn truncate_preview(sql: &str) -> String {
    let mut chars = sql.char_indices();
    match chars.nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}...", &sql[..cut]),
        None => sql.to_string(),
    }
}

/// Print dry-run previews, indented under their script names
pub(crate) fn print_previews(previews: &[Preview]) {
    for preview in previews {
        println!("  → {}", preview.script);
        for line in truncate_preview(&preview.sql).lines() {
            println!("      {}", line);
        }
    }
}

/// Cancel flag set by the first Ctrl-C; a second one exits immediately
pub(crate) fn interrupt_flag() -> CancelFlag {
    let flag = CancelFlag::new();
    let handle = flag.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        eprintln!("Interrupt received; stopping after the current file (Ctrl-C again to abort)");
        handle.cancel();
        if tokio::signal::ctrl_c().await.is_ok() {
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    });
    flag
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
