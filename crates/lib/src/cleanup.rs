//! # Commented-Block Cleanup
//!
//! Removes the banner-delimited blocks of commented-out code that were left in
//! the old application file after functions moved into service modules. The
//! match is deliberately keyed to the exact banner format those blocks use (a
//! line of at least eighty `#`, a `MOVED TO services/...` marker, the closing
//! banner, and the commented function body that follows); this is a one-file
//! chore, not a general comment stripper.
//!
//! A timestamped backup is always written before the file is modified.

use crate::errors::MigrationError;
use chrono::Local;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Matches one full commented-out block:
/// banner, marker line, two description lines, closing banner, then the run
/// of `#` comment lines holding the moved function body. `.` stays line-local
/// here; the phase marker must sit on the MOVED line itself, otherwise the
/// match could glue distant lines together and take live code with it.
const MOVED_BLOCK_PATTERN: &str =
    r"#{80,}\n# MOVED TO services/.*- Phase 3\.\d+.*\n.*\n.*\n#{80,}\n(#[^\n]*\n)+";

/// Result of one cleanup run.
#[derive(Debug)]
pub struct CleanupReport {
    pub backup: PathBuf,
    pub original_lines: usize,
    pub cleaned_lines: usize,
    pub removed_lines: usize,
}

/// Strips all matching commented-out blocks from `content`.
pub fn strip_moved_blocks(content: &str) -> Result<String, MigrationError> {
    let re = Regex::new(MOVED_BLOCK_PATTERN)?;
    Ok(re.replace_all(content, "").into_owned())
}

/// The backup path for `path`: `<file>.backup.<YYYYMMDD_HHMMSS>`.
pub fn backup_path(path: &Path) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(format!("{}.backup.{stamp}", path.display()))
}

/// Backs up `path`, strips the commented blocks, and rewrites it in place.
///
/// The backup is created before anything else touches the file, so an error
/// on any later step leaves the original content recoverable.
pub fn cleanup_file(path: &Path) -> Result<CleanupReport, MigrationError> {
    let display = path.display().to_string();

    let backup = backup_path(path);
    fs::copy(path, &backup).map_err(|e| MigrationError::io(&display, e))?;
    info!(backup = %backup.display(), "created backup");

    let content = fs::read_to_string(path).map_err(|e| MigrationError::io(&display, e))?;
    let original_lines = content.matches('\n').count();

    let cleaned = strip_moved_blocks(&content)?;
    let cleaned_lines = cleaned.matches('\n').count();

    fs::write(path, &cleaned).map_err(|e| MigrationError::io(&display, e))?;

    let report = CleanupReport {
        backup,
        original_lines,
        cleaned_lines,
        removed_lines: original_lines - cleaned_lines,
    };
    info!(
        removed = report.removed_lines,
        remaining = report.cleaned_lines,
        "cleanup complete"
    );
    Ok(report)
}
