//! # Cleanup Tests
//!
//! Validates the banner-block stripper: only the marked commented-out blocks
//! are removed, line accounting is exact, and a backup always exists before
//! the file is rewritten.

use promptmig::cleanup::{backup_path, cleanup_file, strip_moved_blocks};
use std::fs;
use std::path::Path;

/// A minimal 6-line block in the exact format the old application file uses.
fn moved_block() -> String {
    let banner = "#".repeat(80);
    format!(
        "{banner}\n\
         # MOVED TO services/pdf_service.py - Phase 3.2\n\
         # This block is kept commented for the rollback window.\n\
         # Delete after 48-72 hours of stable operation.\n\
         {banner}\n\
         # def old_pdf_handler():\n"
    )
}

/// Builds a file of exactly `total_lines` lines with one block at `at`.
fn file_with_block(total_lines: usize, at: usize) -> String {
    let block = moved_block();
    let block_lines = block.matches('\n').count();
    let mut out = String::new();
    for i in 0..at {
        out.push_str(&format!("app_line_{i} = {i}\n"));
    }
    out.push_str(&block);
    for i in 0..(total_lines - at - block_lines) {
        out.push_str(&format!("tail_line_{i} = {i}\n"));
    }
    out
}

/// A 2000-line file containing one 6-line marker block loses exactly those 6
/// lines.
#[test]
fn removes_exactly_the_marked_block() -> anyhow::Result<()> {
    let content = file_with_block(2000, 1000);
    assert_eq!(content.matches('\n').count(), 2000);

    let cleaned = strip_moved_blocks(&content)?;
    assert_eq!(content.matches('\n').count() - cleaned.matches('\n').count(), 6);
    assert!(!cleaned.contains("MOVED TO services/"));
    assert!(cleaned.contains("app_line_999"));
    assert!(cleaned.contains("tail_line_0"));
    Ok(())
}

/// Files without a marked block pass through untouched.
#[test]
fn unmarked_content_is_unchanged() -> anyhow::Result<()> {
    let content = "# a normal comment\nvalue = 1\n\n# another comment\n";
    assert_eq!(strip_moved_blocks(content)?, content);
    Ok(())
}

/// An ordinary `#` banner without the MOVED marker is not a block.
#[test]
fn plain_banner_is_not_a_block() -> anyhow::Result<()> {
    let banner = "#".repeat(80);
    let content = format!("{banner}\n# Section: routes\n{banner}\napp = Flask()\n");
    assert_eq!(strip_moved_blocks(&content)?, content);
    Ok(())
}

/// A MOVED banner without the phase tag on the marker line is not a block,
/// and a later line that happens to mention a phase must not glue the two
/// together and take the live code in between.
#[test]
fn phaseless_marker_leaves_following_code_alone() -> anyhow::Result<()> {
    let banner = "#".repeat(80);
    let content = format!(
        "{banner}\n\
         # MOVED TO services/pdf_service.py\n\
         # note: marker line above has no phase tag\n\
         {banner}\n\
         def live_handler():\n\
         \treturn render()\n\
         \n\
         # changelog: rollout finished - Phase 3.2\n\
         value = 1\n"
    );

    let cleaned = strip_moved_blocks(&content)?;
    assert_eq!(cleaned, content);
    assert!(cleaned.contains("def live_handler():"));
    Ok(())
}

/// The in-place run writes a timestamped backup holding the original bytes
/// and reports the exact removed-line count.
#[test]
fn cleanup_run_backs_up_then_rewrites() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let target = dir.path().join("main.py");
    let content = file_with_block(200, 50);
    fs::write(&target, &content)?;

    let report = cleanup_file(&target)?;

    assert_eq!(report.original_lines, 200);
    assert_eq!(report.removed_lines, 6);
    assert_eq!(report.cleaned_lines, 194);

    let backup = fs::read_to_string(&report.backup)?;
    assert_eq!(backup, content);

    let cleaned = fs::read_to_string(&target)?;
    assert!(!cleaned.contains("MOVED TO services/"));
    Ok(())
}

/// Backup paths carry the original name plus a timestamp suffix.
#[test]
fn backup_path_keeps_original_name() {
    let path = backup_path(Path::new("main.py"));
    let name = path.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("main.py.backup."));
}
