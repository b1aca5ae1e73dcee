//! # Batch Statement Splitter
//!
//! Partitions a combined UPDATE script into one file per statement so each can
//! be executed separately in a database tool. Sections are delimited by the
//! banner convention the generator emits:
//!
//! ```text
//! -- ===...===
//! -- UPDATE <NAME>
//! -- Prompt Length: <N> characters
//! -- ===...===
//! ```
//!
//! The statement body is recovered by scanning for the literal dollar-quote
//! tag token rather than by regex, so payload content can never terminate a
//! statement early.

use crate::errors::MigrationError;
use crate::generate::banner;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Heading of the script preamble section, which carries no statement and is
/// not an error to encounter.
const PREAMBLE_HEADING: &str = "PROMPTS WITH FULL CONTENT";

/// One well-formed section recovered from the combined file.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitSection {
    /// The row's `name` column value, taken from the statement's WHERE clause.
    pub name: String,
    /// The UPDATE statement, verbatim, through its terminating `;`.
    pub statement: String,
}

/// Result of a split run. Skipped sections are reported, never fatal.
#[derive(Debug, Default)]
pub struct SplitReport {
    pub created: Vec<PathBuf>,
    pub skipped: Vec<String>,
}

/// Parses the combined script into sections. Returns the well-formed sections
/// and a diagnostic per skipped one.
pub fn parse_sections(content: &str) -> (Vec<SplitSection>, Vec<String>) {
    let marker = format!("{}\n-- UPDATE ", banner());
    let mut sections = Vec::new();
    let mut skipped = Vec::new();

    for (i, raw) in content.split(&marker).enumerate() {
        if i == 0 {
            // Everything before the first marker is file preamble.
            continue;
        }
        let heading = raw.lines().next().unwrap_or("").trim();
        if heading == PREAMBLE_HEADING {
            continue;
        }
        match parse_statement(raw) {
            Some(section) => sections.push(section),
            None => skipped.push(format!(
                "section {i} ('{heading}'): no complete UPDATE statement found"
            )),
        }
    }

    (sections, skipped)
}

/// Recovers the UPDATE statement from one section body, or `None` when the
/// section does not follow the convention.
fn parse_statement(section: &str) -> Option<SplitSection> {
    let start = section.find("UPDATE prompt_templates")?;
    let body = &section[start..];

    // Opening dollar-quote tag: the first `$TAG$` token after the SET clause.
    let open_at = body.find('$')?;
    let tag_end = body[open_at + 1..].find('$')? + open_at + 1;
    let tag = &body[open_at + 1..tag_end];
    if tag.is_empty() || !tag.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        return None;
    }
    let delim = format!("${tag}$");

    // The payload ends at the next occurrence of the same token.
    let close_at = body[tag_end + 1..].find(&delim)? + tag_end + 1;
    let after_payload = close_at + delim.len();

    // Statement runs through the `;` that follows the closing delimiter.
    let semi_at = body[after_payload..].find(';')? + after_payload;
    let statement = body[..=semi_at].trim_start().to_string();

    // Row name comes from the WHERE clause, which by construction sits after
    // the payload and cannot be shadowed by payload content.
    let tail = &body[after_payload..=semi_at];
    let name_at = tail.find("name = '")? + "name = '".len();
    let name = read_quoted_scalar(&tail[name_at..])?;

    Some(SplitSection { name, statement })
}

/// Reads a single-quoted SQL scalar starting just past its opening quote,
/// un-doubling `''` escapes back to `'`. `None` when the quote never closes.
fn read_quoted_scalar(rest: &str) -> Option<String> {
    let mut out = String::new();
    let mut chars = rest.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\'' {
            if chars.peek() == Some(&'\'') {
                chars.next();
                out.push('\'');
            } else {
                return Some(out);
            }
        } else {
            out.push(c);
        }
    }
    None
}

/// The filename a section is written to: `UPDATE_<short-name>.sql`, with the
/// common `_extraction_rules` suffix dropped for readability.
pub fn section_filename(name: &str) -> String {
    let short = name.strip_suffix("_extraction_rules").unwrap_or(name);
    format!("UPDATE_{short}.sql")
}

/// Renders one output file: a short header, the statement verbatim, and a
/// verification query for the affected row.
pub fn section_file_contents(section: &SplitSection) -> String {
    format!(
        r#"-- Update {name}
-- Execute this statement in a database tool

{statement}

-- Verify the update worked:
SELECT name, doc_type, LENGTH(prompt_text) as length, is_active, updated_at
FROM prompt_templates
WHERE name = '{name}';
"#,
        name = section.name,
        statement = section.statement,
    )
}

/// Splits the combined file at `input` into per-statement files under
/// `out_dir`.
///
/// A missing input file is a fatal precondition failure; a malformed section
/// is skipped and reported in the returned [`SplitReport`].
pub fn split_file(input: &Path, out_dir: &Path) -> Result<SplitReport, MigrationError> {
    let content = fs::read_to_string(input)
        .map_err(|e| MigrationError::io(input.display().to_string(), e))?;
    fs::create_dir_all(out_dir)
        .map_err(|e| MigrationError::io(out_dir.display().to_string(), e))?;

    let (sections, skipped) = parse_sections(&content);
    for reason in &skipped {
        warn!("skipping {reason}");
    }

    let mut report = SplitReport {
        skipped,
        ..Default::default()
    };

    for section in &sections {
        let path = out_dir.join(section_filename(&section.name));
        fs::write(&path, section_file_contents(section))
            .map_err(|e| MigrationError::io(path.display().to_string(), e))?;
        info!(file = %path.display(), chars = section.statement.len(), "created split file");
        report.created.push(path);
    }

    Ok(report)
}
