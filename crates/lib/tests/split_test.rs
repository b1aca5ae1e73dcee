//! # Batch Splitter Tests
//!
//! Validates partitioning of a combined UPDATE script: N well-formed sections
//! become exactly N files, statements are preserved verbatim, and malformed
//! sections are skipped with a report instead of failing the run.

use promptmig::generate::{update_script, UpdateSection};
use promptmig::split::{parse_sections, section_file_contents, section_filename, split_file};
use std::fs;

fn sample_sections() -> Vec<UpdateSection> {
    vec![
        UpdateSection {
            db_name: "finance_extraction_rules".to_string(),
            prompt_text: "Finance rules.\n\nUse null; never guess.\nTEXT: {text}".to_string(),
            label: "FINANCE_FULL".to_string(),
        },
        UpdateSection {
            db_name: "logistics_extraction_rules".to_string(),
            prompt_text: "Logistics rules.\nList every FTA document.".to_string(),
            label: "LOGISTICS_FULL".to_string(),
        },
    ]
}

/// A combined script with N sections parses into exactly N statements, and
/// each statement appears verbatim in the source file.
#[test]
fn n_sections_yield_n_statements() {
    let script = update_script(&sample_sections());
    let (sections, skipped) = parse_sections(&script);

    assert_eq!(sections.len(), 2);
    assert!(skipped.is_empty());
    assert_eq!(sections[0].name, "finance_extraction_rules");
    assert_eq!(sections[1].name, "logistics_extraction_rules");
    for section in &sections {
        assert!(script.contains(&section.statement));
        assert!(section.statement.starts_with("UPDATE prompt_templates"));
        assert!(section.statement.ends_with(';'));
    }
}

/// Semicolons inside the dollar-quoted payload do not end the statement; it
/// runs through the `;` after the closing delimiter.
#[test]
fn payload_semicolons_do_not_split_statement() {
    let script = update_script(&sample_sections());
    let (sections, _) = parse_sections(&script);
    assert!(sections[0].statement.contains("Use null; never guess."));
    assert!(sections[0].statement.contains("WHERE name = 'finance_extraction_rules'"));
}

/// A section missing its statement is skipped and reported; the rest of the
/// file still splits.
#[test]
fn malformed_section_is_skipped_not_fatal() {
    let mut script = update_script(&sample_sections());
    let banner = promptmig::generate::banner();
    script.push_str(&format!(
        "{banner}\n-- UPDATE BROKEN SECTION\n-- Prompt Length: 0 characters\n{banner}\n\n-- statement got lost\n"
    ));

    let (sections, skipped) = parse_sections(&script);
    assert_eq!(sections.len(), 2);
    assert_eq!(skipped.len(), 1);
    assert!(skipped[0].contains("BROKEN SECTION"));
}

/// A row name containing a quote is doubled in the WHERE clause; parsing
/// un-doubles it back instead of truncating at the first quote.
#[test]
fn quoted_name_round_trips_through_parse() {
    let script = update_script(&[UpdateSection {
        db_name: "o'brien_extraction_rules".to_string(),
        prompt_text: "Rules for the O'Brien account.".to_string(),
        label: "OBRIEN_FULL".to_string(),
    }]);

    let (sections, skipped) = parse_sections(&script);
    assert!(skipped.is_empty());
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].name, "o'brien_extraction_rules");
    assert!(sections[0].statement.contains("WHERE name = 'o''brien_extraction_rules'"));
}

/// Filenames drop the `_extraction_rules` suffix.
#[test]
fn filenames_use_short_names() {
    assert_eq!(section_filename("finance_extraction_rules"), "UPDATE_finance.sql");
    assert_eq!(section_filename("custom_row"), "UPDATE_custom_row.sql");
}

/// Splitting to disk creates one file per section, each holding the statement
/// plus a verification query.
#[test]
fn split_file_writes_one_file_per_statement() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("update_prompts_full.sql");
    fs::write(&input, update_script(&sample_sections()))?;

    let out_dir = dir.path().join("split");
    let report = split_file(&input, &out_dir)?;

    assert_eq!(report.created.len(), 2);
    assert!(report.skipped.is_empty());

    let finance = fs::read_to_string(out_dir.join("UPDATE_finance.sql"))?;
    assert!(finance.starts_with("-- Update finance_extraction_rules"));
    assert!(finance.contains("UPDATE prompt_templates"));
    assert!(finance.contains("-- Verify the update worked:"));
    assert!(finance.contains("WHERE name = 'finance_extraction_rules';"));
    Ok(())
}

/// A missing input file is a fatal precondition failure.
#[test]
fn missing_input_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let result = split_file(&dir.path().join("nope.sql"), dir.path());
    assert!(result.is_err());
}

/// The rendered section file embeds the statement verbatim.
#[test]
fn section_file_contains_statement_verbatim() {
    let script = update_script(&sample_sections());
    let (sections, _) = parse_sections(&script);
    let contents = section_file_contents(&sections[1]);
    assert!(contents.contains(&sections[1].statement));
    assert!(contents.contains("WHERE name = 'logistics_extraction_rules';"));
}
