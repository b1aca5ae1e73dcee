//! # Statement Generation Tests
//!
//! Validates that generated INSERT/UPDATE statements carry the payload
//! byte-for-byte inside collision-safe dollar-quotes, that scalar fields are
//! escaped, and that generation is deterministic.

use promptmig::generate::{
    insert_statement, migration_script, update_script, update_statement, UpdateSection,
};
use promptmig::types::PromptRecord;
use promptmig::verify::recover_payload;

fn sample_record() -> PromptRecord {
    PromptRecord::migrated(
        "Finance - Vendor Invoice (Hardcoded Migration v1.0)",
        "document_type",
        "vendor-invoice",
        "Extract the vendor's details.\n\nRules:\n1. Don't guess.\n2. Use null when missing.\n\nTEXT: {text}",
    )
}

/// The payload inside an INSERT statement round-trips byte-for-byte, even
/// with apostrophes and blank lines in it.
#[test]
fn insert_payload_round_trips_exactly() {
    let record = sample_record();
    let sql = insert_statement(&record, "services/prompts/finance_prompt.py -> get_finance_prompt()");
    assert_eq!(recover_payload(&sql).unwrap(), record.prompt_text);
}

/// Apostrophes in scalar fields are doubled; the payload itself is never
/// character-escaped.
#[test]
fn scalar_fields_are_quoted_payload_is_not() {
    let mut record = sample_record();
    record.name = "Finance - Vendor's Invoice".to_string();
    let sql = insert_statement(&record, "finance_prompt.py -> get_finance_prompt()");

    assert!(sql.contains("'Finance - Vendor''s Invoice'"));
    // The payload keeps its single apostrophe untouched.
    assert!(recover_payload(&sql).unwrap().contains("vendor's details"));
}

/// Migrated records are inserted inactive with a conflict-upsert on name.
#[test]
fn insert_uses_upsert_and_starts_inactive() {
    let sql = insert_statement(&sample_record(), "finance_prompt.py -> get_finance_prompt()");
    assert!(sql.contains("ON CONFLICT (name) DO UPDATE SET"));
    assert!(sql.contains("false  -- Keep inactive initially"));
    assert!(sql.contains("-- Prompt Length: "));
}

/// Identical inputs produce byte-identical output.
#[test]
fn generation_is_deterministic() {
    let record = sample_record();
    let a = insert_statement(&record, "src -> f()");
    let b = insert_statement(&record, "src -> f()");
    assert_eq!(a, b);

    let section = UpdateSection {
        db_name: "finance_extraction_rules".to_string(),
        prompt_text: record.prompt_text.clone(),
        label: "FINANCE_FULL".to_string(),
    };
    assert_eq!(
        update_script(std::slice::from_ref(&section)),
        update_script(std::slice::from_ref(&section))
    );
}

/// UPDATE statements target name and scope, and carry a verification query.
#[test]
fn update_statement_recovers_payload_and_targets_row() {
    let text = "Line one.\nLine two with {text}.";
    let sql = update_statement("finance_extraction_rules", text, "FINANCE_FULL");

    assert_eq!(recover_payload(&sql).unwrap(), text);
    assert!(sql.contains("WHERE name = 'finance_extraction_rules'"));
    assert!(sql.contains("AND scope = 'document_type';"));
    assert!(sql.contains("-- Verify:"));
}

/// The combined migration script disables existing prompts first and appends
/// the verification queries.
#[test]
fn migration_script_has_preamble_and_footer() {
    let entries = vec![(sample_record(), "finance_prompt.py -> get_finance_prompt()".to_string())];
    let sql = migration_script(&entries);

    assert!(sql.starts_with("-- Migration: Upload Hardcoded Prompts to Database"));
    assert!(sql.contains("UPDATE prompt_templates SET is_active = false WHERE is_active = true;"));
    assert!(sql.contains("INSERT INTO prompt_templates"));
    assert!(sql.contains("-- VERIFICATION QUERIES"));
    assert!(sql.contains("GROUP BY scope;"));
}

/// A payload that embeds its own would-be delimiter still generates a
/// parseable statement: the tag is salted away from the collision.
#[test]
fn hostile_payload_still_round_trips() {
    let prefix = "A".repeat(50);
    let probe = update_statement("row", &prefix, "TAG");
    // Find the tag the generator would use for this prefix.
    let tag_start = probe.find("= $").unwrap() + 3;
    let tag_end = probe[tag_start..].find('$').unwrap() + tag_start;
    let base_delim = format!("${}$", &probe[tag_start..tag_end]);

    let hostile = format!("{prefix} quoting {base_delim} inline");
    let sql = update_statement("row", &hostile, "TAG");
    assert_eq!(recover_payload(&sql).unwrap(), hostile);
}
