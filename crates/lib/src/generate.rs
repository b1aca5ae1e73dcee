//! # SQL Statement Generation
//!
//! Pure text generation for the `prompt_templates` migration: per-record
//! INSERT-with-upsert blocks, UPDATE-by-name statements, and the combined
//! migration scripts that wrap them in banner comments and verification
//! queries. Identical inputs always produce byte-identical output; the only
//! timestamps are `CURRENT_TIMESTAMP` expressions evaluated by the database.

use crate::quote::{dollar_quote, tag_label};
use crate::types::PromptRecord;

/// The banner line used to delimit sections in generated scripts. The batch
/// splitter keys on this exact convention.
pub fn banner() -> String {
    format!("-- {}", "=".repeat(76))
}

/// Doubles single quotes for embedding a scalar value in a SQL string literal.
/// Payload text never goes through this; it is dollar-quoted instead.
pub fn escape_scalar(value: &str) -> String {
    value.replace('\'', "''")
}

/// Generates one INSERT block for a record: banner header, upsert statement.
///
/// `source` names where the prompt came from (file and function), purely for
/// the header comment. Rows conflict-upsert on `name`, so re-running the
/// migration refreshes `prompt_text` instead of failing.
pub fn insert_statement(record: &PromptRecord, source: &str) -> String {
    let label = tag_label(&record.doc_type);
    let (quoted, _tag) = dollar_quote(&record.prompt_text, &label);
    let banner = banner();

    let activity_note = if record.is_active {
        ""
    } else {
        "  -- Keep inactive initially - enable after testing"
    };

    format!(
        r#"{banner}
-- {name}
-- Source: {source}
-- Prompt Length: {len} characters
{banner}

INSERT INTO prompt_templates (name, scope, doc_type, prompt_text, priority, is_active)
VALUES (
    '{esc_name}',
    '{esc_scope}',
    '{esc_doc_type}',
    {quoted},
    {priority},
    {is_active}{activity_note}
)
ON CONFLICT (name) DO UPDATE SET
    prompt_text = EXCLUDED.prompt_text,
    updated_at = CURRENT_TIMESTAMP;
"#,
        name = record.name,
        esc_name = escape_scalar(&record.name),
        esc_scope = escape_scalar(&record.scope),
        esc_doc_type = escape_scalar(&record.doc_type),
        len = record.prompt_text.chars().count(),
        priority = record.priority,
        is_active = record.is_active,
    )
}

/// Generates an UPDATE-by-name statement plus its verification query.
///
/// The dollar-quote delimiters sit on their own lines so the statement stays
/// readable in a database tool; payload recovery trims the framing newlines
/// back off.
pub fn update_statement(db_name: &str, prompt_text: &str, label: &str) -> String {
    let (_, tag) = dollar_quote(prompt_text, label);
    let esc_name = escape_scalar(db_name);

    format!(
        r#"UPDATE prompt_templates
SET
    prompt_text = ${tag}$
{prompt_text}
${tag}$,
    updated_at = CURRENT_TIMESTAMP
WHERE name = '{esc_name}'
  AND scope = 'document_type';

-- Verify:
SELECT name, doc_type, LENGTH(prompt_text) as length, is_active, updated_at
FROM prompt_templates
WHERE name = '{esc_name}';
"#
    )
}

/// Assembles the full INSERT migration script: preamble, a block per record,
/// and the verification queries used for manual inspection afterwards.
pub fn migration_script(entries: &[(PromptRecord, String)]) -> String {
    let mut parts = vec![script_header()];
    for (record, source) in entries {
        parts.push(insert_statement(record, source));
    }
    parts.push(verification_footer());
    parts.join("\n")
}

/// One section of the combined UPDATE script.
#[derive(Debug, Clone)]
pub struct UpdateSection {
    /// The `name` column value identifying the row, e.g. `finance_extraction_rules`.
    pub db_name: String,
    /// The full prompt payload.
    pub prompt_text: String,
    /// Label for the dollar-quote tag, e.g. `FINANCE_FULL`.
    pub label: String,
}

/// Assembles the combined UPDATE script using the section-marker convention
/// the splitter understands: banner, `-- UPDATE <NAME>`, prompt length,
/// banner, statement.
pub fn update_script(sections: &[UpdateSection]) -> String {
    let banner = banner();
    let mut out = format!(
        "{banner}\n-- UPDATE PROMPTS WITH FULL CONTENT\n-- Execute each UPDATE statement separately in a database tool\n{banner}\n\n"
    );
    for section in sections {
        let heading = section.db_name.to_uppercase().replace('_', " ");
        let len = section.prompt_text.chars().count();
        out.push_str(&format!(
            "{banner}\n-- UPDATE {heading}\n-- Prompt Length: {len} characters\n{banner}\n\n"
        ));
        out.push_str(&update_statement(
            &section.db_name,
            &section.prompt_text,
            &section.label,
        ));
        out.push('\n');
    }
    out
}

fn script_header() -> String {
    r#"-- Migration: Upload Hardcoded Prompts to Database
-- Generated by promptmig extract
-- Date: Auto-generated
--
-- IMPORTANT: Run this SQL in your PostgreSQL database to migrate prompts.
-- All prompts will be inserted with is_active = false (disabled).
-- Enable them after testing:
--   UPDATE prompt_templates SET is_active = true WHERE name LIKE '%Hardcoded Migration%';

-- Disable all existing prompts first (safety measure)
UPDATE prompt_templates SET is_active = false WHERE is_active = true;
"#
    .to_string()
}

fn verification_footer() -> String {
    let banner = banner();
    format!(
        r#"{banner}
-- VERIFICATION QUERIES
{banner}

-- Verify inserted prompts
SELECT
    id,
    name,
    scope,
    doc_type,
    LENGTH(prompt_text) as prompt_length_characters,
    priority,
    is_active,
    created_at
FROM prompt_templates
WHERE name LIKE '%Hardcoded Migration%'
ORDER BY created_at DESC;

-- Count prompts by scope and status
SELECT
    scope,
    COUNT(*) as total_count,
    SUM(CASE WHEN is_active THEN 1 ELSE 0 END) as active_count,
    AVG(LENGTH(prompt_text)) as avg_length,
    MAX(LENGTH(prompt_text)) as max_length
FROM prompt_templates
WHERE name LIKE '%Hardcoded Migration%'
GROUP BY scope;
"#
    )
}
