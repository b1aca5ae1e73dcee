//! # Direct Script Execution
//!
//! Executes a generated migration or UPDATE script straight against the
//! database, for environments without a SQL tool. The file is partitioned
//! into statements with the same dollar-quote awareness as the splitter, the
//! data statements run in a single transaction, and the affected rows are
//! listed afterwards so the operator can confirm full prompts landed instead
//! of placeholders.

use crate::errors::MigrationError;
use crate::status::assert_prompt_table;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::fs;
use std::path::Path;
use tracing::info;

/// A prompt shorter than this is almost certainly a leftover placeholder row
/// rather than a migrated full prompt.
pub const PLACEHOLDER_LENGTH: i32 = 1000;

/// Post-run detail row for the rows the script targets.
#[derive(Debug, sqlx::FromRow)]
pub struct AppliedRow {
    pub name: String,
    pub doc_type: Option<String>,
    pub prompt_length: i32,
    pub is_active: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl AppliedRow {
    pub fn looks_like_placeholder(&self) -> bool {
        self.prompt_length < PLACEHOLDER_LENGTH
    }
}

/// Result of one apply run.
#[derive(Debug)]
pub struct ApplyReport {
    pub executed: usize,
    pub queries_skipped: usize,
    pub rows: Vec<AppliedRow>,
}

/// Partitions a generated script into executable statements.
///
/// Comment lines outside a payload are banner decoration and are dropped;
/// inside a dollar-quoted payload every line is content, so neither `--`
/// prefixes nor `;` characters there can end a statement. A statement ends at
/// the first `;` seen outside a payload.
pub fn parse_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut open: Option<String> = None;

    for line in sql.lines() {
        if let Some(delim) = &open {
            let delim = delim.clone();
            current.push(line);
            if line.contains(&delim) {
                open = None;
                if rest_after_last(line, &delim).contains(';') {
                    flush(&mut current, &mut statements);
                }
            }
            continue;
        }

        if line.trim_start().starts_with("--") {
            continue;
        }

        if let Some(delim) = opening_delimiter(line) {
            current.push(line);
            if line.matches(&delim).count() >= 2 {
                // Payload opened and closed on the same line.
                if rest_after_last(line, &delim).contains(';') {
                    flush(&mut current, &mut statements);
                }
            } else {
                open = Some(delim);
            }
            continue;
        }

        current.push(line);
        if line.contains(';') {
            flush(&mut current, &mut statements);
        }
    }
    flush(&mut current, &mut statements);

    statements
}

/// The first `$TAG$` token on `line`, if any. Tags are ascii identifiers;
/// anything else (say a stray `$` inside a string literal) is not a quote.
fn opening_delimiter(line: &str) -> Option<String> {
    let start = line.find('$')?;
    let end = line[start + 1..].find('$')? + start + 1;
    let tag = &line[start + 1..end];
    if tag.is_empty() || !tag.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        return None;
    }
    Some(format!("${tag}$"))
}

/// The tail of `line` after its last occurrence of `token`.
fn rest_after_last<'a>(line: &'a str, token: &str) -> &'a str {
    match line.rfind(token) {
        Some(at) => &line[at + token.len()..],
        None => line,
    }
}

fn flush(current: &mut Vec<&str>, statements: &mut Vec<String>) {
    let text = current.join("\n").trim().to_string();
    current.clear();
    if !text.is_empty() {
        statements.push(text);
    }
}

/// Executes the data statements of the script at `input` in one transaction,
/// then lists the document-type prompt rows for review.
///
/// Verification SELECTs embedded in the script are skipped and counted; the
/// listing afterwards covers what they would have shown. A missing input file
/// or `prompt_templates` table is a fatal precondition failure.
pub async fn apply_file(pool: &PgPool, input: &Path) -> Result<ApplyReport, MigrationError> {
    let sql = fs::read_to_string(input)
        .map_err(|e| MigrationError::io(input.display().to_string(), e))?;
    let statements = parse_statements(&sql);

    assert_prompt_table(pool).await?;

    let mut tx = pool.begin().await?;
    let mut executed = 0usize;
    let mut queries_skipped = 0usize;
    for statement in &statements {
        if statement.to_ascii_uppercase().starts_with("SELECT") {
            queries_skipped += 1;
            continue;
        }
        sqlx::query(statement).execute(&mut *tx).await?;
        executed += 1;
    }
    tx.commit().await?;
    info!(
        executed,
        skipped = queries_skipped,
        file = %input.display(),
        "applied script"
    );

    let rows = list_applied_rows(pool).await?;
    Ok(ApplyReport {
        executed,
        queries_skipped,
        rows,
    })
}

async fn list_applied_rows(pool: &PgPool) -> Result<Vec<AppliedRow>, MigrationError> {
    let rows = sqlx::query_as(
        r#"
        SELECT
            name,
            doc_type,
            LENGTH(prompt_text) AS prompt_length,
            is_active,
            updated_at
        FROM prompt_templates
        WHERE scope = 'document_type'
        ORDER BY doc_type
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
