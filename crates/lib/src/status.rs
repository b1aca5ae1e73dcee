//! # Database Status Report
//!
//! Read-only inspection of the `prompt_templates` table after a migration run:
//! confirms the table exists, counts total and migrated rows, splits the
//! migrated rows by active flag, and lists per-row detail for manual review.

use crate::errors::MigrationError;
use crate::{MIGRATION_NAME_FILTER, PROMPT_TABLE};
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::info;

/// Detail row for the report listing.
#[derive(Debug, sqlx::FromRow)]
pub struct PromptRow {
    pub id: i32,
    pub name: String,
    pub scope: String,
    pub doc_type: Option<String>,
    pub prompt_length: i32,
    pub priority: i32,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// Aggregate counts plus the per-row detail listing.
#[derive(Debug)]
pub struct StatusReport {
    pub total: i64,
    pub migrated: i64,
    pub active: i64,
    pub inactive: i64,
    pub rows: Vec<PromptRow>,
}

/// Connects to the database named by `database_url`.
pub async fn connect(database_url: &str) -> Result<PgPool, MigrationError> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Errors with [`MigrationError::TableMissing`] when the prompt table has not
/// been created yet, so callers report a precondition instead of a bare query
/// failure.
pub async fn assert_prompt_table(pool: &PgPool) -> Result<(), MigrationError> {
    let table_exists: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT FROM information_schema.tables WHERE table_name = $1)",
    )
    .bind(PROMPT_TABLE)
    .fetch_one(pool)
    .await?;

    if !table_exists {
        return Err(MigrationError::TableMissing(PROMPT_TABLE.to_string()));
    }
    info!("{PROMPT_TABLE} table exists");
    Ok(())
}

/// Runs the status queries against `pool`, filtering the migrated-row counts
/// and listing by `name_filter` (a SQL LIKE pattern).
///
/// A missing `prompt_templates` table is a fatal precondition failure.
pub async fn run_status_report(
    pool: &PgPool,
    name_filter: &str,
) -> Result<StatusReport, MigrationError> {
    assert_prompt_table(pool).await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM prompt_templates")
        .fetch_one(pool)
        .await?;

    let migrated: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM prompt_templates WHERE name LIKE $1")
            .bind(name_filter)
            .fetch_one(pool)
            .await?;

    let active: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM prompt_templates WHERE name LIKE $1 AND is_active",
    )
    .bind(name_filter)
    .fetch_one(pool)
    .await?;

    let rows: Vec<PromptRow> = sqlx::query_as(
        r#"
        SELECT
            id,
            name,
            scope,
            doc_type,
            LENGTH(prompt_text) AS prompt_length,
            priority,
            is_active,
            created_at
        FROM prompt_templates
        WHERE name LIKE $1
        ORDER BY doc_type, priority
        "#,
    )
    .bind(name_filter)
    .fetch_all(pool)
    .await?;

    Ok(StatusReport {
        total,
        migrated,
        active,
        inactive: migrated - active,
        rows,
    })
}

/// The default LIKE filter matching rows created by the migration.
pub fn default_name_filter() -> &'static str {
    MIGRATION_NAME_FILTER
}
