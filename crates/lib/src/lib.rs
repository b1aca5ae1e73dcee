//! # Prompt Migration Toolkit
//!
//! This crate provides the batch operations behind the `promptmig` CLI: pulling
//! hardcoded prompt literals out of Python source, wrapping them in collision-safe
//! dollar-quoting, emitting the `prompt_templates` migration SQL, splitting that
//! SQL into per-statement files for a database tool or applying it directly, and
//! inspecting the resulting rows. It also carries the two one-off chores that
//! surround the migration: stripping banner-delimited commented-out blocks from
//! the old application file and converting static HTML pages into server-side
//! templates.
//!
//! Every operation is a synchronous, run-to-completion batch job over whole files;
//! only the database operations (status, apply) are async.

pub mod apply;
pub mod cleanup;
pub mod config;
pub mod errors;
pub mod extract;
pub mod generate;
pub mod quote;
pub mod split;
pub mod status;
pub mod templates;
pub mod types;
pub mod verify;

pub use errors::MigrationError;
pub use types::PromptRecord;

/// The database table every generated statement targets.
pub const PROMPT_TABLE: &str = "prompt_templates";

/// The `name` filter marking rows created by the hardcoded-prompt migration.
pub const MIGRATION_NAME_FILTER: &str = "%Hardcoded Migration%";
