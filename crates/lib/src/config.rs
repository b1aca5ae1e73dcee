//! # Source Manifest and Environment
//!
//! The manifest (`prompts.toml`) lists where each hardcoded prompt lives and
//! how its database row is identified. It replaces the per-script hardcoded
//! tables the original migration grew, so every command works off one file.

use crate::errors::MigrationError;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use tracing::info;

/// One prompt source: the Python file and function holding the literal, plus
/// the identity of the database row it migrates into.
#[derive(Debug, Clone, Deserialize)]
pub struct PromptSource {
    /// Short key used in console output, e.g. `finance`.
    pub key: String,
    /// Path of the Python source file, relative to the manifest.
    pub path: String,
    /// Function whose returned literal is the prompt.
    pub function: String,
    /// Unique `name` column value for the INSERT migration.
    pub name: String,
    /// `name` column value of the pre-existing row the UPDATE script targets.
    pub db_name: String,
    /// Dollar-quote tag label for the UPDATE script, e.g. `FINANCE_FULL`.
    pub tag: String,
    #[serde(default = "default_scope")]
    pub scope: String,
    pub doc_type: String,
    #[serde(default = "default_priority")]
    pub priority: i32,
}

fn default_scope() -> String {
    "document_type".to_string()
}

fn default_priority() -> i32 {
    1
}

/// The parsed manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    #[serde(rename = "prompt")]
    pub prompts: Vec<PromptSource>,
}

impl Manifest {
    /// Loads and parses the manifest at `path`. A missing or malformed
    /// manifest is a fatal precondition failure.
    pub fn load(path: &Path) -> Result<Self, MigrationError> {
        let raw = fs::read_to_string(path).map_err(|e| MigrationError::ManifestRead {
            path: path.display().to_string(),
            source: e,
        })?;
        let manifest: Manifest =
            toml::from_str(&raw).map_err(|e| MigrationError::ManifestParse {
                path: path.display().to_string(),
                source: e,
            })?;
        info!(
            sources = manifest.prompts.len(),
            manifest = %path.display(),
            "loaded prompt manifest"
        );
        Ok(manifest)
    }
}

/// Reads `DATABASE_URL` from the environment, consulting a `.env` file first.
/// Absence is fatal: every database command needs it.
pub fn database_url() -> Result<String, MigrationError> {
    dotenvy::dotenv().ok();
    env::var("DATABASE_URL").map_err(|_| MigrationError::MissingDatabaseUrl)
}
