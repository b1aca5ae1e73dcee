use thiserror::Error;

/// Fatal precondition failures shared across the toolkit.
///
/// Per-item "not found" conditions live in their own module error types
/// (e.g. [`crate::extract::ExtractError`]) because they are reported and
/// skipped, not fatal. Everything here aborts the run with a diagnostic.
#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("DATABASE_URL is not set. Export it or add it to a .env file.")]
    MissingDatabaseUrl,
    #[error("Table '{0}' does not exist. Run the database setup SQL first.")]
    TableMissing(String),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Failed to read manifest '{path}': {source}")]
    ManifestRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse manifest '{path}': {source}")]
    ManifestParse {
        path: String,
        source: toml::de::Error,
    },
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl MigrationError {
    /// Wraps an I/O error with the path it occurred on.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
