use serde::{Deserialize, Serialize};

/// A prompt template row as stored in `prompt_templates`.
///
/// `name` is unique across the table. `prompt_text` must round-trip
/// byte-for-byte through extraction, quoting, and statement generation; it
/// regularly contains quote characters, braces, and delimiter-like sequences.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PromptRecord {
    pub name: String,
    pub scope: String,
    pub doc_type: String,
    pub prompt_text: String,
    pub priority: i32,
    pub is_active: bool,
}

impl PromptRecord {
    /// Builds a record with the migration defaults: priority 1, inserted
    /// inactive so it can be reviewed before the serving path may select it.
    pub fn migrated(
        name: impl Into<String>,
        scope: impl Into<String>,
        doc_type: impl Into<String>,
        prompt_text: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            scope: scope.into(),
            doc_type: doc_type.into(),
            prompt_text: prompt_text.into(),
            priority: 1,
            is_active: false,
        }
    }
}

/// Outcome of one batch run, printed as the run summary.
///
/// `processed` holds the items that went through; `skipped` holds per-item
/// failures with their diagnostics. Skips never abort the batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub processed: Vec<String>,
    pub skipped: Vec<String>,
}

impl BatchReport {
    pub fn ok(&mut self, item: impl Into<String>) {
        self.processed.push(item.into());
    }

    pub fn skip(&mut self, reason: impl Into<String>) {
        self.skipped.push(reason.into());
    }

    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}
