//! # Prompt Text Extraction
//!
//! Locates a function in a Python source blob and pulls out the triple-quoted
//! literal it returns. The prompts being migrated are large f-strings that may
//! themselves contain quote characters, so the closing delimiter is found by
//! scanning line-by-line for a line whose trimmed form starts with `"""`,
//! rather than taking the first `"""` anywhere in the text.

use regex::Regex;
use thiserror::Error;
use tracing::debug;

/// Per-item extraction failures. Reported and skipped by batch callers,
/// never fatal to a run.
#[derive(Error, Debug, PartialEq)]
pub enum ExtractError {
    #[error("Function '{0}' not found in source")]
    FunctionNotFound(String),
    #[error("No `return f\"\"\"` literal found after function '{0}'")]
    ReturnLiteralNotFound(String),
    #[error("Closing \"\"\" delimiter not found for function '{0}'")]
    UnterminatedLiteral(String),
}

/// Extracts the prompt text returned by `function_name` in `source`.
///
/// The returned text is the literal's inner content with surrounding
/// whitespace trimmed and runs of blank lines collapsed to a single blank
/// line. Embedded `"""` sequences that appear mid-line (e.g. inside example
/// JSON) do not terminate the literal; only a line that *starts* with the
/// delimiter after trimming does.
pub fn extract_prompt(source: &str, function_name: &str) -> Result<String, ExtractError> {
    let func_pattern = format!(r"(?s)def {}\(.*?\):", regex::escape(function_name));
    let func_re = Regex::new(&func_pattern).expect("static pattern");
    let func_match = func_re
        .find(source)
        .ok_or_else(|| ExtractError::FunctionNotFound(function_name.to_string()))?;

    let remaining = &source[func_match.end()..];

    let return_re = Regex::new(r#"return\s+f?""""#).expect("static pattern");
    let return_match = return_re
        .find(remaining)
        .ok_or_else(|| ExtractError::ReturnLiteralNotFound(function_name.to_string()))?;

    let body = &remaining[return_match.end()..];
    let inner = take_until_closing_delimiter(body)
        .ok_or_else(|| ExtractError::UnterminatedLiteral(function_name.to_string()))?;

    let collapsed = collapse_blank_lines(&inner);
    let text = collapsed.trim().to_string();
    debug!(
        function = function_name,
        chars = text.len(),
        "extracted prompt literal"
    );
    Ok(text)
}

/// Scans `body` line-by-line and returns everything before the closing `"""`.
///
/// Only a line whose trimmed form *starts* with `"""` closes the literal; a
/// `"""` embedded mid-line is payload. A naive first-match search would
/// truncate prompts that quote the delimiter in examples. Returns `None` when
/// no closing delimiter exists.
fn take_until_closing_delimiter(body: &str) -> Option<String> {
    let mut kept: Vec<&str> = Vec::new();

    for line in body.split('\n') {
        if line.trim().starts_with("\"\"\"") {
            return Some(kept.join("\n"));
        }
        kept.push(line);
    }

    None
}

/// Collapses runs of three or more newline-separated blank stretches into a
/// single blank line.
fn collapse_blank_lines(text: &str) -> String {
    let re = Regex::new(r"\n\s*\n\s*\n").expect("static pattern");
    let mut out = text.to_string();
    // Replace repeatedly: a long run shrinks by one blank line per pass.
    loop {
        let next = re.replace_all(&out, "\n\n").into_owned();
        if next == out {
            return out;
        }
        out = next;
    }
}
