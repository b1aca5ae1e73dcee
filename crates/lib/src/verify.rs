//! # Migration Verification
//!
//! Compares a prompt as extracted from source against the payload embedded in
//! a generated SQL file. Mismatches are reported with both lengths and a diff
//! excerpt around the first divergent line; nothing is auto-corrected.

use tracing::debug;

/// Lines of context shown on either side of the first divergence.
const EXCERPT_CONTEXT: usize = 2;

/// Outcome of comparing source text against a recovered payload.
#[derive(Debug, PartialEq)]
pub struct VerifyOutcome {
    pub matched: bool,
    pub source_len: usize,
    pub payload_len: usize,
    /// Present only on mismatch.
    pub excerpt: Option<String>,
}

/// Recovers the dollar-quoted payload from a generated statement.
///
/// Scans for the first `$TAG$` token and the matching closing token, then
/// trims the framing newlines the UPDATE layout adds around the payload.
/// Returns `None` when no complete dollar-quoted literal is present.
pub fn recover_payload(sql: &str) -> Option<String> {
    let open_at = sql.find('$')?;
    let tag_end = sql[open_at + 1..].find('$')? + open_at + 1;
    let tag = &sql[open_at + 1..tag_end];
    if tag.is_empty() || !tag.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_') {
        return None;
    }
    let delim = format!("${tag}$");

    let payload_start = tag_end + 1;
    let close_at = sql[payload_start..].find(&delim)? + payload_start;
    Some(sql[payload_start..close_at].trim().to_string())
}

/// Compares freshly-extracted source text with a recovered payload.
pub fn compare(source_text: &str, payload: &str) -> VerifyOutcome {
    let matched = source_text == payload;
    debug!(
        matched,
        source_len = source_text.len(),
        payload_len = payload.len(),
        "verification comparison"
    );
    VerifyOutcome {
        matched,
        source_len: source_text.chars().count(),
        payload_len: payload.chars().count(),
        excerpt: if matched {
            None
        } else {
            Some(diff_excerpt(source_text, payload))
        },
    }
}

/// Builds a short excerpt around the first line where the two texts diverge.
fn diff_excerpt(source_text: &str, payload: &str) -> String {
    let source_lines: Vec<&str> = source_text.lines().collect();
    let payload_lines: Vec<&str> = payload.lines().collect();

    let limit = source_lines.len().max(payload_lines.len());
    let diverged = (0..limit)
        .find(|&i| source_lines.get(i) != payload_lines.get(i))
        .unwrap_or(0);

    let from = diverged.saturating_sub(EXCERPT_CONTEXT);
    let mut out = format!("first divergence at line {}:\n", diverged + 1);
    for i in from..=(diverged + EXCERPT_CONTEXT).min(limit.saturating_sub(1)) {
        out.push_str(&format!(
            "  source  {:>5} | {}\n",
            i + 1,
            source_lines.get(i).unwrap_or(&"<missing>")
        ));
        out.push_str(&format!(
            "  payload {:>5} | {}\n",
            i + 1,
            payload_lines.get(i).unwrap_or(&"<missing>")
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_exact_insert_payload() {
        let sql = "VALUES ('x', $TAG_abc$Hello {text}$TAG_abc$, 1);";
        assert_eq!(recover_payload(sql).unwrap(), "Hello {text}");
    }

    #[test]
    fn recovers_update_payload_with_framing_newlines() {
        let sql = "SET prompt_text = $T1$\nline one\nline two\n$T1$,";
        assert_eq!(recover_payload(sql).unwrap(), "line one\nline two");
    }

    #[test]
    fn mismatch_reports_lengths_and_excerpt() {
        let outcome = compare("a\nb\nc", "a\nX\nc");
        assert!(!outcome.matched);
        assert_eq!(outcome.source_len, 5);
        let excerpt = outcome.excerpt.unwrap();
        assert!(excerpt.contains("line 2"));
        assert!(excerpt.contains('X'));
    }

    #[test]
    fn matching_texts_produce_no_excerpt() {
        let outcome = compare("same", "same");
        assert!(outcome.matched);
        assert!(outcome.excerpt.is_none());
    }
}
