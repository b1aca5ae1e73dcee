//! # Dollar-Quote Tag Derivation
//!
//! PostgreSQL dollar-quoting (`$TAG$ ... $TAG$`) lets a payload carry single
//! quotes, double quotes, and backslashes with no escaping at all, provided
//! the tag token never appears inside the payload. The tag here is a semantic
//! label plus a short hash of the payload's prefix, and the derived token is
//! checked against the payload before use: on a collision the tag is re-derived
//! with a salt until it is guaranteed absent.

/// Derives a dollar-quote tag for `text` that is guaranteed not to appear in
/// `text` itself.
///
/// The base tag is `<LABEL>_<md5(first 50 chars)[..8]>`. Deterministic: the
/// same payload and label always yield the same tag.
pub fn dollar_tag(text: &str, label: &str) -> String {
    let prefix: String = text.chars().take(50).collect();
    let digest = format!("{:x}", md5::compute(prefix.as_bytes()));

    let mut salt = 0u32;
    loop {
        let tag = if salt == 0 {
            format!("{label}_{}", &digest[..8])
        } else {
            format!("{label}_{}_{salt}", &digest[..8])
        };
        if !text.contains(&delimiter(&tag)) {
            return tag;
        }
        salt += 1;
    }
}

/// The full delimiter token for a tag, e.g. `$FINANCE_1a2b3c4d$`.
pub fn delimiter(tag: &str) -> String {
    format!("${tag}$")
}

/// Wraps `text` in dollar-quotes using a collision-checked tag.
///
/// Returns the quoted literal and the tag that was used, so callers can embed
/// the tag in surrounding SQL or recover the payload later.
pub fn dollar_quote(text: &str, label: &str) -> (String, String) {
    let tag = dollar_tag(text, label);
    let delim = delimiter(&tag);
    (format!("{delim}{text}{delim}"), tag)
}

/// Converts a `doc_type` like `vendor-invoice` into the tag label
/// `VENDOR_INVOICE`.
pub fn tag_label(doc_type: &str) -> String {
    doc_type.to_uppercase().replace('-', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_is_deterministic() {
        let text = "Extract all invoice line items from the document.";
        assert_eq!(dollar_tag(text, "FINANCE"), dollar_tag(text, "FINANCE"));
    }

    #[test]
    fn colliding_payload_gets_salted_tag() {
        // The hash covers only the first 50 chars, so appending the would-be
        // delimiter after a fixed prefix forces a collision with the base tag.
        let prefix = "X".repeat(50);
        let base = dollar_tag(&prefix, "TAG");
        let hostile = format!("{prefix} contains {}", delimiter(&base));

        let tag = dollar_tag(&hostile, "TAG");
        assert_ne!(tag, base);
        assert!(!hostile.contains(&delimiter(&tag)));
    }

    #[test]
    fn label_from_doc_type() {
        assert_eq!(tag_label("vendor-invoice"), "VENDOR_INVOICE");
        assert_eq!(tag_label("fta-list"), "FTA_LIST");
    }
}
