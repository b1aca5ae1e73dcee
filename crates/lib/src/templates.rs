//! # Static Page to Template Conversion
//!
//! Converts the static industry HTML pages into server-side child templates:
//! title and meta description move into template blocks, the body is sliced
//! out between the first `<section>` and the footer placeholder, and asset
//! and page links are rewritten to `url_for(...)` helpers.

use crate::errors::MigrationError;
use crate::types::BatchReport;
use regex::Regex;
use std::fs;
use std::path::Path;
use tracing::info;

/// The industry pages converted when no explicit list is given.
pub const DEFAULT_PAGES: &[&str] = &[
    "architecture.html",
    "construction.html",
    "engineering.html",
    "government-contractors.html",
    "healthcare-admin.html",
    "insurance-underwriting.html",
    "legal-services.html",
    "logistics-freight.html",
    "mining-services.html",
    "property-management.html",
    "wealth-management.html",
];

/// Static pages whose links get rewritten to route helpers. Matching is by
/// prefix so anchors and query strings survive the rewrite.
const ROUTE_LINKS: &[(&str, &str)] = &[
    ("contact.html", "contact_page"),
    ("roi.html", "roi_calculator"),
    ("feasibility-sprint-report.html", "feasibility_sprint_report"),
];

/// Fallback metadata for pages missing a `<title>` or description tag.
#[derive(Debug, Clone)]
pub struct TemplateDefaults {
    pub title: String,
    pub description: String,
}

/// Pulls the page title and meta description out of the HTML head, falling
/// back to `defaults` for whichever is missing.
pub fn extract_metadata(html: &str, defaults: &TemplateDefaults) -> (String, String) {
    let title_re = Regex::new(r"<title>(.*?)</title>").expect("static pattern");
    let desc_re =
        Regex::new(r#"<meta name="description" content="(.*?)""#).expect("static pattern");

    let title = title_re
        .captures(html)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| defaults.title.clone());
    let description = desc_re
        .captures(html)
        .map(|c| c[1].to_string())
        .unwrap_or_else(|| defaults.description.clone());

    (title, description)
}

/// Slices the page body from the first `<section` to the footer placeholder
/// (or `</body>` when the placeholder is absent) and rewrites asset and page
/// links. Returns an empty string when the page has no `<section>` at all.
pub fn extract_body(html: &str) -> String {
    let Some(start) = html.find("<section") else {
        return String::new();
    };
    let end = html
        .find(r#"<div id="footer-placeholder">"#)
        .or_else(|| html.find("</body>"))
        .unwrap_or(html.len());

    let mut body = html[start..end].trim().to_string();

    // ../assets/<path> references become static-file helpers.
    let asset_re =
        Regex::new(r#"(href|src)="\.\./assets/([^"]+)""#).expect("static pattern");
    body = asset_re
        .replace_all(&body, r#"$1="{{ url_for('static', filename='$2') }}""#)
        .into_owned();

    // Known sibling pages become route helpers. Prefix replacement keeps any
    // anchor or query suffix plus the closing quote.
    for (page, endpoint) in ROUTE_LINKS {
        let from = format!(r#"href="../{page}"#);
        let to = format!(r#"href="{{{{ url_for('{endpoint}') }}}}"#);
        body = body.replace(&from, &to);
    }

    body
}

/// Renders the child template for one page.
pub fn convert_page(html: &str, defaults: &TemplateDefaults) -> String {
    let (title, description) = extract_metadata(html, defaults);
    let body = extract_body(html);

    format!(
        r#"{{% extends "base.html" %}}

{{% block title %}}{title}{{% endblock %}}
{{% block description %}}{description}{{% endblock %}}

{{% block content %}}
{body}
{{% endblock %}}
"#
    )
}

/// Converts every named page under `input_dir` into `output_dir`, keeping the
/// filename. Missing inputs are reported in the batch summary, not fatal.
pub fn convert_batch(
    input_dir: &Path,
    output_dir: &Path,
    files: &[String],
    defaults: &TemplateDefaults,
) -> Result<BatchReport, MigrationError> {
    fs::create_dir_all(output_dir)
        .map_err(|e| MigrationError::io(output_dir.display().to_string(), e))?;

    let mut report = BatchReport::default();
    for file in files {
        let input = input_dir.join(file);
        if !input.exists() {
            report.skip(format!("{}: file not found", input.display()));
            continue;
        }
        let html = fs::read_to_string(&input)
            .map_err(|e| MigrationError::io(input.display().to_string(), e))?;
        let output = output_dir.join(file);
        fs::write(&output, convert_page(&html, defaults))
            .map_err(|e| MigrationError::io(output.display().to_string(), e))?;
        info!(page = %file, "converted to template");
        report.ok(file.clone());
    }
    Ok(report)
}
