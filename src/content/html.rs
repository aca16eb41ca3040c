//! HTML to Markdown conversion handler.
//!
//! Prunes non-content elements (navigation, headers, footers, scripts,
//! forms) with `scraper`, hands the rest to `html2md`, then rewrites
//! relative links against the page origin and collapses runs of blank lines.

use std::sync::LazyLock;

use anyhow::{anyhow, Result};
use regex::{Captures, Regex};
use scraper::{Html, Selector};
use url::Url;

use super::{ContentHandler, ConversionResult};

/// Elements that hold page chrome rather than content.
const NON_CONTENT_TAGS: &[&str] = &[
    "nav", "header", "footer", "aside", "script", "style", "noscript", "form", "button", "iframe",
];

/// Markdown link or image target: `](target)`.
static LINK_TARGET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\]\(([^)\s]+)\)").expect("link pattern is valid"));

/// Converts HTML responses to clean markdown.
pub struct HtmlHandler;

impl ContentHandler for HtmlHandler {
    fn supported_types(&self) -> &[&str] {
        &["text/html", "application/xhtml+xml"]
    }

    fn accepts(&self, content_type: &str) -> bool {
        is_html_content_type(content_type)
    }

    fn to_markdown(
        &self,
        bytes: &[u8],
        content_type: &str,
        source: Option<&Url>,
    ) -> Result<ConversionResult> {
        let start = std::time::Instant::now();
        let html = String::from_utf8_lossy(bytes);
        let markdown = html_to_markdown(&html, source)?;

        Ok(ConversionResult {
            markdown,
            page_count: None,
            content_type: content_type.to_string(),
            elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
        })
    }
}

/// Checks if the content type indicates HTML content.
#[must_use]
pub fn is_html_content_type(content_type: &str) -> bool {
    let ct = content_type.to_lowercase();
    ct.contains("text/html") || ct.contains("application/xhtml+xml")
}

/// Convert HTML to markdown.
///
/// When `base` is given, relative link and image targets become absolute
/// URLs on its origin (`scheme://host[:port]`).
pub fn html_to_markdown(html: &str, base: Option<&Url>) -> Result<String> {
    let pruned = strip_non_content(html)?;
    let mut md = html2md::parse_html(&pruned);
    if let Some(base) = base {
        md = resolve_links(&md, base);
    }
    Ok(collapse_blank_lines(&md))
}

/// Remove [`NON_CONTENT_TAGS`] subtrees and re-serialize the document.
fn strip_non_content(html: &str) -> Result<String> {
    let mut document = Html::parse_document(html);
    let selector = Selector::parse(&NON_CONTENT_TAGS.join(", "))
        .map_err(|e| anyhow!("invalid selector: {e:?}"))?;

    let ids: Vec<_> = document.select(&selector).map(|el| el.id()).collect();
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    Ok(document.html())
}

/// Rewrite `](target)` links whose target is relative, rooting them at the
/// origin of `base`.
fn resolve_links(markdown: &str, base: &Url) -> String {
    let Ok(origin) = base.join("/") else {
        return markdown.to_string();
    };
    LINK_TARGET
        .replace_all(markdown, |caps: &Captures| {
            let target = &caps[1];
            if target.starts_with('#') || Url::parse(target).is_ok() {
                return caps[0].to_string();
            }
            match origin.join(target) {
                Ok(absolute) => format!("]({absolute})"),
                Err(_) => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// Keep at most one blank line between content lines and trim the ends.
fn collapse_blank_lines(markdown: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut blank_run = 0;

    for line in markdown.lines() {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run <= 1 {
                out.push(line);
            }
        } else {
            blank_run = 0;
            out.push(line);
        }
    }

    out.join("\n").trim().to_string()
}
