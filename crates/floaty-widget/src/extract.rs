//! Visible-text extraction from the host document.
//!
//! The extracted text is what a reader would see: markup, scripts and style
//! rules are dropped, block boundaries become breaks, and the result is
//! flattened to a single line with single spaces.

use std::sync::LazyLock;

use regex::Regex;

use crate::dom::{Element, Node};
use crate::host::HostPage;

/// Elements removed from the copy before text is computed.
pub const NON_CONTENT_TAGS: [&str; 5] = ["script", "style", "noscript", "link", "meta"];

/// Elements whose contents are never rendered as text. Replaced elements and
/// form controls only show their children as fallback or as control state.
const UNRENDERED_TAGS: [&str; 12] = [
    "template", "head", "title", "iframe", "textarea", "select", "object", "video", "audio",
    "canvas", "noembed", "noframes",
];

const BLOCK_TAGS: [&str; 37] = [
    "address", "article", "aside", "blockquote", "body", "caption", "dd", "details", "dialog",
    "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3",
    "h4", "h5", "h6", "header", "hgroup", "hr", "li", "main", "nav", "ol", "p", "pre", "section",
    "summary", "table", "tr", "ul",
];

const CELL_TAGS: [&str; 2] = ["td", "th"];

static LINE_BREAKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n]+").expect("Invalid line break regex"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Extract the visible text of `body` as a single normalized line.
///
/// Works on a deep copy; `body` is left untouched. An empty body yields an
/// empty string.
pub fn extract_visible_text(body: &Element) -> String {
    extract_from_copy(body.clone())
}

/// Snapshot the host's body and extract its visible text.
///
/// A failed snapshot is logged and yields an empty string, so callers on the
/// click path never see an error.
pub fn extract_page_text(host: &dyn HostPage) -> String {
    match host.snapshot_body() {
        Ok(body) => extract_from_copy(body),
        Err(e) => {
            tracing::warn!(error = %e, "Could not snapshot host body, sending empty text");
            String::new()
        }
    }
}

fn extract_from_copy(mut body: Element) -> String {
    let removed = body.remove_descendants(&NON_CONTENT_TAGS);
    let text = rendered_text(&body);
    let text = normalize(text.trim());
    tracing::debug!(removed, text_len = text.len(), "Extracted page text");
    text
}

/// Layout-aware text of an element: block boundaries and `<br>` become line
/// breaks, table cells are separated by tabs, hidden content is skipped.
pub fn rendered_text(element: &Element) -> String {
    let mut out = String::new();
    render_into(element, &mut out);
    out
}

fn render_into(element: &Element, out: &mut String) {
    let tag = element.tag.as_str();
    if element.has_attribute("hidden") || UNRENDERED_TAGS.contains(&tag) {
        return;
    }
    if tag == "br" {
        out.push('\n');
        return;
    }

    let block = BLOCK_TAGS.contains(&tag);
    if block {
        out.push('\n');
    }
    for child in &element.children {
        match child {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => render_into(el, out),
        }
    }
    if CELL_TAGS.contains(&tag) {
        out.push('\t');
    }
    if block {
        out.push('\n');
    }
}

/// Collapse line-break runs, then every whitespace run, into single spaces.
pub fn normalize(text: &str) -> String {
    let flattened = LINE_BREAKS.replace_all(text, " ");
    WHITESPACE.replace_all(&flattened, " ").into_owned()
}
