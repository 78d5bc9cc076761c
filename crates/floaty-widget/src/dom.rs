//! Detached element tree for the host document body.
//!
//! Text extraction works on a copy of the page, never on the live document,
//! so hosts hand over an owned [`Element`] tree. [`parse_body`] builds one
//! from HTML.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use scraper::{Html, Selector};

static BODY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("body").expect("Invalid body selector"));

/// A node in the detached tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An element with a lowercase tag name, its attributes and its children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Remove every descendant element whose tag is in `tags`, subtree and
    /// all. Returns how many elements were removed.
    pub fn remove_descendants(&mut self, tags: &[&str]) -> usize {
        let before = self.children.len();
        self.children.retain(|child| match child {
            Node::Element(el) => !tags.contains(&el.tag.as_str()),
            Node::Text(_) => true,
        });
        let mut removed = before - self.children.len();

        for child in &mut self.children {
            if let Node::Element(el) = child {
                removed += el.remove_descendants(tags);
            }
        }
        removed
    }

    /// Concatenated text of all descendant text nodes, markup ignored.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(element: &Element, out: &mut String) {
    for child in &element.children {
        match child {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => collect_text(el, out),
        }
    }
}

/// Parse an HTML document and return its `<body>` as a detached tree.
///
/// The parser is forgiving: fragments and malformed markup still produce a
/// body (possibly empty).
pub fn parse_body(html: &str) -> Element {
    let document = Html::parse_document(html);
    match document.select(&BODY_SELECTOR).next() {
        Some(body) => match convert(*body) {
            Some(Node::Element(el)) => el,
            _ => Element::new("body"),
        },
        None => Element::new("body"),
    }
}

fn convert(node: ego_tree::NodeRef<'_, scraper::Node>) -> Option<Node> {
    match node.value() {
        scraper::Node::Element(el) => {
            let mut element = Element::new(el.name());
            for (name, value) in el.attrs() {
                element.attributes.insert(name.to_ascii_lowercase(), value.to_string());
            }
            element.children = node.children().filter_map(convert).collect();
            Some(Node::Element(element))
        }
        scraper::Node::Text(text) => Some(Node::Text(String::from(&*text.text))),
        _ => None,
    }
}
