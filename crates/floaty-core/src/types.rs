use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// Value types
// =============================================================================

/// CSS color used as the button's theme (e.g. `#000000`, `rebeccapurple`).
///
/// The value is passed through to the renderer verbatim; the widget does not
/// validate CSS syntax.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThemeColor(pub String);

impl ThemeColor {
    /// Name of the derived CSS variable the renderer recomputes on theme change.
    pub const MAIN_COLOR_VARIABLE: &'static str = "--main-color";

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `(name, value)` pair for the derived main-color variable.
    pub fn main_color_variable(&self) -> (&'static str, &str) {
        (Self::MAIN_COLOR_VARIABLE, &self.0)
    }
}

impl fmt::Display for ThemeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// CSS length for the panel (e.g. `400px`, `60vw`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dimension(pub String);

impl Dimension {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Enums
// =============================================================================

/// The two visual components the widget attaches to the host page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetKind {
    /// The round toggle button fixed to the viewport corner.
    Button,
    /// The floating panel hosting the embedded document.
    Panel,
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidgetKind::Button => write!(f, "floaty-button"),
            WidgetKind::Panel => write!(f, "floaty-window"),
        }
    }
}

/// A message sent across the embedding boundary into the panel's document.
///
/// Serialized with the payload flattened next to a `type` tag, so
/// `PageText` goes over the wire as `{"type":"PageText","text":"..."}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
#[non_exhaustive]
pub enum Message {
    /// The host page's extracted visible text.
    PageText { text: String },
}

impl Message {
    pub fn page_text(text: impl Into<String>) -> Self {
        Message::PageText { text: text.into() }
    }

    /// The wire tag of this message.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::PageText { .. } => "PageText",
        }
    }
}
