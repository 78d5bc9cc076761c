//! Capability traits for the widget's external collaborators.
//!
//! The widget never touches a real page directly. It renders through a
//! [`Renderer`], attaches to and reads from a [`HostPage`], and talks to the
//! panel's embedded document through an [`EmbeddedDocument`]. Embedders
//! provide the implementations; tests use recording mocks.

use floaty_core::error::Result;
use floaty_core::types::{Message, ThemeColor, WidgetKind};

use crate::button::ButtonState;
use crate::dom::Element;
use crate::panel::PanelState;

/// Draws the widget. Opaque to the widget: it only reports state.
pub trait Renderer: Send + Sync {
    /// Present the button in the given state.
    fn render_button(&self, state: &ButtonState);

    /// Present the panel in the given state.
    fn render_panel(&self, state: &PanelState);

    /// Recompute the derived main-color variable after a theme change.
    fn set_main_color(&self, color: &ThemeColor);
}

/// The page the widget is embedded in.
pub trait HostPage: Send + Sync {
    /// The page's origin (`scheme://host[:port]`), used as the base for
    /// resolving the panel's target link.
    fn origin(&self) -> String;

    /// Append a widget as the last child of the document body.
    fn attach(&self, widget: WidgetKind);

    /// A deep, detached copy of the document body.
    fn snapshot_body(&self) -> Result<Element>;
}

/// The document loaded inside the floating panel.
///
/// Loading is asynchronous and independent of the panel's visibility; the
/// channel may not be accessible yet when a message is sent.
pub trait EmbeddedDocument: Send + Sync {
    /// Begin loading `link`. Called once, at panel construction.
    fn load(&self, link: &str);

    /// Whether the document's message channel can currently be reached.
    fn is_accessible(&self) -> bool;

    /// Post `message` restricted to `target_origin`. Fire-and-forget: `Ok`
    /// means the message was handed over, not that anyone received it.
    fn post_message(&self, message: &Message, target_origin: &str) -> Result<()>;
}
