//! The floating panel hosting the embedded document.
//!
//! Visibility is presentational: showing or hiding the panel never reloads
//! the embedded document, which starts loading once at construction.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use url::Url;

use floaty_core::config::PanelSettings;
use floaty_core::error::{FloatyError, Result};
use floaty_core::events::{EventBus, WidgetEvent};
use floaty_core::types::{Dimension, Message};

use crate::host::{EmbeddedDocument, Renderer};

/// Target origin meaning "derive it from the target link".
pub const ANY_ORIGIN: &str = "*";

/// Panel visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelVisibility {
    Hidden,
    Visible,
}

impl fmt::Display for PanelVisibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelVisibility::Hidden => write!(f, "Hidden"),
            PanelVisibility::Visible => write!(f, "Visible"),
        }
    }
}

impl From<bool> for PanelVisibility {
    fn from(visible: bool) -> Self {
        if visible {
            PanelVisibility::Visible
        } else {
            PanelVisibility::Hidden
        }
    }
}

/// Everything the renderer needs to draw the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelState {
    pub width: Dimension,
    pub height: Dimension,
    /// Fixed at construction.
    pub target_link: String,
    pub visible: bool,
}

/// Handle to the floating panel. Clones share the same panel.
#[derive(Clone)]
pub struct FloatingPanel {
    state: Arc<Mutex<PanelState>>,
    host_origin: String,
    document: Arc<dyn EmbeddedDocument>,
    renderer: Arc<dyn Renderer>,
    events: EventBus<WidgetEvent>,
}

impl fmt::Debug for FloatingPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FloatingPanel")
            .field("state", &*self.lock())
            .field("host_origin", &self.host_origin)
            .finish()
    }
}

impl FloatingPanel {
    /// Create a hidden panel and start loading its target link.
    ///
    /// `host_origin` is the embedding page's origin; relative target links
    /// resolve against it.
    pub fn new(
        settings: PanelSettings,
        host_origin: impl Into<String>,
        document: Arc<dyn EmbeddedDocument>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        Self::with_events(settings, host_origin, document, renderer, EventBus::new())
    }

    /// Create a panel that also reports visibility and delivery on `events`.
    pub fn with_events(
        settings: PanelSettings,
        host_origin: impl Into<String>,
        document: Arc<dyn EmbeddedDocument>,
        renderer: Arc<dyn Renderer>,
        events: EventBus<WidgetEvent>,
    ) -> Self {
        let state = PanelState {
            width: settings.width,
            height: settings.height,
            target_link: settings.target_link,
            visible: false,
        };
        tracing::info!(
            width = %state.width,
            height = %state.height,
            target_link = %state.target_link,
            "Loading embedded document"
        );
        document.load(&state.target_link);
        renderer.render_panel(&state);

        Self {
            state: Arc::new(Mutex::new(state)),
            host_origin: host_origin.into(),
            document,
            renderer,
            events,
        }
    }

    fn lock(&self) -> MutexGuard<'_, PanelState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> PanelState {
        self.lock().clone()
    }

    pub fn is_visible(&self) -> bool {
        self.lock().visible
    }

    pub fn visibility(&self) -> PanelVisibility {
        self.is_visible().into()
    }

    pub fn target_link(&self) -> String {
        self.lock().target_link.clone()
    }

    pub fn set_visible(&self, visible: bool) {
        self.update_visibility(|_| visible);
    }

    /// Flip visibility. Returns the new value.
    pub fn toggle_visible(&self) -> bool {
        self.update_visibility(|visible| !visible)
    }

    fn update_visibility(&self, next: impl FnOnce(bool) -> bool) -> bool {
        let (snapshot, changed) = {
            let mut state = self.lock();
            let previous = state.visible;
            state.visible = next(previous);
            (state.clone(), previous != state.visible)
        };

        if changed {
            tracing::debug!(
                "Panel state: {} -> {}",
                PanelVisibility::from(!snapshot.visible),
                PanelVisibility::from(snapshot.visible)
            );
        }
        self.renderer.render_panel(&snapshot);
        if changed {
            self.events.emit(&WidgetEvent::PanelVisibilityChanged {
                visible: snapshot.visible,
            });
        }
        snapshot.visible
    }

    /// Send `message` to the embedded document, restricted to the origin of
    /// the target link.
    pub fn send_message(&self, message: &Message) {
        self.send_message_to(message, ANY_ORIGIN);
    }

    /// Send `message` to the embedded document.
    ///
    /// A `target_origin` of `"*"` is replaced by the target link's own origin;
    /// anything else is used verbatim. Never fails: an inaccessible document,
    /// a malformed target link or a rejected post is logged and the message
    /// dropped.
    pub fn send_message_to(&self, message: &Message, target_origin: &str) {
        match self.try_send(message, target_origin) {
            Ok(origin) => {
                tracing::info!(
                    origin = %origin,
                    kind = message.kind(),
                    "Message sent to embedded document"
                );
                if let Message::PageText { text } = message {
                    self.events.emit(&WidgetEvent::PageTextSent {
                        origin,
                        text_length: text.len(),
                    });
                }
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    kind = message.kind(),
                    "Dropping message for embedded document"
                );
                self.events.emit(&WidgetEvent::MessageDropped {
                    reason: e.to_string(),
                });
            }
        }
    }

    fn try_send(&self, message: &Message, target_origin: &str) -> Result<String> {
        if !self.document.is_accessible() {
            return Err(FloatyError::ChannelUnavailable(
                "embedded document is not accessible".to_string(),
            ));
        }
        let origin = self.effective_target_origin(target_origin)?;
        self.document.post_message(message, &origin)?;
        Ok(origin)
    }

    /// The origin a message sent with `target_origin` would be restricted to.
    pub fn effective_target_origin(&self, target_origin: &str) -> Result<String> {
        if target_origin == ANY_ORIGIN {
            resolve_target_origin(&self.host_origin, &self.target_link())
        } else {
            Ok(target_origin.to_string())
        }
    }
}

/// Resolve `target_link` against `host_origin` and return the result's
/// origin (`scheme://host[:port]`, default ports omitted).
///
/// Links without a tuple origin (`data:`, `about:blank`, ...) are rejected:
/// there is no origin to restrict delivery to.
pub fn resolve_target_origin(host_origin: &str, target_link: &str) -> Result<String> {
    let base = Url::parse(host_origin)?;
    let url = base.join(target_link)?;
    let origin = url.origin();
    if !origin.is_tuple() {
        return Err(FloatyError::InvalidTarget(format!(
            "{target_link} has no addressable origin"
        )));
    }
    Ok(origin.ascii_serialization())
}
