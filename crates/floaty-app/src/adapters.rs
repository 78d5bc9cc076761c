//! Host-side implementations of the widget's collaborators for the harness.
//!
//! The harness has no browser: the host page is an HTML file, rendering is a
//! log line, and the embedded document is a stand-in that logs every message
//! it receives as the JSON it would see on the wire.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use url::Url;

use floaty_core::error::{FloatyError, Result};
use floaty_core::types::{Message, ThemeColor, WidgetKind};
use floaty_widget::{
    parse_body, ButtonState, Element, EmbeddedDocument, HostPage, PanelState, Renderer,
};

/// Host page backed by an HTML file read at startup.
pub struct FileHostPage {
    origin: String,
    html: String,
    attached: Mutex<Vec<WidgetKind>>,
}

impl FileHostPage {
    /// Build the host page for `page_url`, reading its markup from `path`.
    ///
    /// A missing or unreadable file leaves the body empty.
    pub fn load(page_url: &str, path: Option<&Path>) -> Result<Self> {
        let origin = Url::parse(page_url)?.origin();
        if !origin.is_tuple() {
            return Err(FloatyError::Config(format!(
                "Host page URL {} has no origin",
                page_url
            )));
        }

        let html = match path {
            Some(path) => match std::fs::read_to_string(path) {
                Ok(html) => {
                    tracing::info!(path = %path.display(), bytes = html.len(), "Host page loaded");
                    html
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Host page unreadable, using empty body"
                    );
                    String::new()
                }
            },
            None => String::new(),
        };

        Ok(Self {
            origin: origin.ascii_serialization(),
            html,
            attached: Mutex::new(Vec::new()),
        })
    }

    pub fn attached(&self) -> Vec<WidgetKind> {
        self.attached.lock().map(|a| a.clone()).unwrap_or_default()
    }
}

impl HostPage for FileHostPage {
    fn origin(&self) -> String {
        self.origin.clone()
    }

    fn attach(&self, widget: WidgetKind) {
        tracing::info!(widget = %widget, "Appended to document body");
        if let Ok(mut attached) = self.attached.lock() {
            attached.push(widget);
        }
    }

    fn snapshot_body(&self) -> Result<Element> {
        Ok(parse_body(&self.html))
    }
}

/// Renderer that logs each state it is asked to present.
#[derive(Debug, Default)]
pub struct TracingRenderer;

impl Renderer for TracingRenderer {
    fn render_button(&self, state: &ButtonState) {
        tracing::debug!(
            label = %state.label,
            tooltip_visible = state.tooltip_visible,
            tooltip = %state.tooltip_text,
            "Render button"
        );
    }

    fn render_panel(&self, state: &PanelState) {
        tracing::debug!(
            width = %state.width,
            height = %state.height,
            visible = state.visible,
            "Render panel"
        );
    }

    fn set_main_color(&self, color: &ThemeColor) {
        let (name, value) = color.main_color_variable();
        tracing::debug!("Set {}: {}", name, value);
    }
}

/// Stand-in for the panel's embedded document.
///
/// Becomes accessible as soon as it is asked to load.
#[derive(Debug, Default)]
pub struct LoggingFrame {
    loaded: AtomicBool,
    received: AtomicUsize,
}

impl LoggingFrame {
    pub fn received(&self) -> usize {
        self.received.load(Ordering::SeqCst)
    }
}

impl EmbeddedDocument for LoggingFrame {
    fn load(&self, link: &str) {
        tracing::info!(link, "Embedded document loading");
        self.loaded.store(true, Ordering::SeqCst);
    }

    fn is_accessible(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    fn post_message(&self, message: &Message, target_origin: &str) -> Result<()> {
        let payload = serde_json::to_string(message)?;
        self.received.fetch_add(1, Ordering::SeqCst);
        tracing::info!(target_origin, payload = %payload, "postMessage");
        Ok(())
    }
}
