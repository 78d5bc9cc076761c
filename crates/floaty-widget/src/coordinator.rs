//! Startup sequence and click wiring.
//!
//! Once the host document is ready, [`Coordinator::start`]:
//! 1. Resolves the panel options, builds the panel and attaches it.
//! 2. Resolves the button options, builds the button and attaches it.
//! 3. Shows the tooltip and schedules it to hide after two seconds.
//! 4. Subscribes to button clicks: each click toggles the panel and, when the
//!    panel becomes visible, sends the page text into it.
//! 5. Returns an [`AppContext`] holding both controllers for the embedder.

use std::sync::Arc;
use std::time::Duration;

use floaty_core::config::{ButtonSettings, ConfigResolver, PanelSettings};
use floaty_core::events::{EventBus, SubscriptionId, WidgetEvent};
use floaty_core::types::{Message, WidgetKind};

use crate::button::ToggleButton;
use crate::extract::extract_page_text;
use crate::host::{EmbeddedDocument, HostPage, Renderer};
use crate::panel::FloatingPanel;
use crate::scheduler::{Scheduler, TaskHandle};

/// How long the startup tooltip stays up.
pub const TOOLTIP_HIDE_DELAY: Duration = Duration::from_millis(2000);

/// The external collaborators the widget is composed with.
#[derive(Clone)]
pub struct Collaborators {
    pub host: Arc<dyn HostPage>,
    pub renderer: Arc<dyn Renderer>,
    pub document: Arc<dyn EmbeddedDocument>,
    pub scheduler: Arc<dyn Scheduler>,
}

/// Handles to the running widget, given to whoever needs scripting access.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub button: ToggleButton,
    pub panel: FloatingPanel,
    /// Every state change and delivery outcome of the widget.
    pub events: EventBus<WidgetEvent>,
    /// The startup tooltip-hide task. Never cancelled by the widget itself.
    pub tooltip_timer: TaskHandle,
    pub click_subscription: SubscriptionId,
}

/// Composes the button and panel on a ready host document.
pub struct Coordinator;

impl Coordinator {
    /// Run the startup sequence. Call once, when the host document is ready.
    pub fn start(resolver: &ConfigResolver, collaborators: Collaborators) -> AppContext {
        Self::start_with_events(resolver, collaborators, EventBus::new())
    }

    /// Like [`Coordinator::start`], publishing on `events`. Handlers already
    /// subscribed see the startup events too.
    pub fn start_with_events(
        resolver: &ConfigResolver,
        collaborators: Collaborators,
        events: EventBus<WidgetEvent>,
    ) -> AppContext {
        let Collaborators {
            host,
            renderer,
            document,
            scheduler,
        } = collaborators;

        let panel = FloatingPanel::with_events(
            PanelSettings::resolve(resolver),
            host.origin(),
            document,
            Arc::clone(&renderer),
            events.clone(),
        );
        host.attach(WidgetKind::Panel);

        let button =
            ToggleButton::with_events(ButtonSettings::resolve(resolver), renderer, events.clone());
        host.attach(WidgetKind::Button);

        button.show_tooltip();
        let tooltip_button = button.clone();
        let tooltip_timer = scheduler.schedule_once(
            TOOLTIP_HIDE_DELAY,
            Box::new(move || {
                tooltip_button.hide_tooltip();
            }),
        );

        let click_panel = panel.clone();
        let click_host = Arc::clone(&host);
        let click_subscription = button.on_click(move |_| {
            handle_click(&click_panel, click_host.as_ref());
        });

        tracing::info!(
            target_link = %panel.target_link(),
            theme_color = %button.theme_color(),
            "Floaty widget started"
        );

        AppContext {
            button,
            panel,
            events,
            tooltip_timer,
            click_subscription,
        }
    }
}

/// Toggle the panel; when it opens, send it the page text.
fn handle_click(panel: &FloatingPanel, host: &dyn HostPage) {
    if panel.toggle_visible() {
        let text = extract_page_text(host);
        panel.send_message(&Message::page_text(text));
    }
}
