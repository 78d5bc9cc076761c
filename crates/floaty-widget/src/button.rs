//! The floating toggle button and its tooltip state machine.
//!
//! The tooltip has two states, Hidden and Visible, with free transitions
//! between them:
//! - `show_tooltip` -> Visible
//! - `hide_tooltip` -> Hidden
//! - `toggle_tooltip` -> the other state
//! - `click` -> Hidden, then the click is announced to subscribers
//!
//! The tooltip is purely presentational and never gates the click. The button
//! knows nothing about the panel; the coordinator subscribes to its clicks.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use floaty_core::config::ButtonSettings;
use floaty_core::events::{EventBus, SubscriptionId, WidgetEvent};
use floaty_core::types::ThemeColor;

use crate::host::Renderer;

/// Tooltip visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TooltipState {
    Hidden,
    Visible,
}

impl fmt::Display for TooltipState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TooltipState::Hidden => write!(f, "TooltipHidden"),
            TooltipState::Visible => write!(f, "TooltipVisible"),
        }
    }
}

impl From<bool> for TooltipState {
    fn from(visible: bool) -> Self {
        if visible {
            TooltipState::Visible
        } else {
            TooltipState::Hidden
        }
    }
}

/// Everything the renderer needs to draw the button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonState {
    pub theme_color: ThemeColor,
    pub label: String,
    pub tooltip_text: String,
    pub tooltip_visible: bool,
}

/// Events announced by the button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    Clicked,
}

/// Handle to the toggle button. Clones share the same button.
#[derive(Clone)]
pub struct ToggleButton {
    state: Arc<Mutex<ButtonState>>,
    clicks: EventBus<ButtonEvent>,
    events: EventBus<WidgetEvent>,
    renderer: Arc<dyn Renderer>,
}

impl fmt::Debug for ToggleButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToggleButton")
            .field("state", &*self.lock())
            .field("click_subscribers", &self.clicks.subscriber_count())
            .finish()
    }
}

impl ToggleButton {
    /// Create a button with the tooltip hidden.
    pub fn new(settings: ButtonSettings, renderer: Arc<dyn Renderer>) -> Self {
        Self::with_events(settings, renderer, EventBus::new())
    }

    /// Create a button that also reports its state changes on `events`.
    pub fn with_events(
        settings: ButtonSettings,
        renderer: Arc<dyn Renderer>,
        events: EventBus<WidgetEvent>,
    ) -> Self {
        let state = ButtonState {
            theme_color: settings.theme_color,
            label: settings.label,
            tooltip_text: settings.tooltip_text,
            tooltip_visible: false,
        };
        renderer.set_main_color(&state.theme_color);
        renderer.render_button(&state);

        Self {
            state: Arc::new(Mutex::new(state)),
            clicks: EventBus::new(),
            events,
            renderer,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ButtonState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> ButtonState {
        self.lock().clone()
    }

    pub fn tooltip_visible(&self) -> bool {
        self.lock().tooltip_visible
    }

    pub fn tooltip_state(&self) -> TooltipState {
        self.tooltip_visible().into()
    }

    pub fn theme_color(&self) -> ThemeColor {
        self.lock().theme_color.clone()
    }

    /// Show the tooltip. Returns the new visibility (`true`).
    pub fn show_tooltip(&self) -> bool {
        self.set_tooltip(|_| true)
    }

    /// Hide the tooltip. Returns the new visibility (`false`).
    pub fn hide_tooltip(&self) -> bool {
        self.set_tooltip(|_| false)
    }

    /// Flip the tooltip. Returns the new visibility.
    pub fn toggle_tooltip(&self) -> bool {
        self.set_tooltip(|visible| !visible)
    }

    fn set_tooltip(&self, next: impl FnOnce(bool) -> bool) -> bool {
        let (snapshot, changed) = {
            let mut state = self.lock();
            let previous = state.tooltip_visible;
            state.tooltip_visible = next(previous);
            if previous != state.tooltip_visible {
                tracing::debug!(
                    "Tooltip state: {} -> {}",
                    TooltipState::from(previous),
                    TooltipState::from(state.tooltip_visible)
                );
            }
            (state.clone(), previous != state.tooltip_visible)
        };

        self.renderer.render_button(&snapshot);
        if changed {
            self.events.emit(&WidgetEvent::TooltipChanged {
                visible: snapshot.tooltip_visible,
            });
        }
        snapshot.tooltip_visible
    }

    /// Change the theme color and have the renderer recompute the derived
    /// main color.
    pub fn set_theme_color(&self, color: ThemeColor) {
        let snapshot = {
            let mut state = self.lock();
            state.theme_color = color;
            state.clone()
        };
        tracing::debug!(theme_color = %snapshot.theme_color, "Button theme changed");
        self.renderer.set_main_color(&snapshot.theme_color);
        self.renderer.render_button(&snapshot);
    }

    /// Register a click handler.
    pub fn on_click<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&ButtonEvent) + Send + Sync + 'static,
    {
        self.clicks.subscribe(handler)
    }

    pub fn remove_click_handler(&self, id: SubscriptionId) -> bool {
        self.clicks.unsubscribe(id)
    }

    /// Handle a user click: hide the tooltip, then notify click subscribers.
    pub fn click(&self) {
        tracing::debug!("Button clicked");
        self.hide_tooltip();
        self.events.emit(&WidgetEvent::ButtonClicked);
        self.clicks.emit(&ButtonEvent::Clicked);
    }
}
