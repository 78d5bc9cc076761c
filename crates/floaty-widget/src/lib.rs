//! Floaty widget crate - floating toggle button, embedded-document panel, and
//! the coordinator that wires them together.
//!
//! The button toggles the panel. Each time the panel opens, the host page's
//! visible text is extracted and posted into the embedded document as a
//! `PageText` message. Rendering, the host page and the embedded document are
//! external collaborators reached through the traits in [`host`].

pub mod button;
pub mod coordinator;
pub mod dom;
pub mod extract;
pub mod host;
pub mod panel;
pub mod scheduler;

pub use button::{ButtonEvent, ButtonState, ToggleButton, TooltipState};
pub use coordinator::{AppContext, Collaborators, Coordinator, TOOLTIP_HIDE_DELAY};
pub use dom::{parse_body, Element, Node};
pub use extract::{extract_page_text, extract_visible_text};
pub use host::{EmbeddedDocument, HostPage, Renderer};
pub use panel::{resolve_target_origin, FloatingPanel, PanelState, PanelVisibility, ANY_ORIGIN};
pub use scheduler::{ManualScheduler, Scheduler, Task, TaskHandle, TokioScheduler};
