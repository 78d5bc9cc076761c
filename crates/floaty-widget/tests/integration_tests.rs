//! End-to-end tests for the Floaty widget.
//!
//! Each test starts the coordinator against recording mocks of the host page,
//! renderer and embedded document, then drives it through button clicks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use floaty_core::config::{EmbeddingContext, ScriptTag};
use floaty_core::error::{FloatyError, Result};
use floaty_core::events::WidgetEvent;
use floaty_core::types::{Message, ThemeColor, WidgetKind};
use floaty_core::ConfigResolver;
use floaty_widget::{
    extract_visible_text, parse_body, AppContext, ButtonState, Collaborators, Coordinator,
    Element, EmbeddedDocument, HostPage, ManualScheduler, PanelState, Renderer, TokioScheduler,
    TOOLTIP_HIDE_DELAY,
};

// =============================================================================
// Helpers
// =============================================================================

struct MockPage {
    html: Mutex<String>,
    broken: AtomicBool,
    attached: Mutex<Vec<WidgetKind>>,
}

impl MockPage {
    fn new(html: &str) -> Self {
        Self {
            html: Mutex::new(html.to_string()),
            broken: AtomicBool::new(false),
            attached: Mutex::new(Vec::new()),
        }
    }

    fn set_html(&self, html: &str) {
        *self.html.lock().unwrap() = html.to_string();
    }
}

impl HostPage for MockPage {
    fn origin(&self) -> String {
        "http://localhost:8080".to_string()
    }

    fn attach(&self, widget: WidgetKind) {
        self.attached.lock().unwrap().push(widget);
    }

    fn snapshot_body(&self) -> Result<Element> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(FloatyError::Extraction("clone failed".into()));
        }
        Ok(parse_body(&self.html.lock().unwrap()))
    }
}

#[derive(Default)]
struct RecordingRenderer {
    buttons: Mutex<Vec<ButtonState>>,
    panels: Mutex<Vec<PanelState>>,
    colors: Mutex<Vec<ThemeColor>>,
}

impl Renderer for RecordingRenderer {
    fn render_button(&self, state: &ButtonState) {
        self.buttons.lock().unwrap().push(state.clone());
    }

    fn render_panel(&self, state: &PanelState) {
        self.panels.lock().unwrap().push(state.clone());
    }

    fn set_main_color(&self, color: &ThemeColor) {
        self.colors.lock().unwrap().push(color.clone());
    }
}

#[derive(Default)]
struct MockFrame {
    ready: AtomicBool,
    loads: Mutex<Vec<String>>,
    posted: Mutex<Vec<(Message, String)>>,
}

impl EmbeddedDocument for MockFrame {
    fn load(&self, link: &str) {
        self.loads.lock().unwrap().push(link.to_string());
    }

    fn is_accessible(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    fn post_message(&self, message: &Message, target_origin: &str) -> Result<()> {
        self.posted
            .lock()
            .unwrap()
            .push((message.clone(), target_origin.to_string()));
        Ok(())
    }
}

struct Harness {
    ctx: AppContext,
    page: Arc<MockPage>,
    renderer: Arc<RecordingRenderer>,
    frame: Arc<MockFrame>,
    scheduler: ManualScheduler,
    events: Arc<Mutex<Vec<WidgetEvent>>>,
}

const PAGE: &str = "<html><head><title>Shop</title></head><body>\
    <p>Hello</p><script>evil()</script><p>World</p></body></html>";

fn resolver(scripts: Vec<ScriptTag>) -> ConfigResolver {
    ConfigResolver::new(EmbeddingContext {
        base_uri: "http://localhost:8080/products/".to_string(),
        module_url: "http://localhost:8080/static/floaty.js".to_string(),
        scripts,
    })
}

fn start_with(scripts: Vec<ScriptTag>) -> Harness {
    let page = Arc::new(MockPage::new(PAGE));
    let renderer = Arc::new(RecordingRenderer::default());
    let frame = Arc::new(MockFrame::default());
    frame.ready.store(true, Ordering::SeqCst);
    let scheduler = ManualScheduler::new();

    let ctx = Coordinator::start(
        &resolver(scripts),
        Collaborators {
            host: page.clone(),
            renderer: renderer.clone(),
            document: frame.clone(),
            scheduler: Arc::new(scheduler.clone()),
        },
    );

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    ctx.events
        .subscribe(move |e: &WidgetEvent| sink.lock().unwrap().push(e.clone()));

    Harness {
        ctx,
        page,
        renderer,
        frame,
        scheduler,
        events,
    }
}

fn start() -> Harness {
    start_with(Vec::new())
}

fn posted(h: &Harness) -> Vec<(Message, String)> {
    h.frame.posted.lock().unwrap().clone()
}

// =============================================================================
// Startup
// =============================================================================

#[test]
fn test_startup_uses_defaults_without_script_tag() {
    let h = start();

    assert_eq!(*h.frame.loads.lock().unwrap(), vec!["/"]);
    let panel = h.ctx.panel.state();
    assert_eq!(panel.width.as_str(), "400px");
    assert_eq!(panel.height.as_str(), "300px");
    assert!(!panel.visible);

    let button = h.ctx.button.state();
    assert_eq!(button.theme_color, ThemeColor::new("#000000"));
    assert_eq!(button.label, "💬");
    assert_eq!(button.tooltip_text, "点击这里打开悬浮窗口");
    assert_eq!(
        *h.page.attached.lock().unwrap(),
        vec![WidgetKind::Panel, WidgetKind::Button]
    );
}

#[test]
fn test_startup_reads_controlling_script_tag() {
    let h = start_with(vec![
        ScriptTag::module("/static/other.js").with_data("theme-color", "red"),
        ScriptTag::module("../static/floaty.js")
            .with_data("theme-color", "#2255ff")
            .with_data("target-link", "https://assistant.example:9443/embed?site=shop")
            .with_data("window-width", ""),
    ]);

    assert_eq!(h.ctx.button.theme_color(), ThemeColor::new("#2255ff"));
    assert_eq!(h.ctx.panel.state().width.as_str(), "400px");
    assert_eq!(
        *h.renderer.colors.lock().unwrap(),
        vec![ThemeColor::new("#2255ff")]
    );

    h.ctx.button.click();
    assert_eq!(posted(&h)[0].1, "https://assistant.example:9443");
}

#[test]
fn test_tooltip_timeline_on_virtual_clock() {
    let h = start();
    assert!(h.ctx.button.tooltip_visible());

    h.scheduler.advance(Duration::from_millis(1000));
    assert!(h.ctx.button.tooltip_visible());
    h.scheduler.advance(Duration::from_millis(999));
    assert!(h.ctx.button.tooltip_visible());
    h.scheduler.advance(Duration::from_millis(1));
    assert!(!h.ctx.button.tooltip_visible());

    // Only the tooltip changed while the clock ran.
    assert_eq!(
        *h.events.lock().unwrap(),
        vec![WidgetEvent::TooltipChanged { visible: false }]
    );
    assert!(!h.ctx.panel.is_visible());
    assert!(posted(&h).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_tooltip_timeline_on_tokio_runtime() {
    let page = Arc::new(MockPage::new(PAGE));
    let ctx = Coordinator::start(
        &resolver(Vec::new()),
        Collaborators {
            host: page,
            renderer: Arc::new(RecordingRenderer::default()),
            document: Arc::new(MockFrame::default()),
            scheduler: Arc::new(TokioScheduler::current().unwrap()),
        },
    );

    assert!(ctx.button.tooltip_visible());
    tokio::time::sleep(TOOLTIP_HIDE_DELAY - Duration::from_millis(1)).await;
    assert!(ctx.button.tooltip_visible());
    tokio::time::sleep(Duration::from_millis(2)).await;
    assert!(!ctx.button.tooltip_visible());
    assert!(ctx.tooltip_timer.is_completed());
}

// =============================================================================
// Clicks
// =============================================================================

#[test]
fn test_click_sends_exactly_one_page_text() {
    let h = start();
    let expected = extract_visible_text(&h.page.snapshot_body().unwrap());
    assert_eq!(expected, "Hello World");

    h.ctx.button.click();

    assert!(h.ctx.panel.is_visible());
    assert!(!h.ctx.button.tooltip_visible());
    let posted = posted(&h);
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].0, Message::page_text(expected));
    assert_eq!(posted[0].1, "http://localhost:8080");
}

#[test]
fn test_click_twice_hides_without_second_message() {
    let h = start();
    h.ctx.button.click();
    h.ctx.button.click();

    assert!(!h.ctx.panel.is_visible());
    assert_eq!(posted(&h).len(), 1);
    assert_eq!(h.frame.loads.lock().unwrap().len(), 1);
}

#[test]
fn test_text_is_extracted_at_click_time() {
    let h = start();
    h.ctx.button.click();
    h.ctx.button.click();

    h.page.set_html("<body><div>Updated\n\n   content</div></body>");
    h.ctx.button.click();

    let posted = posted(&h);
    assert_eq!(posted.len(), 2);
    assert_eq!(posted[1].0, Message::page_text("Updated content"));
}

#[test]
fn test_click_before_document_ready_drops_message() {
    let h = start();
    h.frame.ready.store(false, Ordering::SeqCst);

    h.ctx.button.click();
    assert!(h.ctx.panel.is_visible());
    assert!(posted(&h).is_empty());

    let events = h.events.lock().unwrap();
    assert!(events
        .iter()
        .any(|e| matches!(e, WidgetEvent::MessageDropped { .. })));
}

#[test]
fn test_snapshot_failure_sends_empty_text() {
    let h = start();
    h.page.broken.store(true, Ordering::SeqCst);

    h.ctx.button.click();
    let posted = posted(&h);
    assert_eq!(posted.len(), 1);
    assert_eq!(posted[0].0, Message::page_text(""));
}

#[test]
fn test_click_event_sequence() {
    let h = start();
    h.ctx.button.click();
    h.ctx.button.click();

    assert_eq!(
        *h.events.lock().unwrap(),
        vec![
            WidgetEvent::TooltipChanged { visible: false },
            WidgetEvent::ButtonClicked,
            WidgetEvent::PanelVisibilityChanged { visible: true },
            WidgetEvent::PageTextSent {
                origin: "http://localhost:8080".to_string(),
                text_length: "Hello World".len(),
            },
            WidgetEvent::ButtonClicked,
            WidgetEvent::PanelVisibilityChanged { visible: false },
        ]
    );
}

#[test]
fn test_renderer_sees_every_panel_transition() {
    let h = start();
    h.ctx.button.click();
    h.ctx.button.click();

    let visible: Vec<bool> = h
        .renderer
        .panels
        .lock()
        .unwrap()
        .iter()
        .map(|p| p.visible)
        .collect();
    assert_eq!(visible, vec![false, true, false]);
}

// =============================================================================
// Scripting access through the context
// =============================================================================

#[test]
fn test_context_controllers_are_live_handles() {
    let h = start();
    let scripted = h.ctx.clone();

    scripted.panel.set_visible(true);
    assert!(h.ctx.panel.is_visible());

    // Showing the panel directly is not a click: nothing is sent.
    assert!(posted(&h).is_empty());

    // The next click therefore hides it.
    h.ctx.button.click();
    assert!(!h.ctx.panel.is_visible());
    assert!(posted(&h).is_empty());

    scripted.button.set_theme_color(ThemeColor::new("teal"));
    assert_eq!(
        h.renderer.colors.lock().unwrap().last(),
        Some(&ThemeColor::new("teal"))
    );
}
