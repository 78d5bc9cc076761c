//! Floaty harness binary - composition root.
//!
//! Ties the widget to a simulated host page:
//! 1. Load configuration from TOML
//! 2. Initialize tracing
//! 3. Build the host page, renderer and embedded-document stand-ins
//! 4. Run the coordinator's startup sequence on the tokio runtime
//! 5. Drive the widget from stdin commands until `quit` or EOF

mod adapters;
mod cli;

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use floaty_core::config::FloatyConfig;
use floaty_core::events::{EventBus, WidgetEvent};
use floaty_core::ConfigResolver;
use floaty_widget::{AppContext, Collaborators, Coordinator, TokioScheduler};

use adapters::{FileHostPage, LoggingFrame, TracingRenderer};
use cli::{CliArgs, Command, HELP};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config is read before tracing starts so the file can set the level;
    // a load failure is reported once the subscriber is up.
    let config_path = args.resolve_config_path();
    let (config, config_error) = match FloatyConfig::load(&config_path) {
        Ok(config) => (config, None),
        Err(e) => (FloatyConfig::default(), Some(e)),
    };

    // Tracing.
    let log_level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .init();

    tracing::info!("Starting Floaty v{}", env!("CARGO_PKG_VERSION"));
    match config_error {
        None => tracing::info!(path = %config_path.display(), "Configuration loaded"),
        Some(e) => tracing::warn!(
            path = %config_path.display(),
            error = %e,
            "Failed to load config, using defaults"
        ),
    }

    // Host page and collaborators.
    let page_path = args.resolve_page_path(config.host.page_path.as_deref());
    let host = Arc::new(FileHostPage::load(&config.host.page_url, page_path.as_deref())?);
    let frame = Arc::new(LoggingFrame::default());
    let scheduler = TokioScheduler::current()?;

    let events = EventBus::new();
    events.subscribe(|event: &WidgetEvent| {
        tracing::info!(event = ?event, "Widget event");
    });

    // Document ready: start the widget.
    let resolver = ConfigResolver::new(config.host.embedding_context());
    let ctx = Coordinator::start_with_events(
        &resolver,
        Collaborators {
            host: host.clone(),
            renderer: Arc::new(TracingRenderer),
            document: frame.clone(),
            scheduler: Arc::new(scheduler),
        },
        events,
    );
    tracing::info!(attached = ?host.attached(), "{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(command) => run_command(&ctx, command, &frame),
            Err(e) => tracing::warn!("{}", e),
        }
    }

    tracing::info!(messages_delivered = frame.received(), "Floaty shut down");
    Ok(())
}

fn run_command(ctx: &AppContext, command: Command, frame: &LoggingFrame) {
    match command {
        Command::Click => ctx.button.click(),
        Command::ShowTooltip => {
            ctx.button.show_tooltip();
        }
        Command::HideTooltip => {
            ctx.button.hide_tooltip();
        }
        Command::ToggleTooltip => {
            ctx.button.toggle_tooltip();
        }
        Command::State => {
            let button = ctx.button.state();
            let panel = ctx.panel.state();
            tracing::info!(
                tooltip = %ctx.button.tooltip_state(),
                theme_color = %button.theme_color,
                panel = %ctx.panel.visibility(),
                width = %panel.width,
                height = %panel.height,
                target_link = %panel.target_link,
                messages_delivered = frame.received(),
                "Widget state"
            );
        }
        Command::Help => tracing::info!("{}", HELP),
        Command::Quit => {}
    }
}
