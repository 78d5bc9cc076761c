//! CLI argument definitions and the interactive command set.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;

/// Floaty: host harness for the floating button + embedded panel widget.
#[derive(Parser, Debug)]
#[command(name = "floaty", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// HTML file to use as the host page (overrides `host.page_path`).
    #[arg(short = 'p', long = "page")]
    pub page: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > FLOATY_CONFIG env var > ./floaty.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("FLOATY_CONFIG") {
            return PathBuf::from(p);
        }
        PathBuf::from("floaty.toml")
    }

    /// Resolve the host page path.
    ///
    /// Priority: --page flag > config file value.
    pub fn resolve_page_path(&self, config_page: Option<&str>) -> Option<PathBuf> {
        self.page
            .clone()
            .or_else(|| config_page.map(PathBuf::from))
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        self.log_level
            .clone()
            .unwrap_or_else(|| config_level.to_string())
    }
}

/// A line typed at the harness prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Click,
    ShowTooltip,
    HideTooltip,
    ToggleTooltip,
    State,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "click" | "c" => Ok(Command::Click),
            "show-tooltip" => Ok(Command::ShowTooltip),
            "hide-tooltip" => Ok(Command::HideTooltip),
            "toggle-tooltip" => Ok(Command::ToggleTooltip),
            "state" | "s" => Ok(Command::State),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(format!("Unknown command '{}'. Type 'help'.", other)),
        }
    }
}

pub const HELP: &str =
    "Commands: click, show-tooltip, hide-tooltip, toggle-tooltip, state, help, quit";
