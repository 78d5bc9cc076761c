use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::error::Result;
use crate::types::{Dimension, ThemeColor};

// =============================================================================
// Widget options
// =============================================================================

/// A named widget option and the value it falls back to when the embedding
/// context does not supply one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigOption {
    pub key: &'static str,
    pub default_value: &'static str,
}

pub const WINDOW_WIDTH: ConfigOption = ConfigOption {
    key: "window-width",
    default_value: "400px",
};

pub const WINDOW_HEIGHT: ConfigOption = ConfigOption {
    key: "window-height",
    default_value: "300px",
};

pub const TARGET_LINK: ConfigOption = ConfigOption {
    key: "target-link",
    default_value: "/",
};

pub const THEME_COLOR: ConfigOption = ConfigOption {
    key: "theme-color",
    default_value: "#000000",
};

pub const BUTTON_TEXT: ConfigOption = ConfigOption {
    key: "button-text",
    default_value: "💬",
};

pub const TOOLTIP_TEXT: ConfigOption = ConfigOption {
    key: "tooltip-text",
    default_value: DEFAULT_TOOLTIP_TEXT,
};

/// Default tooltip shown next to the button ("click here to open the floating window").
pub const DEFAULT_TOOLTIP_TEXT: &str = "点击这里打开悬浮窗口";

/// Every option the widget reads at startup, in resolution order.
pub const ALL_OPTIONS: [ConfigOption; 6] = [
    WINDOW_WIDTH,
    WINDOW_HEIGHT,
    TARGET_LINK,
    THEME_COLOR,
    BUTTON_TEXT,
    TOOLTIP_TEXT,
];

// =============================================================================
// Embedding context
// =============================================================================

/// A `<script>` inclusion tag on the host page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptTag {
    /// The `src` attribute, possibly relative to the page's base URI.
    pub src: String,
    /// The `type` attribute. Only `module` scripts are candidates.
    #[serde(rename = "type", default = "default_script_type")]
    pub script_type: String,
    /// Remaining attributes, keyed by full attribute name (`data-theme-color`).
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

fn default_script_type() -> String {
    "module".to_string()
}

impl ScriptTag {
    pub fn module(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            script_type: default_script_type(),
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style helper that sets the `data-<key>` attribute.
    pub fn with_data(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(format!("data-{key}"), value.into());
        self
    }

    /// The value of the `data-<key>` attribute, if present.
    pub fn data(&self, key: &str) -> Option<&str> {
        self.attributes.get(&format!("data-{key}")).map(String::as_str)
    }
}

/// Where the widget's options come from: the page's base URI, the URL the
/// widget script was loaded from, and the script tags present on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddingContext {
    pub base_uri: String,
    pub module_url: String,
    pub scripts: Vec<ScriptTag>,
}

// =============================================================================
// ConfigResolver
// =============================================================================

/// Resolves widget options from the script tag that loaded the widget.
///
/// The controlling tag is the first `module` script whose `src`, resolved
/// against the base URI, equals the widget's module URL. Options are read
/// from its `data-*` attributes. A missing tag, a missing attribute or an
/// empty value all yield the caller's default; none of them is an error.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    context: EmbeddingContext,
}

impl ConfigResolver {
    pub fn new(context: EmbeddingContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &EmbeddingContext {
        &self.context
    }

    /// Resolve `key`, returning `default_value` when no value is supplied.
    pub fn resolve(&self, key: &str, default_value: &str) -> String {
        let value = self.controlling_script().and_then(|script| script.data(key));
        debug!(key, value = ?value, "Resolving widget option");
        match value {
            Some(v) if !v.is_empty() => v.to_string(),
            _ => {
                info!(key, default_value, "Option not supplied, using default");
                default_value.to_string()
            }
        }
    }

    pub fn resolve_option(&self, option: ConfigOption) -> String {
        self.resolve(option.key, option.default_value)
    }

    /// The first script tag that loaded this widget, if any.
    pub fn controlling_script(&self) -> Option<&ScriptTag> {
        let module_url = Url::parse(&self.context.module_url).ok()?;
        let base = Url::parse(&self.context.base_uri).ok();

        self.context
            .scripts
            .iter()
            .filter(|script| script.script_type == "module" && !script.src.is_empty())
            .find(|script| {
                let resolved = match &base {
                    Some(base) => base.join(&script.src),
                    None => Url::parse(&script.src),
                };
                resolved.map(|url| url == module_url).unwrap_or(false)
            })
    }
}

// =============================================================================
// Resolved settings
// =============================================================================

/// Construction parameters for the floating panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelSettings {
    pub width: Dimension,
    pub height: Dimension,
    pub target_link: String,
}

impl Default for PanelSettings {
    /// The bare panel component's own defaults, used when it is built
    /// without going through option resolution.
    fn default() -> Self {
        Self {
            width: Dimension::new("500px"),
            height: Dimension::new("400px"),
            target_link: "/index.html".to_string(),
        }
    }
}

/// Construction parameters for the toggle button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonSettings {
    pub theme_color: ThemeColor,
    pub label: String,
    pub tooltip_text: String,
}

impl Default for ButtonSettings {
    fn default() -> Self {
        Self {
            theme_color: ThemeColor::new(THEME_COLOR.default_value),
            label: BUTTON_TEXT.default_value.to_string(),
            tooltip_text: DEFAULT_TOOLTIP_TEXT.to_string(),
        }
    }
}

impl PanelSettings {
    pub fn resolve(resolver: &ConfigResolver) -> Self {
        Self {
            width: Dimension::new(resolver.resolve_option(WINDOW_WIDTH)),
            height: Dimension::new(resolver.resolve_option(WINDOW_HEIGHT)),
            target_link: resolver.resolve_option(TARGET_LINK),
        }
    }
}

impl ButtonSettings {
    pub fn resolve(resolver: &ConfigResolver) -> Self {
        Self {
            theme_color: ThemeColor::new(resolver.resolve_option(THEME_COLOR)),
            label: resolver.resolve_option(BUTTON_TEXT),
            tooltip_text: resolver.resolve_option(TOOLTIP_TEXT),
        }
    }
}

// =============================================================================
// Application config file
// =============================================================================

/// Top-level configuration for the `floaty` host harness.
///
/// Loaded from `floaty.toml`. The widget's own options are not listed here:
/// they live on the `[[host.scripts]]` tags and go through [`ConfigResolver`]
/// exactly as they would on a real page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FloatyConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub host: HostConfig,
}

impl FloatyConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: FloatyConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }
}

/// General harness settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// The simulated host page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Location of the host page; also its base URI and origin.
    pub page_url: String,
    /// HTML file providing the host document body.
    pub page_path: Option<String>,
    /// URL the widget script was loaded from.
    pub module_url: String,
    /// Script tags present on the page.
    pub scripts: Vec<ScriptTag>,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            page_url: "http://localhost:8080/".to_string(),
            page_path: None,
            module_url: "http://localhost:8080/floaty.js".to_string(),
            scripts: Vec::new(),
        }
    }
}

impl HostConfig {
    pub fn embedding_context(&self) -> EmbeddingContext {
        EmbeddingContext {
            base_uri: self.page_url.clone(),
            module_url: self.module_url.clone(),
            scripts: self.scripts.clone(),
        }
    }
}
