pub mod config;
pub mod error;
pub mod events;
pub mod types;

pub use config::{
    ButtonSettings, ConfigOption, ConfigResolver, EmbeddingContext, FloatyConfig, PanelSettings,
    ScriptTag,
};
pub use error::{FloatyError, Result};
pub use events::{EventBus, SubscriptionId, WidgetEvent};
pub use types::*;
