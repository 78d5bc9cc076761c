use thiserror::Error;

/// Top-level error type for the Floaty widget.
///
/// Most of these never reach the embedding page: the operations that the
/// widget promises not to fail (message delivery, text extraction inside the
/// click handler) catch them, log them, and carry on.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FloatyError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid target link: {0}")]
    InvalidTarget(String),

    #[error("Embedded document unavailable: {0}")]
    ChannelUnavailable(String),

    #[error("Message delivery failed: {0}")]
    Delivery(String),

    #[error("Text extraction failed: {0}")]
    Extraction(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for FloatyError {
    fn from(err: toml::de::Error) -> Self {
        FloatyError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for FloatyError {
    fn from(err: serde_json::Error) -> Self {
        FloatyError::Serialization(err.to_string())
    }
}

impl From<url::ParseError> for FloatyError {
    fn from(err: url::ParseError) -> Self {
        FloatyError::InvalidTarget(err.to_string())
    }
}

/// A specialized `Result` type for Floaty operations.
pub type Result<T> = std::result::Result<T, FloatyError>;
