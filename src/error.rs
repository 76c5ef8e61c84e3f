use thiserror::Error;

/// Errors produced while loading tooltip descriptions
#[derive(Debug, Error)]
pub enum TooltipError {
    /// The server answered with a non-success status
    #[error("HTTP {status} {reason} ({url})")]
    HttpStatus { url: String, status: u16, reason: String },

    /// The request never produced a response (DNS, connect, timeout, body read)
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// The fetched page has no element with the expected id
    #[error("missing description container: no element with id \"{0}\"")]
    MissingContainer(String),

    /// A target carried a locator that cannot be turned into a URL
    #[error("invalid locator '{locator}': {reason}")]
    InvalidLocator { locator: String, reason: String },

    /// A configured or discovered URL could not be parsed
    #[error("invalid URL '{0}'")]
    InvalidUrl(String),

    /// The HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl TooltipError {
    /// Whether this is a retrieval failure (status or transport)
    pub fn is_retrieval(&self) -> bool {
        matches!(self, Self::HttpStatus { .. } | Self::Transport { .. })
    }

    /// Whether this is an extraction failure
    pub fn is_extraction(&self) -> bool {
        matches!(self, Self::MissingContainer(_))
    }
}

pub type Result<T> = std::result::Result<T, TooltipError>;
