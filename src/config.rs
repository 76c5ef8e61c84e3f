use crate::error::{Result, TooltipError};
use serde::{Deserialize, Serialize};
use url::Url;

/// Default base URL: the local relay browser that serves the trainer page
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:60080/";

/// Id of the element whose children form the tooltip body
pub const DEFAULT_CONTAINER_ID: &str = "description";

/// Class carried by host elements that should get a tooltip
pub const DEFAULT_TARGET_CLASS: &str = "better-trainer-skill-tooltip";

/// Attribute holding a direct description URL
pub const DESC_URL_ATTR: &str = "data-better-trainer-desc-url";

/// Attribute holding a skill id
pub const SKILL_ID_ATTR: &str = "data-better-trainer-skill-id";

/// Shown while the primary page is loading
pub const LOADING_MESSAGE: &str = "Loading...";

/// Shown when any load fails
pub const FAILURE_MESSAGE: &str = "Failed to load page";

/// Options shared by the fetcher, the target scan and every controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderOptions {
    /// Base URL that relative locators and skill ids resolve against
    pub base_url: Url,

    /// Id of the description container in fetched pages
    pub container_id: String,

    /// Class that marks tooltip targets on the host page
    pub target_class: String,

    /// Request timeout in milliseconds
    pub timeout_ms: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("Default base URL is valid"),
            container_id: DEFAULT_CONTAINER_ID.to_string(),
            target_class: DEFAULT_TARGET_CLASS.to_string(),
            timeout_ms: 15_000,
            user_agent: format!("better-trainer/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl LoaderOptions {
    /// Create options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL, rejecting anything that is not an absolute URL
    pub fn base_url(mut self, base_url: &str) -> Result<Self> {
        let mut url = Url::parse(base_url).map_err(|_| TooltipError::InvalidUrl(base_url.to_string()))?;
        // Without a trailing slash, joins would replace the last segment
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        self.base_url = url;
        Ok(self)
    }

    /// Set the description container id
    pub fn container_id(mut self, id: impl Into<String>) -> Self {
        self.container_id = id.into();
        self
    }

    /// Set the target class
    pub fn target_class(mut self, class: impl Into<String>) -> Self {
        self.target_class = class.into();
        self
    }

    /// Set the request timeout in milliseconds
    pub fn timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
