//! Page retrieval
//!
//! [`PageFetcher`] is the transport seam. [`HttpFetcher`] is the `reqwest`
//! implementation used by the binary; tests and other hosts plug in their own.

use crate::config::LoaderOptions;
use crate::error::{Result, TooltipError};
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

/// Fetch a page and return its body as text
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Retrieve `url`. Non-success statuses are errors.
    async fn fetch(&self, url: &Url) -> Result<String>;
}

/// HTTP fetcher backed by a shared `reqwest::Client`
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a client with the timeout and user agent from `options`
    pub fn new(options: &LoaderOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(options.timeout_ms))
            .user_agent(options.user_agent.clone())
            .build()
            .map_err(|e| TooltipError::Client(e.to_string()))?;

        Ok(Self { client })
    }

    /// Wrap an existing client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<String> {
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| TooltipError::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TooltipError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        response.text().await.map_err(|e| TooltipError::Transport {
            url: url.to_string(),
            reason: format!("Failed to read body: {}", e),
        })
    }
}
