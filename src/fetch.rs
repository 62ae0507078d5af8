use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use thiserror::Error;
use tracing::warn;

use crate::config::ScraperConfig;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("HTTP error: {0}")]
    Status(u16),
    #[error("request failed: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

/// Anything that can turn a URL into page HTML.
#[allow(async_fn_in_trait)]
pub trait PageSource {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// Live HTTP page source.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client })
    }
}

impl PageSource for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        Ok(response.text().await?)
    }
}

/// Fetches `url`, retrying up to `attempts` times in total with a fixed delay.
pub async fn fetch_with_retry<S: PageSource>(
    source: &S,
    url: &str,
    attempts: u32,
    delay: Duration,
) -> Result<String, FetchError> {
    let attempts = attempts.max(1);
    let mut attempt = 1;

    loop {
        match source.fetch(url).await {
            Ok(html) => return Ok(html),
            Err(err) if attempt < attempts => {
                match &err {
                    FetchError::Timeout => warn!("Timeout, retry {}/{}...", attempt + 1, attempts),
                    _ => warn!("Error ({}), retry {}/{}...", err, attempt + 1, attempts),
                }
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                match &err {
                    FetchError::Timeout => warn!("Timeout after {} attempts: {}", attempts, url),
                    _ => warn!("Failed after {} attempts: {}", attempts, err),
                }
                return Err(err);
            }
        }
    }
}
