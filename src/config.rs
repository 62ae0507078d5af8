use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://www.worthcrete.com";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, PartialEq)]
pub struct ScraperConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Total attempts per episode page.
    pub retries: u32,
    pub retry_delay_secs: u64,
    /// Pause between episode pages; shows in a category wait twice as long.
    pub request_delay_secs: u64,
    pub page_delay_secs: u64,
    pub max_pages: u32,
}

#[derive(Debug, Default, Deserialize)]
struct ScraperConfigFile {
    base_url: Option<String>,
    user_agent: Option<String>,
    timeout_secs: Option<u64>,
    retries: Option<u32>,
    retry_delay_secs: Option<u64>,
    request_delay_secs: Option<u64>,
    page_delay_secs: Option<u64>,
    max_pages: Option<u32>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self::from_file(ScraperConfigFile::default())
    }
}

impl ScraperConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let file: ScraperConfigFile = toml::from_str(raw)?;
        Ok(Self::from_file(file))
    }

    fn from_file(file: ScraperConfigFile) -> Self {
        Self {
            base_url: file.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            user_agent: file.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            timeout_secs: file.timeout_secs.unwrap_or(15),
            retries: file.retries.unwrap_or(3).max(1),
            retry_delay_secs: file.retry_delay_secs.unwrap_or(3),
            request_delay_secs: file.request_delay_secs.unwrap_or(2),
            page_delay_secs: file.page_delay_secs.unwrap_or(1),
            max_pages: file.max_pages.unwrap_or(100),
        }
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_secs(self.request_delay_secs)
    }

    pub fn show_delay(&self) -> Duration {
        Duration::from_secs(self.request_delay_secs.saturating_mul(2))
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_secs(self.page_delay_secs)
    }
}
