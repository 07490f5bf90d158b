//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{FeedCheckEvent, FeedTarget, WebsiteTarget};
use crate::pipeline::keyword::compile_keywords;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP fetching behavior settings
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// Templates for user-visible status messages
    #[serde(default)]
    pub message_format: MessageFormat,

    /// Global keyword patterns used by feeds without their own list
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Watched web pages
    #[serde(default)]
    pub site_targets: Vec<WebsiteTarget>,

    /// Watched feeds
    #[serde(default)]
    pub rss_targets: Vec<FeedTarget>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Check events for every feed target.
    pub fn feed_events(&self) -> Vec<FeedCheckEvent> {
        self.rss_targets
            .iter()
            .map(|target| FeedCheckEvent::for_target(target, &self.keywords))
            .collect()
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.fetcher.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetcher.user_agent is empty"));
        }
        if self.fetcher.timeout_secs == 0 {
            return Err(AppError::validation("fetcher.timeout_secs must be > 0"));
        }
        if self.fetcher.max_concurrent == 0 {
            return Err(AppError::validation("fetcher.max_concurrent must be > 0"));
        }

        for target in &self.site_targets {
            url::Url::parse(&target.url)?;
            if target.selector.trim().is_empty() {
                return Err(AppError::validation(format!(
                    "site target {} has an empty selector",
                    target.url
                )));
            }
        }

        for event in self.feed_events() {
            url::Url::parse(&event.feed_url)?;
            if event.keywords.is_empty() {
                return Err(AppError::validation(format!(
                    "rss target {} has no keywords and no global keywords are defined",
                    event.feed_url
                )));
            }
        }

        let all_keywords: Vec<String> = self
            .keywords
            .iter()
            .chain(self.rss_targets.iter().flat_map(|t| t.keywords.iter()))
            .cloned()
            .collect();
        compile_keywords(&all_keywords)?;

        Ok(())
    }
}

/// HTTP client settings shared by the content fetcher and the feed parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds (also the selector wait for the browser)
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Maximum targets checked at once by a local batch run
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Status message templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageFormat {
    #[serde(default = "defaults::site_template")]
    pub site_template: String,

    #[serde(default = "defaults::rss_template")]
    pub rss_template: String,
}

impl Default for MessageFormat {
    fn default() -> Self {
        Self {
            site_template: defaults::site_template(),
            rss_template: defaults::rss_template(),
        }
    }
}

mod defaults {
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; web-monitor/0.1)".into()
    }
    pub fn timeout() -> u64 {
        10
    }
    pub fn max_concurrent() -> usize {
        4
    }
    pub fn site_template() -> String {
        "{title} has been updated {url}".into()
    }
    pub fn rss_template() -> String {
        "[{matched_keyword}] {title} {url}".into()
    }
}
