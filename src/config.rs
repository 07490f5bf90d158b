// src/config.rs

//! Configuration sources for the Lambda runtime.
//!
//! The monitor configuration (targets, keywords, templates) lives as a TOML
//! object in S3; topics and buckets come from environment variables.

use tracing::info;

use crate::error::{AppError, Result};
use crate::models::{Config, FetcherConfig};
use crate::pipeline::ScheduleTopics;
use crate::storage::s3::S3Storage;

/// Default object key of the monitor configuration.
pub const DEFAULT_CONFIG_KEY: &str = "config.toml";

/// Settings read from the Lambda environment.
#[derive(Debug, Clone, Default)]
pub struct LambdaEnv {
    /// `WEB_MONITOR_FUNCTION`: which handler this deployment runs
    pub function: Option<String>,
    /// `CONFIG_BUCKET`
    pub config_bucket: Option<String>,
    /// `CONFIG_KEY`
    pub config_key: String,
    /// `WEBSITE_TOPIC`: website check events from the scheduler
    pub website_topic: Option<String>,
    /// `FEED_TOPIC`: feed check events from the scheduler
    pub feed_topic: Option<String>,
    /// `NEXT_TOPIC`: detector results
    pub next_topic: Option<String>,
    /// `STATUS_TOPIC`: rendered status messages
    pub status_topic: Option<String>,
    /// `WEB_MONITOR_TIMEOUT_SECS`: fetch timeout of the detectors
    pub timeout_secs: Option<String>,
    /// `WEB_MONITOR_USER_AGENT`: User-Agent of the detectors
    pub user_agent: Option<String>,
}

impl LambdaEnv {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self {
            function: var("WEB_MONITOR_FUNCTION"),
            config_bucket: var("CONFIG_BUCKET"),
            config_key: var("CONFIG_KEY").unwrap_or_else(|| DEFAULT_CONFIG_KEY.to_string()),
            website_topic: var("WEBSITE_TOPIC"),
            feed_topic: var("FEED_TOPIC"),
            next_topic: var("NEXT_TOPIC"),
            status_topic: var("STATUS_TOPIC"),
            timeout_secs: var("WEB_MONITOR_TIMEOUT_SECS"),
            user_agent: var("WEB_MONITOR_USER_AGENT"),
        }
    }

    /// Fetcher settings for the detectors, defaults overridden by the
    /// environment.
    pub fn fetcher_config(&self) -> Result<FetcherConfig> {
        let mut config = FetcherConfig::default();
        if let Some(timeout) = &self.timeout_secs {
            config.timeout_secs = timeout.trim().parse().map_err(|e| {
                AppError::config(format!("Invalid WEB_MONITOR_TIMEOUT_SECS '{timeout}': {e}"))
            })?;
        }
        if let Some(user_agent) = &self.user_agent {
            config.user_agent = user_agent.clone();
        }
        Ok(config)
    }

    pub fn next_topic(&self) -> Result<&str> {
        require(&self.next_topic, "NEXT_TOPIC")
    }

    pub fn status_topic(&self) -> Result<&str> {
        require(&self.status_topic, "STATUS_TOPIC")
    }

    /// Topics used by the scheduler. The website topic is required.
    pub fn schedule_topics(&self) -> Result<ScheduleTopics> {
        Ok(ScheduleTopics {
            website: require(&self.website_topic, "WEBSITE_TOPIC")?.to_string(),
            feed: self.feed_topic.clone(),
        })
    }
}

fn require<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .ok_or_else(|| AppError::config(format!("{name} is not set")))
}

/// Config loader for Lambda environment.
pub struct LambdaConfigLoader {
    storage: S3Storage,
    key: String,
}

impl LambdaConfigLoader {
    pub fn new(storage: S3Storage, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Loader for `CONFIG_BUCKET`/`CONFIG_KEY`.
    pub async fn from_env(env: &LambdaEnv) -> Result<Self> {
        let bucket = require(&env.config_bucket, "CONFIG_BUCKET")?;
        let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let storage = S3Storage::new(aws_sdk_s3::Client::new(&sdk_config), bucket, "");
        Ok(Self::new(storage, env.config_key.clone()))
    }

    /// Fetch, parse and validate the monitor configuration.
    pub async fn load_config(&self) -> Result<Config> {
        info!("Loading config file from S3: {}", self.key);
        let bytes = self
            .storage
            .read_bytes_optional(&self.key)
            .await?
            .ok_or_else(|| AppError::config(format!("Config file not found in S3: {}", self.key)))?;

        let content = String::from_utf8(bytes).map_err(|e| {
            AppError::config(format!("Config file {} is not valid UTF-8: {}", self.key, e))
        })?;
        let config = Config::from_toml(&content)?;
        config.validate()?;
        Ok(config)
    }
}
