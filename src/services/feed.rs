// src/services/feed.rs

//! Feed parser: turns an RSS/Atom feed into an ordered entry list.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{FeedEntry, FetcherConfig};
use crate::utils::http::{create_async_client, fetch_bytes};
use crate::utils::{normalize_whitespace, resolve};

/// Fetches and parses a feed.
#[async_trait]
pub trait FeedParser: Send + Sync {
    /// Entries in feed order. Malformed content fails with
    /// [`AppError::FeedParse`].
    async fn parse(&self, feed_url: &str) -> Result<Vec<FeedEntry>>;
}

/// HTTP feed parser backed by `feed-rs`.
#[derive(Clone)]
pub struct HttpFeedParser {
    client: Client,
}

impl HttpFeedParser {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl FeedParser for HttpFeedParser {
    async fn parse(&self, feed_url: &str) -> Result<Vec<FeedEntry>> {
        log::debug!("Fetching feed {}", feed_url);
        let bytes = fetch_bytes(&self.client, feed_url).await?;
        parse_feed(feed_url, &bytes)
    }
}

/// Parse feed bytes into entries.
///
/// Entries without a link cannot be tracked and are skipped. Relative links
/// are resolved against the feed URL.
pub fn parse_feed(feed_url: &str, bytes: &[u8]) -> Result<Vec<FeedEntry>> {
    let feed = feed_rs::parser::parse(bytes).map_err(|e| AppError::feed_parse(feed_url, e))?;

    let mut entries = Vec::with_capacity(feed.entries.len());
    for entry in feed.entries {
        let Some(link) = entry.links.first() else {
            log::debug!("Skipping entry {} without link in {}", entry.id, feed_url);
            continue;
        };
        let url = resolve(feed_url, &link.href).unwrap_or_else(|| link.href.clone());
        let title = entry
            .title
            .map(|t| normalize_whitespace(&t.content))
            .unwrap_or_default();

        entries.push(FeedEntry { url, title });
    }

    Ok(entries)
}
