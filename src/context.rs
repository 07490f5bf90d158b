// src/context.rs

//! Runtime context shared by every check.
//!
//! The content fetcher may hold a browser session, so it is created once,
//! owned here and released through [`MonitorContext::shutdown`]. Concurrent
//! checks take turns on it; stores and notifiers are shared freely.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::models::{
    ChangeResult, FeedCheckEvent, FetchedContent, FetcherConfig, MatchResult, MonitorResult,
    WebsiteTarget,
};
use crate::pipeline::keyword::compile_keywords;
use crate::pipeline::{FeedEntryDetector, KeywordMatcher, WebsiteChangeDetector};
use crate::services::{ContentFetcher, FeedParser, HttpContentFetcher, HttpFeedParser, Notifier, notify};
use crate::storage::{FeedEntries, FingerprintStore, WebsiteRevisions};

/// Fetcher guarded so that one request uses it at a time.
pub struct ExclusiveFetcher {
    inner: Mutex<Box<dyn ContentFetcher>>,
}

impl ExclusiveFetcher {
    pub fn new(fetcher: Box<dyn ContentFetcher>) -> Self {
        Self {
            inner: Mutex::new(fetcher),
        }
    }
}

#[async_trait]
impl ContentFetcher for ExclusiveFetcher {
    async fn fetch(&self, url: &str, selector: &str) -> Result<FetchedContent> {
        let fetcher = self.inner.lock().await;
        fetcher.fetch(url, selector).await
    }

    async fn close(&mut self) -> Result<()> {
        self.inner.get_mut().close().await
    }
}

/// Outcome of one feed check.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FeedCheckReport {
    pub feed_url: String,
    /// Entries not seen before
    pub new_entries: usize,
    /// Entries that matched a keyword, in feed order
    pub matches: Vec<MatchResult>,
    /// `(entry url, error)` for entries the matcher could not evaluate
    pub failures: Vec<(String, String)>,
}

/// Collaborators for running checks.
pub struct MonitorContext {
    fetcher: ExclusiveFetcher,
    feeds: Box<dyn FeedParser>,
    store: Arc<dyn FingerprintStore>,
    notifier: Arc<dyn Notifier>,
}

impl MonitorContext {
    pub fn new(
        fetcher: Box<dyn ContentFetcher>,
        feeds: Box<dyn FeedParser>,
        store: Arc<dyn FingerprintStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            fetcher: ExclusiveFetcher::new(fetcher),
            feeds,
            store,
            notifier,
        }
    }

    /// Context backed by plain HTTP fetching.
    pub fn http(
        config: &FetcherConfig,
        store: Arc<dyn FingerprintStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        Ok(Self::new(
            Box::new(HttpContentFetcher::new(config)?),
            Box::new(HttpFeedParser::new(config)?),
            store,
            notifier,
        ))
    }

    /// Context rendering pages in a headless browser.
    #[cfg(feature = "browser")]
    pub async fn browser(
        config: &FetcherConfig,
        store: Arc<dyn FingerprintStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let timeout = std::time::Duration::from_secs(config.timeout_secs);
        let fetcher = crate::services::BrowserFetcher::launch(timeout).await?;
        Ok(Self::new(
            Box::new(fetcher),
            Box::new(HttpFeedParser::new(config)?),
            store,
            notifier,
        ))
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    pub fn store(&self) -> Arc<dyn FingerprintStore> {
        Arc::clone(&self.store)
    }

    /// Detect changes of one website and publish the result to `topic` when
    /// it passes the notification gate.
    pub async fn check_website(&self, target: &WebsiteTarget, topic: &str) -> Result<ChangeResult> {
        let detector =
            WebsiteChangeDetector::new(&self.fetcher, WebsiteRevisions::new(self.store()));
        let result = detector.detect_changes(target).await?;

        if result.should_notify() {
            notify(
                self.notifier(),
                topic,
                &MonitorResult::from(result.clone()),
            )
            .await;
        }

        Ok(result)
    }

    /// Detect new entries of one feed and publish every keyword match to
    /// `topic` as soon as it is found.
    ///
    /// Keywords are compiled first: an invalid pattern fails the check before
    /// any entry is marked seen.
    pub async fn check_feed(&self, event: &FeedCheckEvent, topic: &str) -> Result<FeedCheckReport> {
        let patterns = compile_keywords(&event.keywords)?;
        let detector = FeedEntryDetector::new(self.feeds.as_ref(), FeedEntries::new(self.store()));
        let entries = detector.detect_new_entries(&event.feed_url).await?;
        let matcher = KeywordMatcher::new(&self.fetcher);

        let mut report = FeedCheckReport {
            feed_url: event.feed_url.clone(),
            new_entries: entries.len(),
            ..FeedCheckReport::default()
        };

        for entry in entries {
            let matched = match matcher
                .matched_pattern(&entry, &event.selector, &patterns)
                .await
            {
                Ok(Some(keyword)) => keyword,
                Ok(None) => continue,
                Err(e) => {
                    log::warn!("Failed to match entry {}: {}", entry.url, e);
                    report.failures.push((entry.url, e.to_string()));
                    continue;
                }
            };

            let result = MatchResult {
                url: entry.url,
                feed_url: event.feed_url.clone(),
                selector: event.selector.clone(),
                title: entry.title,
                matched_keyword: matched,
            };
            notify(self.notifier(), topic, &MonitorResult::from(result.clone())).await;
            report.matches.push(result);
        }

        Ok(report)
    }

    /// Release the fetcher.
    pub async fn shutdown(mut self) -> Result<()> {
        self.fetcher.close().await
    }
}
