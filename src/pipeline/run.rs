// src/pipeline/run.rs

//! One-shot run over every configured target.

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::context::{FeedCheckReport, MonitorContext};
use crate::models::{ChangeResult, Config, FeedCheckEvent, WebsiteTarget};

/// Outcome of a run over all targets.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub websites: Vec<ChangeResult>,
    pub feeds: Vec<FeedCheckReport>,
    /// `(target url, error)` for checks that failed outright
    pub failures: Vec<(String, String)>,
}

impl RunSummary {
    /// Websites whose change should reach users.
    pub fn changed_websites(&self) -> usize {
        self.websites.iter().filter(|r| r.should_notify()).count()
    }

    pub fn matched_entries(&self) -> usize {
        self.feeds.iter().map(|f| f.matches.len()).sum()
    }
}

enum Check<'a> {
    Website(&'a WebsiteTarget),
    Feed(&'a FeedCheckEvent),
}

enum CheckOutcome {
    Website(ChangeResult),
    Feed(FeedCheckReport),
}

/// Check every site and feed target once, publishing results to `topic`.
///
/// Checks run concurrently up to `fetcher.max_concurrent`. A failing target
/// is recorded in the summary and does not affect the others.
pub async fn run_checks(ctx: &MonitorContext, config: &Config, topic: &str) -> RunSummary {
    let start_time = Utc::now();
    let concurrency = config.fetcher.max_concurrent.max(1);
    let feed_events = config.feed_events();

    let jobs = config
        .site_targets
        .iter()
        .map(Check::Website)
        .chain(feed_events.iter().map(Check::Feed));

    let mut checks = stream::iter(jobs)
        .map(|job| async move {
            match job {
                Check::Website(target) => (
                    target.url.clone(),
                    ctx.check_website(target, topic)
                        .await
                        .map(CheckOutcome::Website),
                ),
                Check::Feed(event) => (
                    event.feed_url.clone(),
                    ctx.check_feed(event, topic).await.map(CheckOutcome::Feed),
                ),
            }
        })
        .buffer_unordered(concurrency);

    let mut websites = Vec::new();
    let mut feeds = Vec::new();
    let mut failures = Vec::new();
    while let Some((url, outcome)) = checks.next().await {
        match outcome {
            Ok(CheckOutcome::Website(result)) => websites.push(result),
            Ok(CheckOutcome::Feed(report)) => feeds.push(report),
            Err(error) => {
                log::warn!("Check failed for {}: {}", url, error);
                failures.push((url, error.to_string()));
            }
        }
    }

    RunSummary {
        start_time,
        end_time: Utc::now(),
        websites,
        feeds,
        failures,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::{FeedTarget, FetcherConfig};
    use crate::storage::MemoryStore;
    use crate::testutil::{MockContentFetcher, MockFeedParser, RecordingNotifier};

    #[tokio::test]
    async fn test_failing_target_is_isolated() {
        let fetcher = MockContentFetcher::new();
        let parser = MockFeedParser::new();
        parser.push_urls(&["https://example.com/1"]);
        let ctx = MonitorContext::new(
            Box::new(fetcher.clone()),
            Box::new(parser),
            Arc::new(MemoryStore::new()),
            Arc::new(RecordingNotifier::new()),
        );
        // Only one page queued: the second site check fails to resolve
        fetcher.push_text("A", "a");

        let config = Config {
            fetcher: FetcherConfig {
                max_concurrent: 1,
                ..Default::default()
            },
            keywords: vec!["Rally".into()],
            site_targets: vec![
                WebsiteTarget::new("https://a.example.com", "body"),
                WebsiteTarget::new("https://b.example.com", "body"),
            ],
            rss_targets: vec![FeedTarget::new("https://example.com/rss", "body", vec![])],
            ..Config::default()
        };

        let summary = run_checks(&ctx, &config, "results").await;
        assert_eq!(summary.websites.len(), 1);
        assert_eq!(summary.feeds.len(), 1);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].0, "https://b.example.com");
        assert_eq!(summary.changed_websites(), 0);
        assert_eq!(summary.matched_entries(), 0);
        assert!(summary.end_time >= summary.start_time);
    }

    #[tokio::test]
    async fn test_empty_config() {
        let ctx = MonitorContext::new(
            Box::new(MockContentFetcher::new()),
            Box::new(MockFeedParser::new()),
            Arc::new(MemoryStore::new()),
            Arc::new(RecordingNotifier::new()),
        );

        let summary = run_checks(&ctx, &Config::default(), "results").await;
        assert!(summary.websites.is_empty());
        assert!(summary.feeds.is_empty());
        assert!(summary.failures.is_empty());
    }
}
