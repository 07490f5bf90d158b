//! Test utilities: mock implementations of the collaborator traits.
//!
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{AppError, Result};
use crate::models::{FeedEntry, FetchedContent};
use crate::services::{ContentFetcher, FeedParser, Notifier};

// ---------------------------------------------------------------------------
// MockContentFetcher
// ---------------------------------------------------------------------------

enum MockPage {
    Page {
        resolved_url: Option<String>,
        title: String,
        text: String,
    },
    Fail(AppError),
}

/// Fetcher that pops queued pages and records every call.
///
/// An exhausted queue answers with a resolution error.
#[derive(Clone, Default)]
pub struct MockContentFetcher {
    pages: Arc<Mutex<VecDeque<MockPage>>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockContentFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetcher answering each call with the next text, in order.
    pub fn with_texts(texts: &[&str]) -> Self {
        let fetcher = Self::new();
        for text in texts {
            fetcher.push_text("Title", text);
        }
        fetcher
    }

    /// Queue a page served at the requested URL.
    pub fn push_text(&self, title: &str, text: &str) {
        self.pages.lock().unwrap().push_back(MockPage::Page {
            resolved_url: None,
            title: title.to_string(),
            text: text.to_string(),
        });
    }

    /// Queue a page reached through a redirect to `resolved_url`.
    pub fn push_redirect(&self, resolved_url: &str, title: &str, text: &str) {
        self.pages.lock().unwrap().push_back(MockPage::Page {
            resolved_url: Some(resolved_url.to_string()),
            title: title.to_string(),
            text: text.to_string(),
        });
    }

    /// Queue a failure.
    pub fn push_error(&self, error: AppError) {
        self.pages.lock().unwrap().push_back(MockPage::Fail(error));
    }

    /// Recorded `(url, selector)` calls.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ContentFetcher for MockContentFetcher {
    async fn fetch(&self, url: &str, selector: &str) -> Result<FetchedContent> {
        self.calls
            .lock()
            .unwrap()
            .push((url.to_string(), selector.to_string()));

        let page = self.pages.lock().unwrap().pop_front();
        match page {
            Some(MockPage::Page {
                resolved_url,
                title,
                text,
            }) => Ok(FetchedContent {
                url: resolved_url.unwrap_or_else(|| url.to_string()),
                title,
                selector: selector.to_string(),
                text,
            }),
            Some(MockPage::Fail(error)) => Err(error),
            None => Err(AppError::resolution(url, selector)),
        }
    }
}

// ---------------------------------------------------------------------------
// MockFeedParser
// ---------------------------------------------------------------------------

/// Feed parser that pops queued entry lists.
#[derive(Clone, Default)]
pub struct MockFeedParser {
    responses: Arc<Mutex<VecDeque<Result<Vec<FeedEntry>>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockFeedParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one fetch returning entries with the given URLs (title = URL).
    pub fn push_urls(&self, urls: &[&str]) {
        let entries = urls.iter().map(|u| FeedEntry::new(*u, *u)).collect();
        self.push_entries(entries);
    }

    pub fn push_entries(&self, entries: Vec<FeedEntry>) {
        self.responses.lock().unwrap().push_back(Ok(entries));
    }

    pub fn push_error(&self, error: AppError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FeedParser for MockFeedParser {
    async fn parse(&self, feed_url: &str) -> Result<Vec<FeedEntry>> {
        self.calls.lock().unwrap().push(feed_url.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AppError::feed_parse(feed_url, "no queued response")))
    }
}

// ---------------------------------------------------------------------------
// RecordingNotifier
// ---------------------------------------------------------------------------

/// Notifier that records every published `(topic, payload)`.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    published: Arc<Mutex<Vec<(String, serde_json::Value)>>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifier whose every publish fails.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn published(&self) -> Vec<(String, serde_json::Value)> {
        self.published.lock().unwrap().clone()
    }

    /// Payloads published to `topic`.
    pub fn on_topic(&self, topic: &str) -> Vec<serde_json::Value> {
        self.published()
            .into_iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, payload)| payload)
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn publish(&self, topic: &str, payload: &serde_json::Value) -> Result<Option<String>> {
        if self.fail {
            return Err(AppError::notify(topic, "bus unavailable"));
        }
        let mut published = self.published.lock().unwrap();
        published.push((topic.to_string(), payload.clone()));
        Ok(Some(format!("msg-{}", published.len())))
    }
}
