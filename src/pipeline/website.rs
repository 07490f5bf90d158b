//! Website change detection.
//!
//! Compares the freshly fetched text of a selector with the last stored
//! revision and records the new text when it differs.

use crate::error::Result;
use crate::models::{ChangeResult, WebsiteTarget};
use crate::services::ContentFetcher;
use crate::storage::WebsiteRevisions;

/// Detects changes of a selected element on a web page.
pub struct WebsiteChangeDetector<'a> {
    fetcher: &'a dyn ContentFetcher,
    revisions: WebsiteRevisions,
}

impl<'a> WebsiteChangeDetector<'a> {
    pub fn new(fetcher: &'a dyn ContentFetcher, revisions: WebsiteRevisions) -> Self {
        Self { fetcher, revisions }
    }

    /// Fetch the target and compare it with the stored revision.
    ///
    /// The revision is keyed by the resolved URL (after redirects) and the
    /// target selector. Text is compared as-is. A changed text is stored
    /// before the result is returned, so the store reflects the latest state
    /// even if reporting fails afterwards.
    pub async fn detect_changes(&self, target: &WebsiteTarget) -> Result<ChangeResult> {
        let current = self.fetcher.fetch(&target.url, &target.selector).await?;
        let previous = self.revisions.get(&current.url, &target.selector).await?;

        let has_changed = previous.as_deref() != Some(current.text.as_str());
        if has_changed {
            self.revisions
                .update(&current.url, &target.selector, &current.text)
                .await?;
        }

        log::info!(
            "Checked {} ({}): changed={}, first_sight={}",
            current.url,
            target.selector,
            has_changed,
            previous.is_none()
        );

        Ok(ChangeResult {
            url: current.url,
            selector: current.selector,
            title: target.title.clone().unwrap_or(current.title),
            has_changed,
            text_previous: previous,
            text_current: current.text,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::AppError;
    use crate::storage::{FingerprintStore, MemoryStore, RevisionKey};
    use crate::testutil::MockContentFetcher;

    fn revisions(store: &MemoryStore) -> WebsiteRevisions {
        WebsiteRevisions::new(Arc::new(store.clone()))
    }

    #[tokio::test]
    async fn test_price_scenario() {
        let store = MemoryStore::new();
        let fetcher = MockContentFetcher::with_texts(&["$10", "$12", "$12"]);
        let detector = WebsiteChangeDetector::new(&fetcher, revisions(&store));
        let target = WebsiteTarget::new("https://example.com", ".price");

        let first = detector.detect_changes(&target).await.unwrap();
        assert!(first.has_changed);
        assert_eq!(first.text_previous, None);
        assert_eq!(first.text_current, "$10");
        assert!(!first.should_notify());

        let second = detector.detect_changes(&target).await.unwrap();
        assert!(second.has_changed);
        assert_eq!(second.text_previous.as_deref(), Some("$10"));
        assert_eq!(second.text_current, "$12");
        assert!(second.should_notify());

        let third = detector.detect_changes(&target).await.unwrap();
        assert!(!third.has_changed);
        assert!(!third.should_notify());
    }

    #[tokio::test]
    async fn test_unchanged_text_does_not_rewrite_store() {
        let store = MemoryStore::new();
        let fetcher = MockContentFetcher::with_texts(&["same", "same", "same"]);
        let detector = WebsiteChangeDetector::new(&fetcher, revisions(&store));
        let target = WebsiteTarget::new("https://example.com", "body");

        detector.detect_changes(&target).await.unwrap();
        assert_eq!(store.write_count(), 1);

        let again = detector.detect_changes(&target).await.unwrap();
        assert!(!again.has_changed);
        detector.detect_changes(&target).await.unwrap();
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_whitespace_counts_as_change() {
        let store = MemoryStore::new();
        let fetcher = MockContentFetcher::with_texts(&["$10", "$10 "]);
        let detector = WebsiteChangeDetector::new(&fetcher, revisions(&store));
        let target = WebsiteTarget::new("https://example.com", ".price");

        detector.detect_changes(&target).await.unwrap();
        let result = detector.detect_changes(&target).await.unwrap();
        assert!(result.has_changed);
    }

    #[tokio::test]
    async fn test_keyed_by_resolved_url() {
        let store = MemoryStore::new();
        let fetcher = MockContentFetcher::new();
        fetcher.push_redirect("https://www.example.com/", "Example", "v1");
        let detector = WebsiteChangeDetector::new(&fetcher, revisions(&store));
        let target = WebsiteTarget::new("https://example.com", ".price");

        let result = detector.detect_changes(&target).await.unwrap();
        assert_eq!(result.url, "https://www.example.com/");

        let resolved = RevisionKey::website("https://www.example.com/", ".price");
        let requested = RevisionKey::website("https://example.com", ".price");
        assert!(store.exists(&resolved).await.unwrap());
        assert!(!store.exists(&requested).await.unwrap());
    }

    #[tokio::test]
    async fn test_title_override() {
        let store = MemoryStore::new();
        let fetcher = MockContentFetcher::new();
        fetcher.push_text("Page Title", "a");
        fetcher.push_text("Page Title", "b");
        let detector = WebsiteChangeDetector::new(&fetcher, revisions(&store));

        let plain = WebsiteTarget::new("https://example.com", "body");
        assert_eq!(detector.detect_changes(&plain).await.unwrap().title, "Page Title");

        let titled = plain.with_title("My Watch");
        assert_eq!(detector.detect_changes(&titled).await.unwrap().title, "My Watch");
    }

    #[tokio::test]
    async fn test_fetch_failure_leaves_store_untouched() {
        let store = MemoryStore::new();
        let fetcher = MockContentFetcher::new();
        fetcher.push_error(AppError::resolution("https://example.com", ".price"));
        let detector = WebsiteChangeDetector::new(&fetcher, revisions(&store));

        let err = detector
            .detect_changes(&WebsiteTarget::new("https://example.com", ".price"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Resolution { .. }));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_is_not_first_sight() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        let fetcher = MockContentFetcher::with_texts(&["$10"]);
        let detector = WebsiteChangeDetector::new(&fetcher, revisions(&store));

        let err = detector
            .detect_changes(&WebsiteTarget::new("https://example.com", ".price"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));
    }
}
