//! New-entry detection for feeds.
//!
//! Every entry ever seen in a feed is marked in the fingerprint store. Only
//! entries appearing after the feed was first checked are reported; the
//! entries present at the first check are backlog and never notify.

use crate::error::Result;
use crate::models::FeedEntry;
use crate::services::FeedParser;
use crate::storage::FeedEntries;

/// Detects entries not seen in earlier fetches of a feed.
pub struct FeedEntryDetector<'a> {
    parser: &'a dyn FeedParser,
    entries: FeedEntries,
}

impl<'a> FeedEntryDetector<'a> {
    pub fn new(parser: &'a dyn FeedParser, entries: FeedEntries) -> Self {
        Self { parser, entries }
    }

    /// Fetch the feed and return its new entries in feed order.
    ///
    /// Unseen entries are marked immediately. A feed is on its first sight
    /// when it has no feed-level marker and none of the fetched entries was
    /// seen before; in that case every entry is marked but an empty list is
    /// returned. The feed-level marker is written after the scan.
    pub async fn detect_new_entries(&self, feed_url: &str) -> Result<Vec<FeedEntry>> {
        let fetched = self.parser.parse(feed_url).await?;
        let feed_known = self.entries.has_checked(feed_url, None).await?;

        let mut seen_before = false;
        let mut new_entries = Vec::new();
        for entry in fetched {
            if self.entries.has_checked(feed_url, Some(&entry.url)).await? {
                seen_before = true;
                continue;
            }
            self.entries.check(feed_url, Some(&entry.url)).await?;
            new_entries.push(entry);
        }

        if !feed_known {
            self.entries.check(feed_url, None).await?;
        }

        if !feed_known && !seen_before {
            log::info!(
                "First sight of feed {}: {} entries recorded as backlog",
                feed_url,
                new_entries.len()
            );
            return Ok(Vec::new());
        }

        log::info!("Feed {}: {} new entries", feed_url, new_entries.len());
        Ok(new_entries)
    }
}
