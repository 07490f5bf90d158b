//! Fingerprint storage for change detection.
//!
//! Every watched identity maps to one opaque record under a [`RevisionKey`]:
//!
//! ```text
//! {prefix}/
//! ├── sha256(url::selector)              # Website: last seen text
//! ├── sha256(feed_url)                   # Feed: "checked before" marker
//! └── sha256(feed_url)/
//!     └── sha256(entry_url)              # Feed entry: "seen" marker
//! ```
//!
//! A missing record is a normal outcome (`None` / `false`). Backend failures
//! surface as [`AppError::Storage`] and are never reported as "not found".

pub mod local;
pub mod memory;
#[cfg(feature = "aws")]
pub mod s3;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::error::Result;

// Re-export for convenience
pub use local::LocalStorage;
pub use memory::MemoryStore;

/// Opaque lookup key derived from a target's address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RevisionKey(String);

impl RevisionKey {
    /// Key for the text under `selector` on the page at `url`.
    pub fn website(url: &str, selector: &str) -> Self {
        Self(sha256_hex(&format!("{url}::{selector}")))
    }

    /// Key for a feed, or for one of its entries when `entry_url` is given.
    pub fn feed(feed_url: &str, entry_url: Option<&str>) -> Self {
        let feed_hash = sha256_hex(feed_url);
        match entry_url {
            Some(entry) => Self(format!("{}/{}", feed_hash, sha256_hex(entry))),
            None => Self(feed_hash),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RevisionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// Key/value backend holding the last seen state per key.
#[async_trait]
pub trait FingerprintStore: Send + Sync {
    /// Whether a record exists under `key`.
    async fn exists(&self, key: &RevisionKey) -> Result<bool>;

    /// Read the record under `key`, `None` if absent.
    async fn read(&self, key: &RevisionKey) -> Result<Option<String>>;

    /// Create or overwrite the record under `key`.
    async fn write(&self, key: &RevisionKey, value: &str) -> Result<()>;
}

/// Content mode: full text snapshots of website selections.
#[derive(Clone)]
pub struct WebsiteRevisions {
    store: Arc<dyn FingerprintStore>,
}

impl WebsiteRevisions {
    pub fn new(store: Arc<dyn FingerprintStore>) -> Self {
        Self { store }
    }

    /// Previously stored text for `(url, selector)`.
    pub async fn get(&self, url: &str, selector: &str) -> Result<Option<String>> {
        self.store.read(&RevisionKey::website(url, selector)).await
    }

    /// Overwrite the stored text for `(url, selector)`.
    pub async fn update(&self, url: &str, selector: &str, text: &str) -> Result<()> {
        let key = RevisionKey::website(url, selector);
        log::info!("Updating revision {} for {} ({})", key, url, selector);
        self.store.write(&key, text).await
    }
}

/// Presence-only mode: which feeds and feed entries have been seen.
#[derive(Clone)]
pub struct FeedEntries {
    store: Arc<dyn FingerprintStore>,
}

impl FeedEntries {
    pub fn new(store: Arc<dyn FingerprintStore>) -> Self {
        Self { store }
    }

    /// Whether the feed (or one of its entries) was checked before.
    pub async fn has_checked(&self, feed_url: &str, entry_url: Option<&str>) -> Result<bool> {
        self.store
            .exists(&RevisionKey::feed(feed_url, entry_url))
            .await
    }

    /// Mark the feed (or one of its entries) as checked.
    pub async fn check(&self, feed_url: &str, entry_url: Option<&str>) -> Result<()> {
        let key = RevisionKey::feed(feed_url, entry_url);
        log::debug!("Marking {} as checked ({:?})", key, entry_url);
        self.store.write(&key, "").await
    }
}
