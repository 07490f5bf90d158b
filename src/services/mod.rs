// src/services/mod.rs

//! Collaborators behind narrow traits: content fetching, feed parsing and
//! message publishing.

#[cfg(feature = "browser")]
pub mod browser;
pub mod content;
pub mod feed;
pub mod notifier;
#[cfg(feature = "aws")]
pub mod sns;

#[cfg(feature = "browser")]
pub use browser::BrowserFetcher;
pub use content::{ContentFetcher, HttpContentFetcher};
pub use feed::{FeedParser, HttpFeedParser};
pub use notifier::{LogNotifier, Notifier, notify};
#[cfg(feature = "aws")]
pub use sns::SnsNotifier;
