//! Transient values produced by the fetch collaborators.

use serde::{Deserialize, Serialize};

/// The observable text of a target, resolved by a content fetcher.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FetchedContent {
    /// Final URL after redirects
    pub url: String,

    /// Document title
    pub title: String,

    /// Selector the text was taken from
    pub selector: String,

    /// Text of the selected element
    pub text: String,
}

/// One item of a parsed feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedEntry {
    /// Entry link
    pub url: String,

    /// Entry title
    pub title: String,
}

impl FeedEntry {
    pub fn new(url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
        }
    }
}
