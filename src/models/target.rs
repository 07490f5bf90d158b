//! Monitored targets and the check events sent by the scheduler.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// A web page watched for changes under a CSS selector.
///
/// The same shape is used for the configuration entry and for the
/// `DetectWebsiteChangesEvent` message published by the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebsiteTarget {
    /// Page URL
    pub url: String,

    /// CSS selector of the watched element
    #[serde(default = "default_selector")]
    pub selector: String,

    /// Display title overriding the page `<title>`
    #[serde(default)]
    pub title: Option<String>,
}

impl WebsiteTarget {
    pub fn new(url: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            selector: selector.into(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Parse a check event from a JSON message body.
    pub fn from_message(message: &str) -> Result<Self> {
        serde_json::from_str(message)
            .map_err(|e| AppError::validation(format!("Invalid website check event: {e}")))
    }
}

/// A feed watched for new entries relevant to a keyword list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedTarget {
    /// Feed URL
    pub url: String,

    /// CSS selector applied to entry pages when the title does not match
    #[serde(default = "default_selector")]
    pub selector: String,

    /// Keyword patterns; empty means "use the global keyword list"
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl FeedTarget {
    pub fn new(url: impl Into<String>, selector: impl Into<String>, keywords: Vec<String>) -> Self {
        Self {
            url: url.into(),
            selector: selector.into(),
            keywords,
        }
    }
}

/// Message asking for one feed to be checked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedCheckEvent {
    pub feed_url: String,

    #[serde(default = "default_selector")]
    pub selector: String,

    pub keywords: Vec<String>,
}

impl FeedCheckEvent {
    /// Parse a check event from a JSON message body.
    pub fn from_message(message: &str) -> Result<Self> {
        serde_json::from_str(message)
            .map_err(|e| AppError::validation(format!("Invalid feed check event: {e}")))
    }

    /// Build the event for a target, falling back to the global keywords.
    pub fn for_target(target: &FeedTarget, global_keywords: &[String]) -> Self {
        let keywords = if target.keywords.is_empty() {
            global_keywords.to_vec()
        } else {
            target.keywords.clone()
        };

        Self {
            feed_url: target.url.clone(),
            selector: target.selector.clone(),
            keywords,
        }
    }
}

fn default_selector() -> String {
    "body".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_website_event_defaults() {
        let event = WebsiteTarget::from_message(r#"{"url": "https://example.com"}"#).unwrap();
        assert_eq!(event.selector, "body");
        assert!(event.title.is_none());
    }

    #[test]
    fn test_website_event_missing_url() {
        let err = WebsiteTarget::from_message(r#"{"selector": ".price"}"#).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_feed_event_requires_keywords() {
        assert!(FeedCheckEvent::from_message(r#"{"feed_url": "https://example.com/rss"}"#).is_err());

        let event = FeedCheckEvent::from_message(
            r#"{"feed_url": "https://example.com/rss", "keywords": ["Rally"]}"#,
        )
        .unwrap();
        assert_eq!(event.selector, "body");
        assert_eq!(event.keywords, vec!["Rally"]);
    }

    #[test]
    fn test_feed_event_inherits_global_keywords() {
        let target = FeedTarget::new("https://example.com/rss", "article", Vec::new());
        let global = vec!["Crash".to_string()];

        let event = FeedCheckEvent::for_target(&target, &global);
        assert_eq!(event.keywords, global);

        let target = FeedTarget::new("https://example.com/rss", "article", vec!["Rally".into()]);
        let event = FeedCheckEvent::for_target(&target, &global);
        assert_eq!(event.keywords, vec!["Rally"]);
    }
}
