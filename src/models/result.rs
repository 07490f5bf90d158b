//! Results emitted by the detectors.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)\}").expect("placeholder pattern is valid"));

/// Fill `{name}` placeholders in one pass. Substituted values are not
/// scanned again and unknown names are left as they are.
fn fill_template<'a>(template: &str, field: impl Fn(&str) -> Option<&'a str>) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match field(&caps[1]) {
            Some(value) => value.to_string(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Outcome of checking a website target.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChangeResult {
    /// Resolved URL
    pub url: String,
    pub selector: String,
    pub title: String,

    /// `true` iff `text_previous != Some(text_current)`
    pub has_changed: bool,

    /// Previously stored text, `None` on first sight
    pub text_previous: Option<String>,
    pub text_current: String,
}

impl ChangeResult {
    /// Whether this result should reach users.
    ///
    /// The first observation of a target only establishes a baseline and
    /// never notifies.
    pub fn should_notify(&self) -> bool {
        self.has_changed && self.text_previous.is_some()
    }

    /// Format for display using a template.
    ///
    /// Supported placeholders: `{title}`, `{url}`, `{selector}`.
    pub fn format(&self, template: &str) -> String {
        fill_template(template, |name| match name {
            "title" => Some(self.title.as_str()),
            "url" => Some(self.url.as_str()),
            "selector" => Some(self.selector.as_str()),
            _ => None,
        })
    }
}

/// A new feed entry that matched one of the keywords.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatchResult {
    /// Entry URL
    pub url: String,
    pub feed_url: String,
    pub selector: String,
    pub title: String,
    pub matched_keyword: String,
}

impl MatchResult {
    /// Format for display using a template.
    ///
    /// Supported placeholders: `{title}`, `{url}`, `{feed_url}`,
    /// `{selector}`, `{matched_keyword}`.
    pub fn format(&self, template: &str) -> String {
        fill_template(template, |name| match name {
            "title" => Some(self.title.as_str()),
            "url" => Some(self.url.as_str()),
            "feed_url" => Some(self.feed_url.as_str()),
            "selector" => Some(self.selector.as_str()),
            "matched_keyword" => Some(self.matched_keyword.as_str()),
            _ => None,
        })
    }
}

/// Envelope published on the message bus, tagged by `type`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum MonitorResult {
    #[serde(rename = "DetectWebsiteChangesResult")]
    WebsiteChange(ChangeResult),

    #[serde(rename = "DetectRSSEntryResult")]
    FeedMatch(MatchResult),
}

impl From<ChangeResult> for MonitorResult {
    fn from(result: ChangeResult) -> Self {
        Self::WebsiteChange(result)
    }
}

impl From<MatchResult> for MonitorResult {
    fn from(result: MatchResult) -> Self {
        Self::FeedMatch(result)
    }
}

/// Status message sent to the final notification topic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusMessage {
    pub status: String,
}
