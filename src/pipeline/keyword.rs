//! Keyword relevance matching for feed entries.
//!
//! Keywords are **regular expressions**, not literal strings: `"C++"` is an
//! invalid pattern and `"a.b"` also matches `"axb"`. Escape literal text with
//! [`regex::escape`] when metacharacters are not intended.

use regex::{Regex, RegexBuilder};

use crate::error::{AppError, Result};
use crate::models::FeedEntry;
use crate::services::ContentFetcher;

/// Compile keyword patterns case-insensitively, keeping their original text
/// and order.
pub fn compile_keywords(keywords: &[String]) -> Result<Vec<(String, Regex)>> {
    keywords
        .iter()
        .map(|k| {
            RegexBuilder::new(k)
                .case_insensitive(true)
                .build()
                .map(|re| (k.clone(), re))
                .map_err(|e| AppError::keyword(k, e))
        })
        .collect()
}

/// First keyword (in list order) whose pattern occurs in `text`.
pub fn first_match<'k>(text: &str, patterns: &'k [(String, Regex)]) -> Option<&'k str> {
    patterns
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map(|(keyword, _)| keyword.as_str())
}

/// Decides whether a feed entry is relevant to a keyword list.
pub struct KeywordMatcher<'a> {
    fetcher: &'a dyn ContentFetcher,
}

impl<'a> KeywordMatcher<'a> {
    pub fn new(fetcher: &'a dyn ContentFetcher) -> Self {
        Self { fetcher }
    }

    /// Return the first keyword matching the entry title, or else the text
    /// of the entry page under `selector`.
    ///
    /// The page is fetched only when no keyword matches the title.
    pub async fn matched_keyword(
        &self,
        entry: &FeedEntry,
        selector: &str,
        keywords: &[String],
    ) -> Result<Option<String>> {
        let patterns = compile_keywords(keywords)?;
        self.matched_pattern(entry, selector, &patterns).await
    }

    /// Same as [`matched_keyword`](Self::matched_keyword) over patterns
    /// already compiled with [`compile_keywords`].
    pub async fn matched_pattern(
        &self,
        entry: &FeedEntry,
        selector: &str,
        patterns: &[(String, Regex)],
    ) -> Result<Option<String>> {
        if let Some(keyword) = first_match(&entry.title, patterns) {
            log::debug!("Title of {} matched '{}'", entry.url, keyword);
            return Ok(Some(keyword.to_string()));
        }

        let page = self.fetcher.fetch(&entry.url, selector).await?;
        let matched = first_match(&page.text, patterns).map(str::to_string);
        log::debug!("Body of {} matched {:?}", entry.url, matched);
        Ok(matched)
    }
}
