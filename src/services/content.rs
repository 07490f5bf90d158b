// src/services/content.rs

//! Content fetcher: resolves a `(url, selector)` pair to observable text.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::{FetchedContent, FetcherConfig};
use crate::utils::http::{create_async_client, fetch_text, parse_document, parse_selector};
use crate::utils::normalize_whitespace;

/// Resolves a target to its current text.
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetch `url` and return the text of the first element matching
    /// `selector`.
    ///
    /// Fails with [`AppError::Resolution`] when the selector is not found
    /// and with a network error when the page is unreachable.
    async fn fetch(&self, url: &str, selector: &str) -> Result<FetchedContent>;

    /// Release resources held by the fetcher. No-op by default.
    async fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Plain HTTP fetcher. Does not execute scripts.
#[derive(Clone)]
pub struct HttpContentFetcher {
    client: Client,
}

impl HttpContentFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ContentFetcher for HttpContentFetcher {
    async fn fetch(&self, url: &str, selector: &str) -> Result<FetchedContent> {
        log::debug!("Fetching {} ({})", url, selector);
        let (final_url, html) = fetch_text(&self.client, url).await?;
        extract_content(&html, &final_url, selector)
    }
}

/// Extract title and selected text from an HTML document.
pub fn extract_content(html: &str, url: &str, selector: &str) -> Result<FetchedContent> {
    let document = parse_document(html);
    let selected = parse_selector(selector)?;
    let title_sel = parse_selector("title")?;

    let element = document
        .select(&selected)
        .next()
        .ok_or_else(|| AppError::resolution(url, selector))?;

    let title = document
        .select(&title_sel)
        .next()
        .map(|t| normalize_whitespace(&t.text().collect::<String>()))
        .unwrap_or_default();

    let text = element
        .text()
        .map(normalize_whitespace)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    Ok(FetchedContent {
        url: url.to_string(),
        title,
        selector: selector.to_string(),
        text,
    })
}
