// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use scraper::{Html, Selector};

use crate::error::{AppError, Result};
use crate::models::FetcherConfig;

/// Create a configured asynchronous HTTP client.
///
/// Redirects are followed; callers read the final URL from the response.
pub fn create_async_client(config: &FetcherConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Fetch a page, failing on non-success status codes.
///
/// Returns the final URL after redirects together with the body.
pub async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<(String, String)> {
    let response = client.get(url).send().await?.error_for_status()?;
    let final_url = response.url().to_string();
    let text = response.text().await?;
    Ok((final_url, text))
}

/// Fetch raw bytes, failing on non-success status codes.
pub async fn fetch_bytes(client: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
    let response = client.get(url).send().await?.error_for_status()?;
    Ok(response.bytes().await?.to_vec())
}

/// Parse a CSS selector.
pub fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Parse an HTML document.
pub fn parse_document(html: &str) -> Html {
    Html::parse_document(html)
}
