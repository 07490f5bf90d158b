// src/services/browser.rs

//! Headless-browser content fetcher.
//!
//! Renders JavaScript before reading the selector, for pages whose watched
//! content is built client-side. Launching Chromium is expensive, so one
//! session is meant to be created once and reused through
//! [`crate::context::MonitorContext`].

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::error::{AppError, Result};
use crate::models::FetchedContent;
use crate::services::ContentFetcher;
use crate::utils::normalize_whitespace;

/// Interval between selector lookups while waiting for it to appear.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Chromium session driven over the DevTools protocol.
pub struct BrowserFetcher {
    browser: Browser,
    handler: JoinHandle<()>,
    timeout: Duration,
}

impl BrowserFetcher {
    /// Launch headless Chromium. `timeout` bounds the wait for a selector.
    ///
    /// `CHROME_BIN` overrides the binary lookup done by `chromiumoxide`.
    pub async fn launch(timeout: Duration) -> Result<Self> {
        let mut builder = BrowserConfig::builder().no_sandbox();
        if let Ok(bin) = std::env::var("CHROME_BIN") {
            builder = builder.chrome_executable(bin);
        }

        let config = builder
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-application-cache")
            .arg("--disable-popup-blocking")
            .arg("--hide-scrollbars")
            .arg("--ignore-certificate-errors")
            .build()
            .map_err(|e| AppError::config(format!("Browser config error: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| AppError::config(format!("Failed to launch browser: {e}")))?;

        // The CDP handler must be polled continuously for the connection to work.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    log::warn!("Browser CDP handler error: {:?}", event);
                    break;
                }
            }
        });

        Ok(Self {
            browser,
            handler,
            timeout,
        })
    }

    async fn read_page(&self, page: &Page, url: &str, selector: &str) -> Result<FetchedContent> {
        let deadline = tokio::time::Instant::now() + self.timeout;
        let element = loop {
            match page.find_element(selector).await {
                Ok(element) => break element,
                Err(_) if tokio::time::Instant::now() < deadline => {
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
                Err(_) => return Err(AppError::resolution(url, selector)),
            }
        };

        let text = element
            .inner_text()
            .await
            .map_err(|e| AppError::network(url, e))?
            .unwrap_or_default();
        let final_url = page
            .url()
            .await
            .map_err(|e| AppError::network(url, e))?
            .unwrap_or_else(|| url.to_string());
        let title = page
            .get_title()
            .await
            .map_err(|e| AppError::network(url, e))?
            .unwrap_or_default();

        Ok(FetchedContent {
            url: final_url,
            title: normalize_whitespace(&title),
            selector: selector.to_string(),
            text: text.trim().to_string(),
        })
    }
}

#[async_trait]
impl ContentFetcher for BrowserFetcher {
    async fn fetch(&self, url: &str, selector: &str) -> Result<FetchedContent> {
        log::debug!("Rendering {} ({})", url, selector);
        let page = self
            .browser
            .new_page(url)
            .await
            .map_err(|e| AppError::network(url, e))?;

        let result = self.read_page(&page, url, selector).await;

        if let Err(e) = page.close().await {
            log::debug!("Failed to close tab for {}: {}", url, e);
        }
        result
    }

    /// Close the browser and stop the CDP handler.
    async fn close(&mut self) -> Result<()> {
        let closed = self.browser.close().await;
        if let Err(e) = self.browser.wait().await {
            log::debug!("Browser process did not exit cleanly: {}", e);
        }
        self.handler.abort();
        closed
            .map(|_| ())
            .map_err(|e| AppError::config(format!("Failed to close browser: {e}")))
    }
}
