// src/error.rs

//! Unified error handling for the monitor.

use std::fmt;

use thiserror::Error;

/// Result type alias for monitor operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Fingerprint store backend failed (not the same as a missing key)
    #[error("Storage unavailable: {0}")]
    Storage(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Resource could not be reached (non-HTTP transports)
    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    /// Selector was never found on the fetched page
    #[error("Selector '{selector}' not found on {url}")]
    Resolution { url: String, selector: String },

    /// Feed content could not be parsed
    #[error("Feed parse error for {feed_url}: {message}")]
    FeedParse { feed_url: String, message: String },

    /// Keyword is not a valid regular expression
    #[error("Invalid keyword pattern '{pattern}': {message}")]
    Keyword { pattern: String, message: String },

    /// Publishing to the message bus failed
    #[error("Notify error on {topic}: {message}")]
    Notify { topic: String, message: String },

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Coarse classification used by the scheduling layer for alerting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    StorageUnavailable,
    FetchFailure,
    ParseFailure,
    Other,
}

impl AppError {
    /// Create a storage backend error.
    pub fn storage(message: impl fmt::Display) -> Self {
        Self::Storage(message.to_string())
    }

    /// Create a network error for a URL.
    pub fn network(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Network {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a selector resolution error.
    pub fn resolution(url: impl Into<String>, selector: impl Into<String>) -> Self {
        Self::Resolution {
            url: url.into(),
            selector: selector.into(),
        }
    }

    /// Create a feed parse error.
    pub fn feed_parse(feed_url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::FeedParse {
            feed_url: feed_url.into(),
            message: message.to_string(),
        }
    }

    /// Create an invalid keyword error.
    pub fn keyword(pattern: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Keyword {
            pattern: pattern.into(),
            message: message.to_string(),
        }
    }

    /// Create a publish error.
    pub fn notify(topic: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Notify {
            topic: topic.into(),
            message: message.to_string(),
        }
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Storage(_) => ErrorKind::StorageUnavailable,
            Self::Http(_) | Self::Network { .. } | Self::Resolution { .. } => {
                ErrorKind::FetchFailure
            }
            Self::FeedParse { .. } => ErrorKind::ParseFailure,
            _ => ErrorKind::Other,
        }
    }
}
