// src/models/mod.rs

//! Domain models for the monitor.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod content;
mod result;
mod target;

// Re-export all public types
pub use config::{Config, FetcherConfig, MessageFormat};
pub use content::{FeedEntry, FetchedContent};
pub use result::{ChangeResult, MatchResult, MonitorResult, StatusMessage};
pub use target::{FeedCheckEvent, FeedTarget, WebsiteTarget};
