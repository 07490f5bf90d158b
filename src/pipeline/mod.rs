//! Pipeline entry points for monitor operations.
//!
//! - `WebsiteChangeDetector`: Compare selected page text with its last revision
//! - `FeedEntryDetector`: Find feed entries not seen before
//! - `KeywordMatcher`: Decide whether an entry is relevant
//! - `schedule_checks`: Fan configured targets out as check events
//! - `handle_result`: Render results into status messages
//! - `run_checks`: Check every configured target once

pub mod events;
pub mod feed;
pub mod keyword;
pub mod run;
pub mod schedule;
pub mod website;

pub use events::{handle_result, render_status};
pub use feed::FeedEntryDetector;
pub use keyword::KeywordMatcher;
pub use run::{RunSummary, run_checks};
pub use schedule::{ScheduleTopics, schedule_checks};
pub use website::WebsiteChangeDetector;
