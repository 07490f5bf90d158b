//! Task scheduler: fans configured targets out as check events.

use crate::models::Config;
use crate::services::{Notifier, notify};

/// Topics the scheduler publishes check events to.
#[derive(Debug, Clone, Default)]
pub struct ScheduleTopics {
    pub website: String,
    /// Feed checks are skipped when unset.
    pub feed: Option<String>,
}

/// Publish one check event per configured target.
///
/// Returns the number of events published successfully.
pub async fn schedule_checks(
    config: &Config,
    notifier: &dyn Notifier,
    topics: &ScheduleTopics,
) -> usize {
    let mut published = 0;

    for target in &config.site_targets {
        if notify(notifier, &topics.website, target).await {
            published += 1;
        }
    }

    match &topics.feed {
        Some(topic) => {
            for event in config.feed_events() {
                if notify(notifier, topic, &event).await {
                    published += 1;
                }
            }
        }
        None if !config.rss_targets.is_empty() => {
            log::warn!(
                "No feed topic configured; skipping {} feed targets",
                config.rss_targets.len()
            );
        }
        None => {}
    }

    log::info!("Scheduled {} checks", published);
    published
}
