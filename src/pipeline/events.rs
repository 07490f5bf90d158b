//! Turns detector results into user-facing status messages.

use crate::models::{MessageFormat, MonitorResult, StatusMessage};
use crate::services::{Notifier, notify};

/// Render the status message for a result.
///
/// Website results that do not pass the notification gate produce nothing.
pub fn render_status(result: &MonitorResult, format: &MessageFormat) -> Option<StatusMessage> {
    let rendered = match result {
        MonitorResult::WebsiteChange(change) => {
            if !change.should_notify() {
                return None;
            }
            change.format(&format.site_template)
        }
        MonitorResult::FeedMatch(matched) => matched.format(&format.rss_template),
    };

    Some(StatusMessage {
        status: rendered.trim_matches('"').to_string(),
    })
}

/// Render a result and publish it to the status topic.
///
/// Returns the rendered message, whether or not the publish succeeded.
pub async fn handle_result(
    result: &MonitorResult,
    format: &MessageFormat,
    notifier: &dyn Notifier,
    status_topic: &str,
) -> Option<StatusMessage> {
    let message = render_status(result, format)?;
    notify(notifier, status_topic, &message).await;
    Some(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChangeResult, MatchResult};
    use crate::testutil::RecordingNotifier;

    fn change(previous: Option<&str>, current: &str) -> MonitorResult {
        ChangeResult {
            url: "https://example.com".into(),
            selector: ".price".into(),
            title: "Example".into(),
            has_changed: previous != Some(current),
            text_previous: previous.map(str::to_string),
            text_current: current.into(),
        }
        .into()
    }

    fn matched() -> MonitorResult {
        MatchResult {
            url: "https://example.com/a".into(),
            feed_url: "https://example.com/rss".into(),
            selector: "article".into(),
            title: "Market Rally".into(),
            matched_keyword: "Rally".into(),
        }
        .into()
    }

    #[test]
    fn test_website_change_uses_site_template() {
        let status = render_status(&change(Some("$10"), "$12"), &MessageFormat::default());
        assert_eq!(
            status.unwrap().status,
            "Example has been updated https://example.com"
        );
    }

    #[test]
    fn test_gate_blocks_first_sight_and_unchanged() {
        let format = MessageFormat::default();
        assert!(render_status(&change(None, "$10"), &format).is_none());
        assert!(render_status(&change(Some("$10"), "$10"), &format).is_none());
    }

    #[test]
    fn test_feed_match_uses_rss_template() {
        let format = MessageFormat {
            rss_template: "{matched_keyword}: {title} ({feed_url} {selector}) {url}".into(),
            ..MessageFormat::default()
        };
        let status = render_status(&matched(), &format).unwrap();
        assert_eq!(
            status.status,
            "Rally: Market Rally (https://example.com/rss article) https://example.com/a"
        );
    }

    #[test]
    fn test_strips_surrounding_quotes() {
        let format = MessageFormat {
            rss_template: "\"{title}\"".into(),
            ..MessageFormat::default()
        };
        assert_eq!(render_status(&matched(), &format).unwrap().status, "Market Rally");
    }

    #[tokio::test]
    async fn test_handle_result_publishes_status() {
        let notifier = RecordingNotifier::new();
        let message = handle_result(&matched(), &MessageFormat::default(), &notifier, "status")
            .await
            .unwrap();

        let published = notifier.on_topic("status");
        assert_eq!(published.len(), 1);
        assert_eq!(published[0]["status"], message.status);
    }

    #[tokio::test]
    async fn test_handle_result_skips_gated_change() {
        let notifier = RecordingNotifier::new();
        let message =
            handle_result(&change(None, "$10"), &MessageFormat::default(), &notifier, "status")
                .await;
        assert!(message.is_none());
        assert!(notifier.published().is_empty());
    }
}
