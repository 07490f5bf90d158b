// src/services/notifier.rs

//! Event notifier: publishes result payloads to a message-bus topic.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;

/// Publishes JSON payloads to named topics.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Publish one message. Returns the bus-assigned message id if any.
    async fn publish(&self, topic: &str, payload: &serde_json::Value) -> Result<Option<String>>;
}

/// Serialize `payload` and publish it, logging instead of failing.
///
/// Publishing is fire-and-forget for the detectors: the fingerprint store
/// already reflects the new state, so a lost message is not retried here.
/// Returns whether the publish succeeded.
pub async fn notify<T: Serialize>(notifier: &dyn Notifier, topic: &str, payload: &T) -> bool {
    let value = match serde_json::to_value(payload) {
        Ok(value) => value,
        Err(e) => {
            log::error!("Failed to serialize message for {}: {}", topic, e);
            return false;
        }
    };

    match notifier.publish(topic, &value).await {
        Ok(message_id) => {
            log::info!(
                "Published to {} (message_id={})",
                topic,
                message_id.as_deref().unwrap_or("-")
            );
            true
        }
        Err(e) => {
            log::error!("Failed to publish to {}: {}", topic, e);
            false
        }
    }
}

/// Notifier that only writes messages to the log. Used by the CLI.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn publish(&self, topic: &str, payload: &serde_json::Value) -> Result<Option<String>> {
        log::info!("[{}] {}", topic, payload);
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::RecordingNotifier;

    #[tokio::test]
    async fn test_notify_records_payload() {
        let notifier = RecordingNotifier::new();
        let ok = notify(&notifier, "topic", &serde_json::json!({"status": "hi"})).await;

        assert!(ok);
        let published = notifier.published();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, "topic");
        assert_eq!(published[0].1["status"], "hi");
    }

    #[tokio::test]
    async fn test_notify_swallows_publish_failure() {
        let notifier = RecordingNotifier::failing();
        let ok = notify(&notifier, "topic", &serde_json::json!({})).await;
        assert!(!ok);
    }

    #[tokio::test]
    async fn test_log_notifier() {
        let id = LogNotifier
            .publish("topic", &serde_json::json!({"a": 1}))
            .await
            .unwrap();
        assert!(id.is_none());
    }
}
