// src/services/sns.rs

//! Amazon SNS notifier.

use async_trait::async_trait;
use aws_sdk_sns::Client;
use tracing::info;

use crate::error::{AppError, Result};
use crate::services::Notifier;

/// Publishes JSON messages to SNS topic ARNs.
#[derive(Clone)]
pub struct SnsNotifier {
    client: Client,
}

impl SnsNotifier {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Create a notifier from the default AWS configuration chain.
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config))
    }
}

#[async_trait]
impl Notifier for SnsNotifier {
    async fn publish(&self, topic: &str, payload: &serde_json::Value) -> Result<Option<String>> {
        let message = serde_json::to_string(payload)?;
        let output = self
            .client
            .publish()
            .topic_arn(topic)
            .message(message)
            .send()
            .await
            .map_err(|e| AppError::notify(topic, e.into_service_error()))?;

        let message_id = output.message_id().map(str::to_string);
        info!(topic = %topic, message_id = ?message_id, "Published message");
        Ok(message_id)
    }
}
