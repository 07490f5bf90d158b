//! AWS S3 storage implementation.
//!
//! One object per revision key under `{bucket}/{prefix}/`. Website objects
//! hold the last seen text, feed objects are zero-length markers.

use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::{AppError, Result};
use crate::storage::{FingerprintStore, RevisionKey};

/// S3-based fingerprint store.
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
    prefix: String,
}

impl S3Storage {
    /// Create a new S3 storage instance.
    pub fn new(client: Client, bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            prefix: prefix.into(),
        }
    }

    /// Create S3 storage from environment configuration.
    ///
    /// Reads `WEB_MONITOR_BUCKET` (required) and `WEB_MONITOR_PREFIX`.
    pub async fn from_env() -> Result<Self> {
        let bucket = std::env::var("WEB_MONITOR_BUCKET")
            .map_err(|_| AppError::config("WEB_MONITOR_BUCKET is not set"))?;
        let prefix = std::env::var("WEB_MONITOR_PREFIX").unwrap_or_default();

        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Ok(Self::new(Client::new(&config), bucket, prefix))
    }

    /// Same bucket and client, different key prefix.
    pub fn with_prefix(&self, prefix: impl Into<String>) -> Self {
        Self {
            client: self.client.clone(),
            bucket: self.bucket.clone(),
            prefix: prefix.into(),
        }
    }

    /// Full object key for a revision key.
    fn object_key(&self, key: &str) -> String {
        let prefix = self.prefix.trim_matches('/');
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}/{}", prefix, key)
        }
    }

    /// Read raw bytes, returning `None` if the object does not exist.
    pub async fn read_bytes_optional(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let object_key = self.object_key(key);
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .send()
            .await;

        match result {
            Ok(output) => {
                let bytes = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| AppError::storage(format!("s3://{}/{}: {e}", self.bucket, object_key)))?;
                Ok(Some(bytes.into_bytes().to_vec()))
            }
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    debug!(bucket = %self.bucket, key = %object_key, "No object");
                    Ok(None)
                } else {
                    Err(AppError::storage(format!(
                        "s3://{}/{}: {}",
                        self.bucket, object_key, service_err
                    )))
                }
            }
        }
    }
}

#[async_trait]
impl FingerprintStore for S3Storage {
    async fn exists(&self, key: &RevisionKey) -> Result<bool> {
        let object_key = self.object_key(key.as_str());
        let result = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_not_found() {
                    Ok(false)
                } else {
                    Err(AppError::storage(format!(
                        "s3://{}/{}: {}",
                        self.bucket, object_key, service_err
                    )))
                }
            }
        }
    }

    async fn read(&self, key: &RevisionKey) -> Result<Option<String>> {
        match self.read_bytes_optional(key.as_str()).await? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| AppError::storage(format!("revision {key} is not valid UTF-8: {e}"))),
            None => Ok(None),
        }
    }

    async fn write(&self, key: &RevisionKey, value: &str) -> Result<()> {
        let object_key = self.object_key(key.as_str());
        let bytes = ByteStream::from(value.as_bytes().to_vec());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&object_key)
            .body(bytes)
            .content_encoding("utf-8")
            .content_type("text/plain")
            .send()
            .await
            .map_err(|e| {
                AppError::storage(format!("s3://{}/{}: {e}", self.bucket, object_key))
            })?;

        info!(bucket = %self.bucket, key = %object_key, bytes = value.len(), "Wrote revision");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(prefix: &str) -> S3Storage {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new("us-east-1"))
            .build();
        S3Storage::new(Client::from_conf(config), "bucket", prefix)
    }

    #[test]
    fn test_object_key_prefix() {
        assert_eq!(storage("").object_key("abc"), "abc");
        assert_eq!(storage("revisions/").object_key("abc"), "revisions/abc");
        assert_eq!(storage("/a/b/").with_prefix("c").object_key("abc"), "c/abc");
    }
}
