//! Local filesystem storage implementation.
//!
//! Used by the CLI for development and self-hosted runs. Production
//! deployments should use `S3Storage`.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! ├── {website_key}.rev            # Last seen text
//! ├── {feed_key}.rev               # Feed marker (empty)
//! └── {feed_key}/
//!     └── {entry_key}.rev          # Entry marker (empty)
//! ```
//!
//! The `.rev` suffix lets a feed marker file sit next to the directory
//! holding its entry markers.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::storage::{FingerprintStore, RevisionKey};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Get the full path for a revision key.
    fn path(&self, key: &RevisionKey) -> PathBuf {
        self.root_dir.join(format!("{}.rev", key))
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::storage(format!("{}: {e}", parent.display())))?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, path: &PathBuf, bytes: &[u8]) -> std::io::Result<()> {
        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, path).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, path: &PathBuf) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::storage(format!("{}: {e}", path.display()))),
        }
    }
}

#[async_trait]
impl FingerprintStore for LocalStorage {
    async fn exists(&self, key: &RevisionKey) -> Result<bool> {
        let path = self.path(key);
        tokio::fs::try_exists(&path)
            .await
            .map_err(|e| AppError::storage(format!("{}: {e}", path.display())))
    }

    async fn read(&self, key: &RevisionKey) -> Result<Option<String>> {
        let path = self.path(key);
        match self.read_bytes(&path).await? {
            Some(bytes) => String::from_utf8(bytes).map(Some).map_err(|e| {
                AppError::storage(format!("{} is not valid UTF-8: {e}", path.display()))
            }),
            None => Ok(None),
        }
    }

    async fn write(&self, key: &RevisionKey, value: &str) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;
        self.write_bytes(&path, value.as_bytes())
            .await
            .map_err(|e| AppError::storage(format!("{}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let key = RevisionKey::website("https://example.com", ".price");

        storage.write(&key, "$10").await.unwrap();
        assert!(storage.exists(&key).await.unwrap());
        assert_eq!(storage.read(&key).await.unwrap(), Some("$10".to_string()));

        storage.write(&key, "$12").await.unwrap();
        assert_eq!(storage.read(&key).await.unwrap(), Some("$12".to_string()));
    }

    #[tokio::test]
    async fn test_read_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let key = RevisionKey::website("https://example.com", "body");

        assert!(storage.read(&key).await.unwrap().is_none());
        assert!(!storage.exists(&key).await.unwrap());
    }

    #[tokio::test]
    async fn test_feed_marker_beside_entry_markers() {
        let tmp = TempDir::new().unwrap();
        let storage = LocalStorage::new(tmp.path());
        let feed = RevisionKey::feed("https://example.com/rss", None);
        let entry = RevisionKey::feed("https://example.com/rss", Some("https://example.com/a"));

        storage.write(&entry, "").await.unwrap();
        storage.write(&feed, "").await.unwrap();

        assert!(storage.exists(&feed).await.unwrap());
        assert!(storage.exists(&entry).await.unwrap());
        assert_eq!(storage.read(&feed).await.unwrap(), Some(String::new()));
    }

    #[tokio::test]
    async fn test_unreadable_root_is_storage_error() {
        let tmp = TempDir::new().unwrap();
        let file_root = tmp.path().join("not-a-dir");
        std::fs::write(&file_root, b"x").unwrap();

        let storage = LocalStorage::new(&file_root);
        let key = RevisionKey::website("https://example.com", "body");
        assert!(matches!(
            storage.write(&key, "text").await,
            Err(AppError::Storage(_))
        ));
    }
}
