//! Asset storage for uploaded cover images

use async_trait::async_trait;
use std::path::PathBuf;

use crate::domain::DomainError;

/// Where an uploaded asset ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAsset {
    /// Storage path relative to the asset root, e.g. `covers/{uuid}.jpg`
    pub path: String,
    pub public_url: String,
    pub content_type: String,
}

#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Store `bytes` at `path` and return the asset's public URL.
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredAsset, DomainError>;
}

/// Writes assets to a directory that the HTTP server exposes under `/assets`.
pub struct LocalAssetStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalAssetStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }

    pub fn public_url(&self, path: &str) -> String {
        format!(
            "{}/assets/{}",
            self.public_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl AssetStore for LocalAssetStore {
    async fn put(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<StoredAsset, DomainError> {
        if path.split('/').any(|part| part == "..") {
            return Err(DomainError::Storage(format!("invalid asset path: {}", path)));
        }

        let target = self.root.join(path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DomainError::Storage(format!("Failed to create {:?}: {}", parent, e)))?;
        }

        let len = bytes.len();
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|e| DomainError::Storage(format!("Failed to write {:?}: {}", target, e)))?;

        tracing::info!("Stored asset {} ({} bytes, {})", path, len, content_type);

        Ok(StoredAsset {
            path: path.to_string(),
            public_url: self.public_url(path),
            content_type: content_type.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_writes_file_and_derives_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalAssetStore::new(dir.path(), "http://localhost:8000/");

        let stored = store
            .put("covers/abc.jpg", vec![0xFF, 0xD8, 0xFF], "image/jpeg")
            .await
            .unwrap();

        assert_eq!(stored.public_url, "http://localhost:8000/assets/covers/abc.jpg");
        assert_eq!(stored.content_type, "image/jpeg");
        let written = std::fs::read(dir.path().join("covers/abc.jpg")).unwrap();
        assert_eq!(written, vec![0xFF, 0xD8, 0xFF]);
    }

    #[tokio::test]
    async fn test_put_rejects_parent_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalAssetStore::new(dir.path(), "http://localhost:8000");

        let err = store
            .put("../escape.jpg", vec![1], "image/jpeg")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Storage(_)));
    }
}
