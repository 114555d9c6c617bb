//! Blob storage for artwork images and payment proofs.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;

use crate::config::AppConfig;

/// Accepts a named upload into a bucket and returns a publicly
/// resolvable URL for it.
#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    async fn put(
        &self,
        bucket: &str,
        name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String>;
}

/// Writes blobs under a root directory. The server exposes that root at
/// `/storage`, so the returned URL is `<public_base>/<bucket>/<name>`.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
    public_base: String,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into(),
        }
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(
        &self,
        bucket: &str,
        name: &str,
        _content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String> {
        let dir = self.root.join(bucket);
        fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("create storage dir {}", dir.display()))?;

        let path = dir.join(name);
        fs::write(&path, bytes)
            .await
            .with_context(|| format!("write blob {}", path.display()))?;

        Ok(format!(
            "{}/{}/{}",
            self.public_base.trim_end_matches('/'),
            bucket,
            name
        ))
    }
}

/// In-memory store for tests and for running without a writable disk.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, (String, Vec<u8>)>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, bucket: &str, name: &str) -> Option<Vec<u8>> {
        let blobs = self.blobs.lock().ok()?;
        blobs.get(&format!("{bucket}/{name}")).map(|(_, b)| b.clone())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(
        &self,
        bucket: &str,
        name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String> {
        let key = format!("{bucket}/{name}");
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|_| anyhow::anyhow!("blob store poisoned"))?;
        blobs.insert(key.clone(), (content_type.to_string(), bytes));
        Ok(format!("memory://{key}"))
    }
}

/// Extension for a stored blob name, taken from the uploaded file name.
pub fn file_ext(file_name: Option<&str>) -> String {
    file_name
        .and_then(|n| n.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| "bin".to_string())
}

/// Pick the backend from configuration. Unknown modes fall back to the
/// filesystem store.
pub fn from_config(config: &AppConfig) -> Arc<dyn BlobStore> {
    match config.storage_mode.as_str() {
        "memory" => {
            tracing::info!(mode = "memory", "storage initialized");
            Arc::new(MemoryBlobStore::new())
        }
        mode => {
            if mode != "fs" {
                tracing::warn!(mode = %mode, "unknown STORAGE_MODE, using fs");
            }
            tracing::info!(root = %config.storage_root, "storage initialized");
            Arc::new(FsBlobStore::new(
                config.storage_root.clone(),
                config.public_base_url.clone(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[tokio::test]
    async fn fs_store_persists_bytes_and_builds_the_url() {
        let root = std::env::temp_dir().join(format!("atelier-blobs-{}", Uuid::new_v4()));
        let store = FsBlobStore::new(&root, "http://localhost:3000/storage");

        let url = store
            .put("proofs", "receipt.png", "image/png", vec![1, 2, 3])
            .await
            .unwrap();
        assert_eq!(url, "http://localhost:3000/storage/proofs/receipt.png");

        let on_disk = tokio::fs::read(root.join("proofs/receipt.png")).await.unwrap();
        assert_eq!(on_disk, vec![1, 2, 3]);

        tokio::fs::remove_dir_all(&root).await.unwrap();
    }

    #[test]
    fn file_ext_comes_from_the_file_name() {
        assert_eq!(file_ext(Some("receipt.PNG")), "png");
        assert_eq!(file_ext(Some("archive.tar.gz")), "gz");
        assert_eq!(file_ext(Some("receipt")), "bin");
        assert_eq!(file_ext(Some("receipt.")), "bin");
        assert_eq!(file_ext(None), "bin");
    }

    #[tokio::test]
    async fn memory_store_keeps_blobs_addressable() {
        let store = MemoryBlobStore::new();
        let url = store
            .put("artworks", "a.jpg", "image/jpeg", vec![9, 9])
            .await
            .unwrap();
        assert_eq!(url, "memory://artworks/a.jpg");
        assert_eq!(store.get("artworks", "a.jpg"), Some(vec![9, 9]));
        assert!(store.get("artworks", "missing.jpg").is_none());
    }
}
