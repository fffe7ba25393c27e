use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;
use ollama_task_core::api::{Storage, StorageUri};

/// Stores artifacts under `root/<run_id>/<name>`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put_file(&self, run_id: &str, name: &str, local: &Path) -> Result<StorageUri> {
        let dest = self.root.join(run_id).join(name);
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::copy(local, &dest)
            .await
            .map_err(|e| anyhow::anyhow!("failed to store {}: {}", local.display(), e))?;
        Ok(StorageUri::from_path(&dest))
    }

    async fn size(&self, uri: &StorageUri) -> Result<Option<u64>> {
        let Some(path) = uri.to_path() else {
            return Ok(None);
        };
        match tokio::fs::metadata(&path).await {
            Ok(meta) => Ok(Some(meta.len())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
