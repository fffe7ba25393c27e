//! Durable storage for captured output files.
use std::fmt;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Reference to a stored artifact, e.g. `file:///home/me/.ollama-task/storage/<run>/out.txt`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StorageUri(String);

impl StorageUri {
    pub fn from_path(path: &Path) -> Self {
        Self(format!("file://{}", path.display()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The local path behind a `file://` uri.
    pub fn to_path(&self) -> Option<PathBuf> {
        self.0.strip_prefix("file://").map(PathBuf::from)
    }
}

impl fmt::Display for StorageUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[async_trait]
pub trait Storage: Send + Sync {
    /// Copies `local` into storage under `run_id/name`.
    async fn put_file(&self, run_id: &str, name: &str, local: &Path) -> anyhow::Result<StorageUri>;

    /// Size in bytes of a stored artifact, `None` when it does not exist.
    async fn size(&self, uri: &StorageUri) -> anyhow::Result<Option<u64>>;
}
