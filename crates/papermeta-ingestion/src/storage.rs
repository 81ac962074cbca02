//! Durable storage for uploaded PDFs, one file per document id.

use std::path::{Path, PathBuf};

use papermeta_common::Result;

#[derive(Debug, Clone)]
pub struct UploadStorage {
    root: PathBuf,
}

impl UploadStorage {
    /// Open the upload directory, creating it if needed.
    pub async fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, id: &str) -> PathBuf {
        self.root.join(format!("{id}.pdf"))
    }

    /// Write the raw upload for `id` and return where it landed.
    pub async fn save(&self, id: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path_for(id);
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!(id, path = %path.display(), bytes = bytes.len(), "Stored upload");
        Ok(path)
    }
}
