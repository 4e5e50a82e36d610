// src/mirror/storage.rs
// =============================================================================
// The storage capability: create directories, write mirrored files, and read
// stored HTML back for link extraction.
//
// The trait is the seam tests use to inject failing storage; LocalStorage is
// the real thing, backed by tokio::fs.
// =============================================================================

use std::path::Path;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{MirrorError, Result};

#[async_trait]
pub trait Storage: Send + Sync {
    /// Creates `dir` and any missing parents. Succeeds if it already exists.
    async fn ensure_dir(&self, dir: &Path) -> Result<()>;

    /// Creates or truncates `path` and writes `bytes` to it.
    async fn write_file(&self, path: &Path, bytes: &[u8]) -> Result<()>;

    /// Reads a previously written file.
    async fn read_file(&self, path: &Path) -> Result<Vec<u8>>;
}

/// Plain local filesystem storage.
///
/// Writes go straight to the target path; a failed write may leave a partial
/// file behind, which is never cleaned up.
#[derive(Debug, Clone, Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn ensure_dir(&self, dir: &Path) -> Result<()> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| MirrorError::storage(dir, e))
    }

    async fn write_file(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let mut file = tokio::fs::File::create(path)
            .await
            .map_err(|e| MirrorError::storage(path, e))?;
        file.write_all(bytes)
            .await
            .map_err(|e| MirrorError::storage(path, e))?;
        file.flush()
            .await
            .map_err(|e| MirrorError::storage(path, e))
    }

    async fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        tokio::fs::read(path)
            .await
            .map_err(|e| MirrorError::storage(path, e))
    }
}
