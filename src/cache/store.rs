//! Cache Store Module
//!
//! Maps cache keys to PNG files under a cache root directory.
//!
//! Files only ever appear through an atomic rename from a temporary file in
//! the same directory, so readers and the evictor never see a partial image.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::CacheKey;
use crate::error::{RenderError, Result};

/// Prefix of in-progress writes inside the cache root
pub const TEMP_PREFIX: &str = ".tmp_";

// == Cache Store ==
/// On-disk render cache rooted at a single directory.
#[derive(Debug, Clone)]
pub struct CacheStore {
    /// Cache root directory
    root: Arc<PathBuf>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a store rooted at `root`. Does not touch the filesystem.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Arc::new(root.into()),
        }
    }

    /// Cache root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Deterministic path of the entry for `key`.
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.root.join(key.file_name())
    }

    // == Ensure Directory ==
    /// Creates the cache root if it is missing. Idempotent.
    pub async fn ensure_dir(&self) -> io::Result<()> {
        if tokio::fs::metadata(self.root.as_path()).await.is_ok() {
            return Ok(());
        }
        tokio::fs::create_dir_all(self.root.as_path()).await?;
        info!("Created cache directory: {}", self.root.display());
        Ok(())
    }

    // == Lookup ==
    /// Returns the stored image for `key`, or `None` if there is no entry.
    ///
    /// Does not look at the entry's age; expiry is the evictor's concern.
    /// An entry deleted between the existence check and the read counts as
    /// a miss.
    pub async fn lookup(&self, key: &CacheKey) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RenderError::Internal(format!(
                "reading {}: {}",
                path.display(),
                e
            ))),
        }
    }

    // == Store ==
    /// Writes `bytes` as the entry for `key`.
    ///
    /// The image is written to a temporary file in the cache root and then
    /// renamed into place. On failure the temporary file is removed and any
    /// previously stored entry is left untouched.
    pub async fn store(&self, key: &CacheKey, bytes: &[u8]) -> Result<PathBuf> {
        let root = Arc::clone(&self.root);
        let target = self.path_for(key);
        let data = bytes.to_vec();
        let dest = target.clone();

        tokio::task::spawn_blocking(move || write_atomic(&root, &dest, &data))
            .await
            .map_err(|e| RenderError::Internal(format!("store task failed: {}", e)))?
            .map_err(|e| RenderError::CacheWrite(format!("{}: {}", target.display(), e)))?;

        debug!("Stored cache entry {}", target.display());
        Ok(target)
    }

    // == Length ==
    /// Number of regular files currently in the cache root.
    pub async fn len(&self) -> io::Result<usize> {
        let mut entries = tokio::fs::read_dir(self.root.as_path()).await?;
        let mut count = 0;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                count += 1;
            }
        }
        Ok(count)
    }
}

/// Writes through a named temporary file and renames it over `dest`.
fn write_atomic(root: &Path, dest: &Path, data: &[u8]) -> io::Result<()> {
    let mut tmp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(".png")
        .tempfile_in(root)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|e| e.error)?;
    Ok(())
}
