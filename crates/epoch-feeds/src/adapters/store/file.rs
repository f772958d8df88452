//! Chunk store on the local filesystem.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::domain::{Address, StoreError};
use crate::ports::ChunkStore;

/// Directory-backed chunk store: one file per chunk, named by hex address.
///
/// Writes go to a temporary file that is renamed into place, so a reader
/// never sees a partially written chunk.
#[derive(Debug, Clone)]
pub struct FileChunkStore {
    root: PathBuf,
}

impl FileChunkStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub async fn open<P: AsRef<Path>>(root: P) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root).await.map_err(io_error)?;
        tracing::debug!(path = %root.display(), "opened chunk directory");
        Ok(Self { root })
    }

    /// Directory holding the chunks.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, address: &Address) -> PathBuf {
        self.root.join(address.to_hex())
    }
}

/// Distinguishes temporary files of concurrent saves within this process.
static TEMP_SEQUENCE: AtomicU64 = AtomicU64::new(0);

fn io_error(e: std::io::Error) -> StoreError {
    StoreError::Io {
        message: e.to_string(),
    }
}

#[async_trait]
impl ChunkStore for FileChunkStore {
    async fn load(&self, address: &Address) -> Result<Option<Vec<u8>>, StoreError> {
        match tokio::fs::read(self.path_for(address)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(e)),
        }
    }

    async fn save(&self, address: &Address, bytes: &[u8]) -> Result<(), StoreError> {
        let target = self.path_for(address);
        let sequence = TEMP_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        let temp = self.root.join(format!(
            ".{}.{}.{}.tmp",
            address.to_hex(),
            std::process::id(),
            sequence
        ));

        let mut file = tokio::fs::File::create(&temp).await.map_err(io_error)?;
        file.write_all(bytes).await.map_err(io_error)?;
        file.sync_all().await.map_err(io_error)?;
        drop(file);

        tokio::fs::rename(&temp, &target).await.map_err(io_error)
    }
}
