//! File-backed image directory.
//!
//! One file per source name under a base directory. A file's modification
//! time is the staleness token for everything rendered from it.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::error::StorageError;

/// Named blob storage for source images.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Read a source's bytes.
    async fn read(&self, name: &str) -> Result<Bytes, StorageError>;

    /// Create or replace a source.
    async fn write(&self, name: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a source.
    async fn delete(&self, name: &str) -> Result<(), StorageError>;

    /// Modification time of a source.
    async fn mod_time(&self, name: &str) -> Result<SystemTime, StorageError>;

    /// Names of sources last modified more than `min_age` ago, sorted.
    async fn list(&self, min_age: Duration) -> Result<Vec<String>, StorageError>;

    /// Duplicate `src` under `dst`.
    async fn copy(&self, src: &str, dst: &str) -> Result<(), StorageError> {
        let data = self.read(src).await?;
        self.write(dst, &data).await
    }
}

/// [`Directory`] over a local filesystem directory.
#[derive(Debug, Clone)]
pub struct FsDirectory {
    base: PathBuf,
}

impl FsDirectory {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base_path(&self) -> &Path {
        &self.base
    }

    /// Maps a name to its file, rejecting anything that could escape the
    /// base directory or collide with temporary files.
    fn path(&self, name: &str) -> Result<PathBuf, StorageError> {
        validate_name(name)?;
        Ok(self.base.join(name))
    }
}

/// Checks that `name` is a plain file name.
pub fn validate_name(name: &str) -> Result<(), StorageError> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\', '\0']);
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidName(name.to_string()))
    }
}

fn not_found(name: &str, err: std::io::Error) -> StorageError {
    if err.kind() == ErrorKind::NotFound {
        StorageError::NotFound(name.to_string())
    } else {
        StorageError::Io(err)
    }
}

#[async_trait]
impl Directory for FsDirectory {
    async fn read(&self, name: &str) -> Result<Bytes, StorageError> {
        let path = self.path(name)?;
        let data = tokio::fs::read(&path).await.map_err(|e| not_found(name, e))?;
        Ok(Bytes::from(data))
    }

    async fn write(&self, name: &str, data: &[u8]) -> Result<(), StorageError> {
        let path = self.path(name)?;
        // Write beside the target and rename so readers never see a partial file
        let staging = self.base.join(format!(".{}.partial", name));

        tokio::fs::write(&staging, data).await?;
        if let Err(err) = tokio::fs::rename(&staging, &path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(err.into());
        }

        debug!("Stored {} ({} bytes)", name, data.len());
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), StorageError> {
        let path = self.path(name)?;
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| not_found(name, e))
    }

    async fn mod_time(&self, name: &str) -> Result<SystemTime, StorageError> {
        let path = self.path(name)?;
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| not_found(name, e))?;
        if !metadata.is_file() {
            return Err(StorageError::NotFound(name.to_string()));
        }
        Ok(metadata.modified()?)
    }

    async fn list(&self, min_age: Duration) -> Result<Vec<String>, StorageError> {
        let cutoff = SystemTime::now()
            .checked_sub(min_age)
            .unwrap_or(SystemTime::UNIX_EPOCH);

        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.base).await?;
        while let Some(entry) = entries.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if validate_name(&name).is_err() {
                continue;
            }
            let metadata = entry.metadata().await?;
            if metadata.is_file() && metadata.modified()? < cutoff {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }
}
