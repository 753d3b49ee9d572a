//! Advisory lock around a load → upsert → save sequence.

use crate::error::{Result, StoreError};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Exclusive OS advisory lock on `<store file>.lock`, released on drop.
///
/// Only cooperating processes that also take the lock are excluded.
#[derive(Debug)]
pub struct StoreLock {
    file: File,
    path: PathBuf,
}

impl StoreLock {
    /// Takes the lock without waiting. A held lock is reported as [`StoreError::Locked`].
    pub fn acquire(store_path: &Path) -> Result<Self> {
        let path = lock_path(store_path);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|source| StoreError::Lock {
                path: path.clone(),
                source,
            })?;

        file.try_lock_exclusive()
            .map_err(|e| lock_error(&path, e))?;

        tracing::debug!("Acquired store lock {}", path.display());
        Ok(Self { file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Contention becomes [`StoreError::Locked`]; anything else (ENOLCK, EINTR) keeps its cause.
fn lock_error(path: &Path, e: io::Error) -> StoreError {
    if e.kind() == fs2::lock_contended_error().kind() {
        StoreError::Locked {
            path: path.to_path_buf(),
        }
    } else {
        StoreError::Lock {
            path: path.to_path_buf(),
            source: e,
        }
    }
}

pub fn lock_path(store_path: &Path) -> PathBuf {
    let mut name = store_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".lock");
    store_path.with_file_name(name)
}
