//! Error types for daystore

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing file exists but is not a date-keyed object of string records.
    #[error("corrupt store at {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("failed to read store at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the new contents failed. The previous file is left as it was.
    #[error("failed to persist store to {}: {source}", path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store at {} is locked by another process", path.display())]
    Locked { path: PathBuf },

    #[error("failed to lock {}: {source}", path.display())]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn corrupt(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::Corrupt {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persistence {
            path: path.into(),
            source,
        }
    }

    /// True for the two failures that leave the in-memory history usable for a retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence { .. } | Self::Locked { .. })
    }
}
