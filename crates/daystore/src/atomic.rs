//! Write-to-temp-then-rename file replacement.
//!
//! The new contents are written and fsynced in a temporary file next to the
//! target, then renamed over it. Readers see either the old file or the new
//! one, never a partial write.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// New contents that are fully on disk but not yet visible at the target path.
///
/// Dropping a staged write without committing removes the temporary file and
/// leaves the target untouched.
pub(crate) struct StagedWrite {
    tmp: NamedTempFile,
    target: PathBuf,
}

impl StagedWrite {
    pub(crate) fn new(target: &Path, contents: &[u8]) -> io::Result<Self> {
        let file_name = target.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no file name", target.display()),
            )
        })?;

        let mut tmp = tempfile::Builder::new()
            .prefix(&format!(".{}.", file_name.to_string_lossy()))
            .suffix(".tmp")
            .tempfile_in(parent_dir(target))?;

        tmp.write_all(contents)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;

        Ok(Self {
            tmp,
            target: target.to_path_buf(),
        })
    }

    #[cfg(test)]
    pub(crate) fn temp_path(&self) -> &Path {
        self.tmp.path()
    }

    /// Atomically replaces the target with the staged contents.
    pub(crate) fn commit(self) -> io::Result<()> {
        self.tmp.persist(&self.target).map_err(|e| e.error)?;

        if let Err(e) = sync_dir(parent_dir(&self.target)) {
            // The rename already happened; only its durability is in doubt.
            tracing::warn!(
                "Failed to sync directory of {}: {}",
                self.target.display(),
                e
            );
        }
        Ok(())
    }
}

pub(crate) fn atomic_write(target: &Path, contents: &[u8]) -> io::Result<()> {
    StagedWrite::new(target, contents)?.commit()
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    std::fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}
