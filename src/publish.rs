//! Atomic file publishing
//!
//! Output is staged in a temporary file next to its final path and renamed
//! into place only once fully written and synced. If anything fails before
//! the rename, dropping the [`StagedFile`] deletes the temporary file, so a
//! reader of the final path sees the previous file or the complete new one.

use crate::error::{MetadataError, Result};
use crate::paths;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Mode given to published files on Unix (temp files start out as 0o600)
#[cfg(unix)]
const PUBLISHED_MODE: u32 = 0o644;

/// A file being written that becomes visible at `target` on [`StagedFile::commit`]
#[derive(Debug)]
pub struct StagedFile {
    target: PathBuf,
    temp: NamedTempFile,
}

impl StagedFile {
    /// Create the temporary file in the target's directory
    pub fn create(target: impl Into<PathBuf>) -> Result<Self> {
        let target = target.into();
        let dir = paths::staging_dir(&target);
        let prefix = format!(
            ".{}.",
            target
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "output".to_string())
        );

        let temp = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(".tmp")
            .tempfile_in(&dir)
            .map_err(|e| MetadataError::output(&target, e))?;

        tracing::debug!("Staging {} in {}", target.display(), temp.path().display());
        Ok(Self { target, temp })
    }

    /// Final path the file will be published at
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Path of the temporary file while staging
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    pub fn file(&mut self) -> &mut File {
        self.temp.as_file_mut()
    }

    /// Write all of `bytes` at the current position
    pub fn write_all(&mut self, bytes: &[u8]) -> Result<()> {
        let target = self.target.clone();
        self.file()
            .write_all(bytes)
            .map_err(|e| MetadataError::output(target, e))
    }

    /// Flush, sync and rename the file onto its target
    pub fn commit(mut self) -> Result<PathBuf> {
        let target = self.target.clone();
        let file = self.temp.as_file_mut();
        file.flush()
            .and_then(|()| file.sync_all())
            .map_err(|e| MetadataError::output(&target, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(PUBLISHED_MODE);
            std::fs::set_permissions(self.temp.path(), perms)
                .map_err(|e| MetadataError::output(&target, e))?;
        }

        // On failure the PersistError still owns the temp file and removes it when dropped.
        self.temp
            .persist(&target)
            .map_err(|e| MetadataError::output(&target, e.error))?;

        Ok(target)
    }
}

/// Atomically replace `target` with `contents`
pub fn write_atomic(target: impl Into<PathBuf>, contents: &[u8]) -> Result<PathBuf> {
    let mut staged = StagedFile::create(target)?;
    staged.write_all(contents)?;
    staged.commit()
}
