//! Atomic output staging.
//!
//! Tools write into a [`Staging`] area inside the destination directory and
//! the result is renamed over the destination only once it is complete, so a
//! failed or interrupted run never leaves a half-written output behind.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Staging area for a single output file.
///
/// # Example
///
/// ```no_run
/// use vidbatch_av::Staging;
///
/// let staging = Staging::new("/videos/clip1 AD.avi")?;
/// // ... let a tool write to staging.path() ...
/// staging.commit()?;
/// # Ok::<(), vidbatch_av::Error>(())
/// ```
pub struct Staging {
    temp_dir: TempDir,
    staged_path: PathBuf,
    destination: PathBuf,
}

impl Staging {
    /// Create a staging area next to `destination`.
    ///
    /// The staged file keeps the destination's file name so tools that infer
    /// the format from the extension behave the same.
    pub fn new<P: AsRef<Path>>(destination: P) -> Result<Self> {
        let destination = destination.as_ref().to_path_buf();

        let file_name = destination
            .file_name()
            .ok_or_else(|| Error::InvalidInput("Invalid output file path".to_string()))?;
        let parent = match destination.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let temp_dir = tempfile::Builder::new()
            .prefix(".vidbatch-")
            .tempdir_in(&parent)
            .map_err(|e| Error::Staging(format!("failed to create staging dir: {e}")))?;
        let staged_path = temp_dir.path().join(file_name);

        Ok(Self {
            temp_dir,
            staged_path,
            destination,
        })
    }

    /// Path the tool should write to.
    pub fn path(&self) -> &Path {
        &self.staged_path
    }

    /// Move the staged file over the destination, replacing any previous
    /// output. The staging directory is removed afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if nothing was staged or the rename fails.
    pub fn commit(self) -> Result<PathBuf> {
        if !self.staged_path.exists() {
            return Err(Error::Staging(format!(
                "tool produced no output for {}",
                self.destination.display()
            )));
        }

        // Same directory, so this is a plain rename.
        std::fs::rename(&self.staged_path, &self.destination)
            .map_err(|e| Error::Staging(format!("failed to move output into place: {e}")))?;

        drop(self.temp_dir);
        Ok(self.destination)
    }
}
