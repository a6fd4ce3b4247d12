//! Directory enumeration.

use crate::error::BatchError;
use std::path::Path;
use walkdir::WalkDir;

/// A lazy, single-pass sequence of file names.
pub type Entries = Box<dyn Iterator<Item = String>>;

/// Source of directory entries.
///
/// Order is whatever the implementation yields; callers must not rely on it.
pub trait DirectoryListing {
    /// Start listing `dir`.
    ///
    /// # Errors
    ///
    /// [`BatchError::Enumeration`] if the directory cannot be opened.
    fn entries(&self, dir: &Path) -> Result<Entries, BatchError>;
}

/// Lists the regular files directly inside a directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsListing {
    sorted: bool,
}

impl FsListing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Yield names in byte order instead of filesystem order.
    pub fn sorted(mut self, sorted: bool) -> Self {
        self.sorted = sorted;
        self
    }
}

impl DirectoryListing for FsListing {
    fn entries(&self, dir: &Path) -> Result<Entries, BatchError> {
        // Opening the directory up front turns a missing or unreadable
        // directory into an error here rather than mid-iteration.
        std::fs::read_dir(dir).map_err(|source| BatchError::Enumeration {
            dir: dir.to_path_buf(),
            source,
        })?;

        let mut walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true);
        if self.sorted {
            walker = walker.sort_by_file_name();
        }

        let names = walker.into_iter().filter_map(|entry| match entry {
            Ok(entry) if entry.file_type().is_file() => match entry.file_name().to_str() {
                Some(name) => Some(name.to_string()),
                None => {
                    tracing::warn!("Skipping non UTF-8 file name: {:?}", entry.file_name());
                    None
                }
            },
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Skipping unreadable directory entry: {}", e);
                None
            }
        });

        Ok(Box::new(names))
    }
}
