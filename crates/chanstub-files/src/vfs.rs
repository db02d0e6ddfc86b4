//! In-memory file tree.
//!
//! Files are kept in a `BTreeMap`, so iteration and export always happen in
//! path order.

use crate::types::{FileEntry, FilePath, Result};
use std::collections::BTreeMap;
use std::path::Path;

/// An in-memory tree of generated files.
///
/// # Examples
///
/// ```
/// use chanstub_files::FileSystem;
///
/// let mut fs = FileSystem::new();
/// fs.add_file("/echo/echo.pb.grpchan.go", "package echo\n").unwrap();
///
/// assert_eq!(fs.file_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSystem {
    files: BTreeMap<FilePath, FileEntry>,
}

impl FileSystem {
    /// Creates an empty file tree.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            files: BTreeMap::new(),
        }
    }

    /// Adds a file, replacing any file already at the path.
    ///
    /// # Errors
    ///
    /// Returns a path validation error if the path is not absolute or
    /// contains `..`.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) -> Result<()> {
        let path = FilePath::new(path)?;
        if self.files.insert(path.clone(), FileEntry::new(content)).is_some() {
            tracing::debug!("replaced {path}");
        }
        Ok(())
    }

    /// Returns the number of files.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Iterates over files in path order.
    pub fn files(&self) -> impl Iterator<Item = (&FilePath, &FileEntry)> {
        self.files.iter()
    }
}
