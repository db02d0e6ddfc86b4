//! Export of the file tree to disk.
//!
//! Directories are created first in one pass, then files are written in path
//! order. With atomic writes enabled each file goes to a sibling temp file
//! that is persisted over the target; a failed write removes the temp file
//! and leaves the target untouched.
//!
//! # Examples
//!
//! ```
//! use chanstub_files::FilesBuilder;
//! # use tempfile::TempDir;
//!
//! # let temp_dir = TempDir::new().unwrap();
//! # let output_dir = temp_dir.path();
//! let fs = FilesBuilder::new()
//!     .add_file("/echo/echo.pb.grpchan.go", "package echo\n")
//!     .build()
//!     .unwrap();
//!
//! fs.export_to_filesystem(output_dir).unwrap();
//! assert!(output_dir.join("echo/echo.pb.grpchan.go").exists());
//! ```

use crate::types::{FilesError, Result};
use crate::vfs::FileSystem;
use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Options for exporting to disk.
///
/// # Examples
///
/// ```
/// use chanstub_files::ExportOptions;
///
/// let options = ExportOptions::default()
///     .with_atomic_writes(false)
///     .with_overwrite(false);
/// assert!(!options.atomic);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// Write to a temp file, then rename
    pub atomic: bool,
    /// Replace files that already exist
    pub overwrite: bool,
}

impl ExportOptions {
    /// Creates options with atomic writes and overwriting enabled.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            atomic: true,
            overwrite: true,
        }
    }

    /// Sets whether to use atomic writes.
    #[must_use]
    pub const fn with_atomic_writes(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }

    /// Sets whether to overwrite existing files.
    #[must_use]
    pub const fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystem {
    /// Exports every file under `base_path` with default options.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::FileNotFound` if the base directory does not
    /// exist, or `FilesError::IoError` if a directory or file cannot be
    /// written.
    pub fn export_to_filesystem(&self, base_path: impl AsRef<Path>) -> Result<usize> {
        self.export_to_filesystem_with_options(base_path, &ExportOptions::default())
    }

    /// Exports every file under `base_path`.
    ///
    /// Returns the number of files written; files skipped because they
    /// exist and `overwrite` is off are not counted.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::FileNotFound` if the base directory does not
    /// exist, or `FilesError::IoError` if a directory or file cannot be
    /// written.
    pub fn export_to_filesystem_with_options(
        &self,
        base_path: impl AsRef<Path>,
        options: &ExportOptions,
    ) -> Result<usize> {
        let base = base_path.as_ref();

        if !base.exists() {
            return Err(FilesError::FileNotFound {
                path: base.display().to_string(),
            });
        }

        let canonical_base = base.canonicalize().map_err(|e| FilesError::IoError {
            path: base.display().to_string(),
            source: e,
        })?;

        let dirs = self.collect_directories(&canonical_base);
        create_directories(&dirs)?;

        let mut written = 0;
        let mut bytes = 0;
        for (path, file) in self.files() {
            let disk_path = to_disk_path(path.relative(), &canonical_base);
            if write_file(&disk_path, file.content(), options)? {
                written += 1;
                bytes += file.size();
            }
        }

        tracing::info!(
            "Exported {written} of {} files ({bytes} bytes) to {}",
            self.file_count(),
            canonical_base.display()
        );
        Ok(written)
    }

    fn collect_directories(&self, base: &Path) -> BTreeSet<PathBuf> {
        let mut dirs = BTreeSet::new();
        for (path, _) in self.files() {
            let disk_path = to_disk_path(path.relative(), base);
            if let Some(parent) = disk_path.parent()
                && parent != base
            {
                dirs.insert(parent.to_path_buf());
            }
        }
        dirs
    }
}

fn create_directories(dirs: &BTreeSet<PathBuf>) -> Result<()> {
    for dir in dirs {
        fs::create_dir_all(dir).map_err(|e| FilesError::IoError {
            path: dir.display().to_string(),
            source: e,
        })?;
    }
    Ok(())
}

fn to_disk_path(relative: &str, base: &Path) -> PathBuf {
    relative
        .split('/')
        .filter(|component| !component.is_empty())
        .fold(base.to_path_buf(), |path, component| path.join(component))
}

/// Writes one file, returning `false` when an existing file was kept.
fn write_file(path: &Path, content: &str, options: &ExportOptions) -> Result<bool> {
    if !options.overwrite && path.exists() {
        tracing::debug!("keeping existing {}", path.display());
        return Ok(false);
    }

    let io_error = |path: &Path| {
        let path = path.display().to_string();
        move |source| FilesError::IoError { path, source }
    };

    if options.atomic {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));

        let mut file = NamedTempFile::new_in(dir).map_err(io_error(dir))?;
        file.write_all(content.as_bytes()).map_err(io_error(path))?;
        file.as_file().sync_all().map_err(io_error(path))?;

        file.persist(path).map_err(|e| io_error(path)(e.error))?;
    } else {
        fs::write(path, content).map_err(io_error(path))?;
    }

    tracing::debug!("wrote {} ({} bytes)", path.display(), content.len());
    Ok(true)
}
