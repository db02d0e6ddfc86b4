//! Core types for the output file tree.
//!
//! # Examples
//!
//! ```
//! use chanstub_files::{FileEntry, FilePath};
//!
//! let path = FilePath::new("/echo/echo.pb.grpchan.go").unwrap();
//! let file = FileEntry::new("package echo\n");
//!
//! assert_eq!(path.relative(), "echo/echo.pb.grpchan.go");
//! assert_eq!(file.size(), 13);
//! ```

use std::fmt;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while building or exporting a file tree.
///
/// # Examples
///
/// ```
/// use chanstub_files::FilesError;
///
/// let error = FilesError::FileNotFound {
///     path: "/missing.go".to_string(),
/// };
///
/// assert!(error.is_not_found());
/// ```
#[derive(Error, Debug)]
pub enum FilesError {
    /// No file at the specified path
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// Path is empty or not valid UTF-8
    #[error("Invalid path: {path}")]
    InvalidPath {
        /// The invalid path
        path: String,
    },

    /// Path does not start with '/'
    #[error("Path must be absolute: {path}")]
    PathNotAbsolute {
        /// The relative path
        path: String,
    },

    /// Path contains a '..' component
    #[error("Path contains invalid components: {path}")]
    InvalidPathComponent {
        /// The path with invalid components
        path: String,
    },

    /// Disk I/O failed during export
    #[error("I/O error at {path}: {source}")]
    IoError {
        /// Disk path being accessed
        path: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl FilesError {
    /// Returns `true` if this is a file not found error.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::FileNotFound { .. })
    }

    /// Returns `true` for any path validation error.
    ///
    /// # Examples
    ///
    /// ```
    /// use chanstub_files::FilesError;
    ///
    /// let error = FilesError::InvalidPathComponent {
    ///     path: "/../etc".to_string(),
    /// };
    ///
    /// assert!(error.is_invalid_path());
    /// ```
    #[must_use]
    pub const fn is_invalid_path(&self) -> bool {
        matches!(
            self,
            Self::InvalidPath { .. }
                | Self::PathNotAbsolute { .. }
                | Self::InvalidPathComponent { .. }
        )
    }

    /// Returns `true` if this is a disk I/O error.
    #[must_use]
    pub const fn is_io_error(&self) -> bool {
        matches!(self, Self::IoError { .. })
    }
}

/// A validated, absolute, forward-slash path inside the file tree.
///
/// Generated files are addressed as `/<output path>`; the leading slash marks
/// the export root.
///
/// # Examples
///
/// ```
/// use chanstub_files::FilePath;
///
/// let path = FilePath::new("/example.com/echo/echo.pb.grpchan.go").unwrap();
/// assert_eq!(path.relative(), "example.com/echo/echo.pb.grpchan.go");
///
/// assert!(FilePath::new("relative/path.go").is_err());
/// assert!(FilePath::new("/parent/../escape.go").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FilePath(String);

impl FilePath {
    /// Creates a new `FilePath`.
    ///
    /// # Errors
    ///
    /// Returns `FilesError::InvalidPath` if the path is empty or not UTF-8,
    /// `FilesError::PathNotAbsolute` if it does not start with '/', and
    /// `FilesError::InvalidPathComponent` if any component is `..`.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let path_str = path.to_str().ok_or_else(|| FilesError::InvalidPath {
            path: path.display().to_string(),
        })?;

        // Output paths are forward-slash on every host
        let normalized = if cfg!(target_os = "windows") {
            path_str.replace(std::path::MAIN_SEPARATOR, "/")
        } else {
            path_str.to_string()
        };

        if normalized.is_empty() {
            return Err(FilesError::InvalidPath {
                path: String::new(),
            });
        }

        if !normalized.starts_with('/') {
            return Err(FilesError::PathNotAbsolute { path: normalized });
        }

        if normalized.split('/').any(|component| component == "..") {
            return Err(FilesError::InvalidPathComponent { path: normalized });
        }

        Ok(Self(normalized))
    }

    /// Returns the path as a `Path` reference.
    #[must_use]
    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the path without its leading '/'.
    #[must_use]
    pub fn relative(&self) -> &str {
        self.0.trim_start_matches('/')
    }

}

impl fmt::Display for FilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<Path> for FilePath {
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}

/// Contents of one file in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    content: String,
}

impl FileEntry {
    /// Creates a new file entry.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Returns the file content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the content size in bytes.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.content.len()
    }
}

/// Result type for file tree operations.
pub type Result<T> = std::result::Result<T, FilesError>;
