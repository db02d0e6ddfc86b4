//! Builder for file trees.
//!
//! # Examples
//!
//! ```
//! use chanstub_files::FilesBuilder;
//!
//! let fs = FilesBuilder::new()
//!     .add_file("/echo/echo.pb.grpchan.go", "package echo\n")
//!     .add_file("/admin/admin.pb.grpchan.go", "package admin\n")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(fs.file_count(), 2);
//! ```

use crate::filesystem::ExportOptions;
use crate::types::{FilesError, Result};
use crate::vfs::FileSystem;
use chanstub_codegen::GeneratedCode;
use std::fs;
use std::path::{Path, PathBuf};

/// Builder for a [`FileSystem`].
///
/// Invalid paths do not fail immediately; the first one is reported by
/// [`build`](Self::build).
///
/// # Examples
///
/// ```
/// use chanstub_files::FilesBuilder;
/// use chanstub_codegen::{GeneratedCode, GeneratedFile};
///
/// let mut code = GeneratedCode::new();
/// code.add_file(GeneratedFile {
///     path: "echo/echo.pb.grpchan.go".to_string(),
///     source: "echo/echo.proto".to_string(),
///     content: "package echo\n".to_string(),
/// });
///
/// let fs = FilesBuilder::from_generated_code(code, "/").build().unwrap();
/// assert_eq!(fs.file_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct FilesBuilder {
    fs: FileSystem,
    errors: Vec<FilesError>,
}

impl FilesBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder holding every generated file under `base_path`.
    ///
    /// `base_path` is an absolute tree path such as `/` or `/gen`.
    #[must_use]
    pub fn from_generated_code(code: GeneratedCode, base_path: impl AsRef<Path>) -> Self {
        let base = base_path.as_ref().to_string_lossy();
        let base = if base.ends_with('/') {
            base.into_owned()
        } else {
            format!("{base}/")
        };

        code.files.into_iter().fold(Self::new(), |builder, file| {
            let path = format!("{base}{}", file.path);
            builder.add_file(path.as_str(), file.content)
        })
    }

    /// Adds a file.
    #[must_use]
    pub fn add_file(mut self, path: impl AsRef<Path>, content: impl Into<String>) -> Self {
        if let Err(e) = self.fs.add_file(path, content) {
            self.errors.push(e);
        }
        self
    }

    /// Returns the number of files added so far.
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.fs.file_count()
    }

    /// Consumes the builder and returns the file tree.
    ///
    /// # Errors
    ///
    /// Returns the first path error recorded while adding files.
    ///
    /// # Examples
    ///
    /// ```
    /// use chanstub_files::FilesBuilder;
    ///
    /// let result = FilesBuilder::new()
    ///     .add_file("relative/echo.pb.grpchan.go", "")
    ///     .build();
    ///
    /// assert!(result.is_err());
    /// ```
    pub fn build(self) -> Result<FileSystem> {
        if let Some(error) = self.errors.into_iter().next() {
            return Err(error);
        }
        Ok(self.fs)
    }

    /// Builds the tree and exports it under `base_path`.
    ///
    /// A leading `~` is expanded to the home directory and the base
    /// directory is created if missing.
    ///
    /// # Errors
    ///
    /// Returns a path error from [`build`](Self::build), or an I/O error if
    /// the home directory is unknown or a write fails.
    pub fn build_and_export(
        self,
        base_path: impl AsRef<Path>,
        options: &ExportOptions,
    ) -> Result<FileSystem> {
        let fs_tree = self.build()?;
        let base = expand_tilde(base_path.as_ref())?;

        fs::create_dir_all(&base).map_err(|e| FilesError::IoError {
            path: base.display().to_string(),
            source: e,
        })?;

        fs_tree.export_to_filesystem_with_options(&base, options)?;
        Ok(fs_tree)
    }
}

/// Expands a leading `~` to the user's home directory.
///
/// # Errors
///
/// Returns `FilesError::InvalidPath` for non-UTF-8 paths and
/// `FilesError::IoError` if the home directory cannot be determined.
pub fn expand_tilde(path: &Path) -> Result<PathBuf> {
    let path_str = path.to_str().ok_or_else(|| FilesError::InvalidPath {
        path: path.display().to_string(),
    })?;

    let rest = match path_str {
        "~" => "",
        s => match s.strip_prefix("~/") {
            Some(rest) => rest,
            None => return Ok(path.to_path_buf()),
        },
    };

    let home = dirs::home_dir().ok_or_else(|| FilesError::IoError {
        path: path_str.to_string(),
        source: std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Cannot determine home directory",
        ),
    })?;

    Ok(if rest.is_empty() { home } else { home.join(rest) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chanstub_codegen::GeneratedFile;
    use tempfile::TempDir;

    fn generated(paths: &[&str]) -> GeneratedCode {
        let mut code = GeneratedCode::new();
        for path in paths {
            code.add_file(GeneratedFile {
                path: (*path).to_string(),
                source: path.replace(".pb.grpchan.go", ".proto"),
                content: format!("// {path}\n"),
            });
        }
        code
    }

    #[test]
    fn test_builder_empty() {
        let fs = FilesBuilder::new().build().unwrap();
        assert_eq!(fs.file_count(), 0);
    }

    #[test]
    fn test_from_generated_code_root() {
        let code = generated(&["echo/echo.pb.grpchan.go", "admin.pb.grpchan.go"]);
        let fs = FilesBuilder::from_generated_code(code, "/").build().unwrap();
        let paths: Vec<_> = fs.files().map(|(path, _)| path.as_str()).collect();
        assert_eq!(paths, vec!["/admin.pb.grpchan.go", "/echo/echo.pb.grpchan.go"]);
        let (_, admin) = fs
            .files()
            .find(|(path, _)| path.as_str() == "/admin.pb.grpchan.go")
            .unwrap();
        assert_eq!(admin.content(), "// admin.pb.grpchan.go\n");
    }

    #[test]
    fn test_from_generated_code_with_base() {
        let code = generated(&["echo/echo.pb.grpchan.go"]);
        let fs = FilesBuilder::from_generated_code(code, "/gen").build().unwrap();
        assert!(fs.files().any(|(path, _)| path.as_str() == "/gen/echo/echo.pb.grpchan.go"));
    }

    #[test]
    fn test_escaping_path_rejected_at_build() {
        let code = generated(&["../outside.pb.grpchan.go", "ok.pb.grpchan.go"]);
        let builder = FilesBuilder::from_generated_code(code, "/");
        assert_eq!(builder.file_count(), 1);
        assert!(builder.build().unwrap_err().is_invalid_path());
    }

    #[test]
    fn test_build_and_export_creates_base() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("nested/out");
        let code = generated(&["echo/echo.pb.grpchan.go"]);

        let fs_tree = FilesBuilder::from_generated_code(code, "/")
            .build_and_export(&out, &ExportOptions::default())
            .unwrap();

        assert_eq!(fs_tree.file_count(), 1);
        assert_eq!(
            fs::read_to_string(out.join("echo/echo.pb.grpchan.go")).unwrap(),
            "// echo/echo.pb.grpchan.go\n"
        );
    }

    #[test]
    fn test_expand_tilde() {
        let plain = Path::new("/tmp/out");
        assert_eq!(expand_tilde(plain).unwrap(), plain);

        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde(Path::new("~")).unwrap(), home);
            assert_eq!(expand_tilde(Path::new("~/gen")).unwrap(), home.join("gen"));
        }
    }
}
