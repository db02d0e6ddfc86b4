//! File tree for generated channel stubs.
//!
//! Holds generated Go files in memory under validated paths and exports
//! them to disk.
//!
//! # Examples
//!
//! ```
//! use chanstub_files::{ExportOptions, FilesBuilder};
//! use chanstub_codegen::{GeneratedCode, GeneratedFile};
//! # use tempfile::TempDir;
//!
//! let mut code = GeneratedCode::new();
//! code.add_file(GeneratedFile {
//!     path: "echo/echo.pb.grpchan.go".to_string(),
//!     source: "echo/echo.proto".to_string(),
//!     content: "package echo\n".to_string(),
//! });
//!
//! # let temp = TempDir::new().unwrap();
//! let fs = FilesBuilder::from_generated_code(code, "/")
//!     .build_and_export(temp.path(), &ExportOptions::default())
//!     .unwrap();
//!
//! assert_eq!(fs.file_count(), 1);
//! assert!(temp.path().join("echo/echo.pb.grpchan.go").exists());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod builder;
pub mod filesystem;
pub mod types;
pub mod vfs;

pub use builder::{FilesBuilder, expand_tilde};
pub use filesystem::ExportOptions;
pub use types::{FileEntry, FilePath, FilesError, Result};
pub use vfs::FileSystem;
