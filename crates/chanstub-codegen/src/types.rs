//! Types for generated output.
//!
//! # Examples
//!
//! ```
//! use chanstub_codegen::{GeneratedCode, GeneratedFile};
//!
//! let mut code = GeneratedCode::new();
//! code.add_file(GeneratedFile {
//!     path: "echo/echo.pb.grpchan.go".to_string(),
//!     source: "echo/echo.proto".to_string(),
//!     content: "package echo\n".to_string(),
//! });
//!
//! assert_eq!(code.file_count(), 1);
//! ```

use serde::{Deserialize, Serialize};

/// Result of code generation containing all generated files.
///
/// Files appear in the order their units were requested.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedCode {
    /// List of generated files with paths and contents
    pub files: Vec<GeneratedFile>,
}

impl GeneratedCode {
    /// Creates a new empty generated code container.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Adds a generated file to the collection.
    pub fn add_file(&mut self, file: GeneratedFile) {
        self.files.push(file);
    }

    /// Returns the number of generated files.
    #[inline]
    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Returns an iterator over the generated files.
    #[inline]
    pub fn files(&self) -> impl Iterator<Item = &GeneratedFile> {
        self.files.iter()
    }

    /// Returns the total size of all file contents in bytes.
    #[must_use]
    pub fn total_bytes(&self) -> usize {
        self.files.iter().map(|f| f.content.len()).sum()
    }
}

/// A single generated file with path and content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    /// Relative path where the file should be written
    pub path: String,
    /// Path of the unit the file was generated from
    pub source: String,
    /// File content
    pub content: String,
}

impl GeneratedFile {
    /// Returns the file path.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the file content.
    #[inline]
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, content: &str) -> GeneratedFile {
        GeneratedFile {
            path: path.to_string(),
            source: "a.proto".to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_generated_code_accumulates_in_order() {
        let mut code = GeneratedCode::new();
        code.add_file(file("b.go", "bb"));
        code.add_file(file("a.go", "a"));

        let paths: Vec<_> = code.files().map(GeneratedFile::path).collect();
        assert_eq!(paths, vec!["b.go", "a.go"]);
        assert_eq!(code.total_bytes(), 3);
    }

    #[test]
    fn test_generated_code_json_roundtrip() {
        let mut code = GeneratedCode::new();
        code.add_file(file("a.go", "package a\n"));
        let json = serde_json::to_string(&code).unwrap();
        let back: GeneratedCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, code);
    }
}
