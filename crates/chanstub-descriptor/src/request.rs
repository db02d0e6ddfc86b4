//! Decoding of protoc plugin requests and descriptor sets.

use crate::convert::unit_from_file;
use crate::model::ServiceDefinitionUnit;
use crate::set::DescriptorSet;
use chanstub_core::{Error, Result};
use prost::Message;
use prost_types::compiler::CodeGeneratorRequest;
use prost_types::{FileDescriptorProto, FileDescriptorSet};

/// A decoded generation request.
///
/// Holds every file protoc sent (requested files and their dependencies)
/// and the ordered list of files to generate code for.
#[derive(Debug, Clone, Default)]
pub struct CodeGenRequest {
    /// Raw plugin parameter string, if protoc passed one
    pub parameter: Option<String>,
    files_to_generate: Vec<String>,
    descriptors: DescriptorSet,
}

impl CodeGenRequest {
    /// Builds a request from already-converted units.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedDescriptor` if two units share a path.
    pub fn from_units(
        units: impl IntoIterator<Item = ServiceDefinitionUnit>,
        files_to_generate: Vec<String>,
    ) -> Result<Self> {
        let mut descriptors = DescriptorSet::new();
        for unit in units {
            descriptors.add_unit(unit)?;
        }
        Ok(Self {
            parameter: None,
            files_to_generate,
            descriptors,
        })
    }

    /// Builds a request from raw file descriptors, as found in a
    /// `FileDescriptorSet` produced by `protoc --descriptor_set_out`.
    ///
    /// When `files_to_generate` is empty every file in the set is requested.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedDescriptor` if a file has no name or appears
    /// twice.
    pub fn from_descriptor_set(
        files: &[FileDescriptorProto],
        files_to_generate: Vec<String>,
    ) -> Result<Self> {
        let units = files.iter().map(unit_from_file).collect::<Result<Vec<_>>>()?;
        let files_to_generate = if files_to_generate.is_empty() {
            units.iter().map(|u| u.path.as_str().to_string()).collect()
        } else {
            files_to_generate
        };
        Self::from_units(units, files_to_generate)
    }

    /// Sets the plugin parameter string.
    #[must_use]
    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.parameter = Some(parameter.into());
        self
    }

    /// Paths of the files to generate, in request order.
    #[must_use]
    pub fn files_to_generate(&self) -> &[String] {
        &self.files_to_generate
    }

    /// All descriptors in the request.
    #[must_use]
    pub const fn descriptors(&self) -> &DescriptorSet {
        &self.descriptors
    }

    /// Resolves the requested files to units, in request order.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedDescriptor` for an empty path or a path that
    /// is not among the request's descriptors.
    pub fn units_to_generate(&self) -> Result<Vec<&ServiceDefinitionUnit>> {
        self.files_to_generate
            .iter()
            .map(|path| {
                if path.is_empty() {
                    return Err(Error::MalformedDescriptor {
                        unit: "<unnamed>".to_string(),
                        reason: "requested file has an empty path".to_string(),
                    });
                }
                self.descriptors
                    .unit(path)
                    .ok_or_else(|| Error::MalformedDescriptor {
                        unit: path.clone(),
                        reason: "requested file is missing from the request".to_string(),
                    })
            })
            .collect()
    }
}

/// Decodes a serialized `CodeGeneratorRequest`.
///
/// # Errors
///
/// Returns `Error::ProtocolError` if the bytes are not a valid request, and
/// `Error::MalformedDescriptor` if a contained file cannot be converted.
///
/// # Examples
///
/// ```
/// use chanstub_descriptor::decode_request;
/// use prost::Message;
/// use prost_types::FileDescriptorProto;
/// use prost_types::compiler::CodeGeneratorRequest;
///
/// let raw = CodeGeneratorRequest {
///     file_to_generate: vec!["echo.proto".to_string()],
///     parameter: Some("paths=source_relative".to_string()),
///     proto_file: vec![FileDescriptorProto {
///         name: Some("echo.proto".to_string()),
///         ..Default::default()
///     }],
///     ..Default::default()
/// };
///
/// let request = decode_request(&raw.encode_to_vec()).unwrap();
/// assert_eq!(request.files_to_generate(), ["echo.proto"]);
/// assert_eq!(request.parameter.as_deref(), Some("paths=source_relative"));
/// ```
pub fn decode_request(bytes: &[u8]) -> Result<CodeGenRequest> {
    let raw = CodeGeneratorRequest::decode(bytes).map_err(|e| Error::ProtocolError {
        message: "cannot decode CodeGeneratorRequest".to_string(),
        source: Some(Box::new(e)),
    })?;

    tracing::debug!(
        "decoded request: {} files, {} to generate",
        raw.proto_file.len(),
        raw.file_to_generate.len()
    );

    let units = raw
        .proto_file
        .iter()
        .map(unit_from_file)
        .collect::<Result<Vec<_>>>()?;
    let mut request = CodeGenRequest::from_units(units, raw.file_to_generate)?;
    request.parameter = raw.parameter.filter(|p| !p.is_empty());
    Ok(request)
}

/// Decodes a serialized `FileDescriptorSet`.
///
/// # Errors
///
/// Returns `Error::ProtocolError` if the bytes are not a valid set.
pub fn decode_descriptor_set(bytes: &[u8]) -> Result<Vec<FileDescriptorProto>> {
    let set = FileDescriptorSet::decode(bytes).map_err(|e| Error::ProtocolError {
        message: "cannot decode FileDescriptorSet".to_string(),
        source: Some(Box::new(e)),
    })?;
    Ok(set.file)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> FileDescriptorProto {
        FileDescriptorProto {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_units_to_generate_in_request_order() {
        let request = CodeGenRequest::from_descriptor_set(
            &[file("a.proto"), file("b.proto"), file("dep.proto")],
            vec!["b.proto".to_string(), "a.proto".to_string()],
        )
        .unwrap();

        let units = request.units_to_generate().unwrap();
        let paths: Vec<_> = units.iter().map(|u| u.path.as_str()).collect();
        assert_eq!(paths, vec!["b.proto", "a.proto"]);
        assert_eq!(request.descriptors().len(), 3);
    }

    #[test]
    fn test_empty_selection_means_all_files() {
        let request =
            CodeGenRequest::from_descriptor_set(&[file("a.proto"), file("b.proto")], Vec::new())
                .unwrap();
        assert_eq!(request.files_to_generate(), ["a.proto", "b.proto"]);
    }

    #[test]
    fn test_missing_requested_file_is_malformed() {
        let request =
            CodeGenRequest::from_descriptor_set(&[file("a.proto")], vec!["x.proto".to_string()])
                .unwrap();
        let err = request.units_to_generate().unwrap_err();
        assert!(err.is_malformed_descriptor());
        assert_eq!(err.unit(), Some("x.proto"));
    }

    #[test]
    fn test_empty_requested_path_is_malformed() {
        let request =
            CodeGenRequest::from_descriptor_set(&[file("a.proto")], vec![String::new()]).unwrap();
        assert!(request.units_to_generate().unwrap_err().is_malformed_descriptor());
    }

    #[test]
    fn test_decode_garbage_is_protocol_error() {
        let err = decode_request(&[0xff, 0xff, 0xff]).unwrap_err();
        assert!(err.is_protocol_error());
    }

    #[test]
    fn test_empty_parameter_dropped() {
        let raw = CodeGeneratorRequest {
            parameter: Some(String::new()),
            ..Default::default()
        };
        let request = decode_request(&raw.encode_to_vec()).unwrap();
        assert!(request.parameter.is_none());
    }

    #[test]
    fn test_decode_descriptor_set() {
        let set = FileDescriptorSet {
            file: vec![file("a.proto"), file("b.proto")],
        };
        let files = decode_descriptor_set(&set.encode_to_vec()).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[1].name(), "b.proto");
    }
}
