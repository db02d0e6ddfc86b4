//! protoc plugin protocol.
//!
//! protoc writes a serialized `CodeGeneratorRequest` to the plugin's stdin
//! and reads a `CodeGeneratorResponse` from its stdout. Generator failures
//! are reported inside the response; only protocol and I/O failures make
//! the process itself fail.

use anyhow::{Context, Result};
use chanstub_codegen::{ChannelStubGenerator, GeneratedCode};
use chanstub_core::GeneratorConfig;
use chanstub_descriptor::{CodeGenRequest, decode_request};
use prost::Message;
use prost_types::compiler::{CodeGeneratorResponse, code_generator_response};
use std::io::{Read, Write};
use tracing::{error, info};

/// Tells protoc that `optional` fields in proto3 files are understood.
pub const FEATURE_PROTO3_OPTIONAL: u64 = 1;

/// Reads one request from `reader` and writes the response to `writer`.
///
/// # Errors
///
/// Returns an error if the request cannot be read or decoded, or the
/// response cannot be written. Generator errors are not errors here; they
/// are sent to protoc in the response.
///
/// # Examples
///
/// ```
/// use chanstub_cli::plugin::run_plugin;
/// use prost::Message;
/// use prost_types::compiler::{CodeGeneratorRequest, CodeGeneratorResponse};
///
/// let request = CodeGeneratorRequest::default().encode_to_vec();
/// let mut out = Vec::new();
/// run_plugin(request.as_slice(), &mut out).unwrap();
///
/// let response = CodeGeneratorResponse::decode(out.as_slice()).unwrap();
/// assert!(response.error.is_none());
/// assert!(response.file.is_empty());
/// ```
pub fn run_plugin<R: Read, W: Write>(mut reader: R, mut writer: W) -> Result<()> {
    let mut input = Vec::new();
    reader
        .read_to_end(&mut input)
        .context("failed to read CodeGeneratorRequest")?;

    let request = decode_request(&input).context("invalid plugin request")?;
    let response = respond(&request);

    writer
        .write_all(&response.encode_to_vec())
        .context("failed to write CodeGeneratorResponse")?;
    writer.flush().context("failed to flush CodeGeneratorResponse")?;
    Ok(())
}

/// Builds the response for a decoded request.
///
/// On any generator error the response carries the error message and no
/// files.
#[must_use]
pub fn respond(request: &CodeGenRequest) -> CodeGeneratorResponse {
    match generate(request) {
        Ok(code) => {
            info!("Responding with {} files", code.file_count());
            success_response(code)
        }
        Err(e) => {
            error!("{e}");
            CodeGeneratorResponse {
                error: Some(e.to_string()),
                supported_features: Some(FEATURE_PROTO3_OPTIONAL),
                ..Default::default()
            }
        }
    }
}

fn generate(request: &CodeGenRequest) -> chanstub_core::Result<GeneratedCode> {
    let config = GeneratorConfig::from_parameter(request.parameter.as_deref())?;
    ChannelStubGenerator::new(config)?.generate(request)
}

fn success_response(code: GeneratedCode) -> CodeGeneratorResponse {
    let file = code
        .files
        .into_iter()
        .map(|f| code_generator_response::File {
            name: Some(f.path),
            content: Some(f.content),
            ..Default::default()
        })
        .collect();

    CodeGeneratorResponse {
        file,
        supported_features: Some(FEATURE_PROTO3_OPTIONAL),
        ..Default::default()
    }
}
