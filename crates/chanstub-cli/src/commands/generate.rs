//! Generate command implementation.
//!
//! Runs the generator over a descriptor set outside of protoc and writes
//! the stub files under an output directory, laid out exactly as protoc
//! would lay them out for the same parameters.

use super::common::InputArgs;
use crate::formatters::format_output;
use anyhow::{Context, Result};
use chanstub_codegen::{ChannelStubGenerator, GeneratedCode};
use chanstub_core::cli::{ExitCode, OutputFormat};
use chanstub_files::{ExportOptions, FilesBuilder};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info};

/// Arguments of `chanstub generate`.
#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output directory (`~` is expanded, created if missing)
    #[arg(short, long, default_value = ".")]
    pub out: PathBuf,

    /// Keep files that already exist instead of replacing them
    #[arg(long)]
    pub no_overwrite: bool,

    /// Write files in place instead of through a temp file and rename
    #[arg(long)]
    pub no_atomic: bool,
}

impl GenerateArgs {
    fn export_options(&self) -> ExportOptions {
        ExportOptions::default()
            .with_overwrite(!self.no_overwrite)
            .with_atomic_writes(!self.no_atomic)
    }
}

/// Summary printed after a successful run.
#[derive(Debug, Serialize)]
struct GenerateReport {
    output_dir: String,
    files: Vec<FileReport>,
    total_bytes: usize,
}

#[derive(Debug, Serialize)]
struct FileReport {
    path: String,
    source: String,
    bytes: usize,
}

impl GenerateReport {
    fn new(code: &GeneratedCode, output_dir: String) -> Self {
        Self {
            output_dir,
            files: code
                .files()
                .map(|f| FileReport {
                    path: f.path.clone(),
                    source: f.source.clone(),
                    bytes: f.content.len(),
                })
                .collect(),
            total_bytes: code.total_bytes(),
        }
    }
}

/// Runs the generate command.
///
/// Generator errors (malformed descriptors, bad configuration) are logged
/// and yield `ExitCode::GENERATION_FAILED` with nothing written.
///
/// # Errors
///
/// Returns an error if the inputs cannot be read or the files cannot be
/// written.
pub fn run(args: &GenerateArgs, output_format: OutputFormat) -> Result<ExitCode> {
    let config = args.input.load_config()?;
    let request = args.input.load_request()?;

    info!(
        "Generating {} files from {}",
        request.files_to_generate().len(),
        args.input.descriptor_set.display()
    );

    let generated = ChannelStubGenerator::new(config).and_then(|g| g.generate(&request));
    let code = match generated {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            return Ok(ExitCode::GENERATION_FAILED);
        }
    };

    let report = GenerateReport::new(&code, args.out.display().to_string());

    FilesBuilder::from_generated_code(code, "/")
        .build_and_export(&args.out, &args.export_options())
        .with_context(|| format!("failed to write files under {}", args.out.display()))?;

    println!("{}", format_output(&report, output_format)?);
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prost::Message;
    use prost_types::{
        DescriptorProto, FileDescriptorProto, FileDescriptorSet, MethodDescriptorProto,
        ServiceDescriptorProto,
    };
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn echo_set(method_input: &str) -> FileDescriptorSet {
        FileDescriptorSet {
            file: vec![FileDescriptorProto {
                name: Some("echo/echo.proto".to_string()),
                package: Some("echo".to_string()),
                message_type: vec![DescriptorProto {
                    name: Some("EchoRequest".to_string()),
                    ..Default::default()
                }],
                service: vec![ServiceDescriptorProto {
                    name: Some("Echo".to_string()),
                    method: vec![MethodDescriptorProto {
                        name: Some("Say".to_string()),
                        input_type: Some(method_input.to_string()),
                        output_type: Some(".echo.EchoRequest".to_string()),
                        ..Default::default()
                    }],
                    ..Default::default()
                }],
                ..Default::default()
            }],
        }
    }

    fn args(dir: &Path, set: &FileDescriptorSet, params: &[&str]) -> GenerateArgs {
        let set_path = dir.join("set.pb");
        fs::write(&set_path, set.encode_to_vec()).unwrap();
        GenerateArgs {
            input: InputArgs {
                descriptor_set: set_path,
                params: params.iter().map(ToString::to_string).collect(),
                ..Default::default()
            },
            out: dir.join("out"),
            no_overwrite: false,
            no_atomic: false,
        }
    }

    #[test]
    fn test_generate_writes_files() {
        let temp = TempDir::new().unwrap();
        let args = args(
            temp.path(),
            &echo_set(".echo.EchoRequest"),
            &["paths=source_relative"],
        );

        let code = run(&args, OutputFormat::Json).unwrap();
        assert_eq!(code, ExitCode::SUCCESS);

        let written = fs::read_to_string(temp.path().join("out/echo/echo.pb.grpchan.go")).unwrap();
        assert!(written.contains("func NewEchoChannelClient("));
    }

    #[test]
    fn test_generation_failure_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let args = args(temp.path(), &echo_set(".echo.Missing"), &[]);

        let code = run(&args, OutputFormat::Text).unwrap();
        assert_eq!(code, ExitCode::GENERATION_FAILED);
        assert!(!temp.path().join("out").exists());
    }

    #[test]
    fn test_export_options_from_flags() {
        let mut args = GenerateArgs {
            input: InputArgs::default(),
            out: PathBuf::from("out"),
            no_overwrite: false,
            no_atomic: false,
        };
        assert_eq!(args.export_options(), ExportOptions::default());

        args.no_overwrite = true;
        args.no_atomic = true;
        let options = args.export_options();
        assert!(!options.overwrite);
        assert!(!options.atomic);
    }
}
