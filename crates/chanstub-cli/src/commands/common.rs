//! Input loading shared by `generate` and `inspect`.

use anyhow::{Context, Result};
use chanstub_core::GeneratorConfig;
use chanstub_descriptor::{CodeGenRequest, decode_descriptor_set};
use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Arguments naming the descriptors and configuration to generate from.
#[derive(Args, Debug, Clone, Default)]
pub struct InputArgs {
    /// Serialized `FileDescriptorSet` (`protoc --include_imports --descriptor_set_out`)
    pub descriptor_set: PathBuf,

    /// Proto file to generate for; repeat for several (default: every file in the set)
    #[arg(long = "file", num_args = 1)]
    pub files: Vec<String>,

    /// TOML configuration file
    #[arg(short, long, env = "CHANSTUB_CONFIG")]
    pub config: Option<PathBuf>,

    /// Plugin parameter in protoc syntax (e.g. `paths=source_relative`), applied after the config file
    #[arg(short = 'p', long = "param", num_args = 1)]
    pub params: Vec<String>,
}

impl InputArgs {
    /// Builds the generator configuration: TOML file first, then each
    /// `--param` on top.
    pub fn load_config(&self) -> Result<GeneratorConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let document = read_to_string(path)?;
                GeneratorConfig::from_toml_str(&document)
                    .with_context(|| format!("invalid config file {}", path.display()))?
            }
            None => GeneratorConfig::default(),
        };

        for param in &self.params {
            config
                .apply_parameter(param)
                .with_context(|| format!("invalid --param '{param}'"))?;
        }

        debug!("effective configuration: {config:?}");
        Ok(config)
    }

    /// Reads and converts the descriptor set.
    pub fn load_request(&self) -> Result<CodeGenRequest> {
        let bytes = fs::read(&self.descriptor_set)
            .with_context(|| format!("failed to read {}", self.descriptor_set.display()))?;
        let files = decode_descriptor_set(&bytes)
            .with_context(|| format!("invalid descriptor set {}", self.descriptor_set.display()))?;

        debug!(
            "loaded {} files from {}",
            files.len(),
            self.descriptor_set.display()
        );

        CodeGenRequest::from_descriptor_set(&files, self.files.clone())
            .context("descriptor set cannot be converted")
    }
}

fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}
