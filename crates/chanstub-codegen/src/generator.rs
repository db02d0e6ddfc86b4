//! Channel stub generator.
//!
//! Drives a whole request: every requested unit is assembled and rendered in
//! request order, and the first failure aborts the run with nothing
//! returned.
//!
//! # Examples
//!
//! ```
//! use chanstub_codegen::ChannelStubGenerator;
//! use chanstub_core::{GeneratorConfig, UnitPath};
//! use chanstub_descriptor::{
//!     CodeGenRequest, MethodDescriptor, ServiceDefinitionUnit, ServiceDescriptor,
//! };
//!
//! let unit = ServiceDefinitionUnit::new(UnitPath::new("echo.proto").unwrap(), "")
//!     .with_message("EchoRequest")
//!     .with_message("EchoResponse")
//!     .with_service(
//!         ServiceDescriptor::new("Echo", "")
//!             .with_method(MethodDescriptor::unary("Say", ".EchoRequest", ".EchoResponse")),
//!     );
//! let request = CodeGenRequest::from_units([unit], vec!["echo.proto".to_string()]).unwrap();
//!
//! let generator = ChannelStubGenerator::new(GeneratorConfig::default()).unwrap();
//! let code = generator.generate(&request).unwrap();
//!
//! assert_eq!(code.files[0].path, "echo.pb.grpchan.go");
//! assert!(code.files[0].content.contains("func NewEchoChannelClient(ch grpchan.Channel) EchoClient {"));
//! ```

use crate::assembler::assemble_unit;
use crate::decl::GoFile;
use crate::naming::NameContext;
use crate::template_engine::{GO_FILE_TEMPLATE, TemplateEngine};
use crate::types::{GeneratedCode, GeneratedFile};
use chanstub_core::{Error, GeneratorConfig, Result};
use chanstub_descriptor::{CodeGenRequest, DescriptorSet, ServiceDefinitionUnit};
use std::collections::BTreeMap;

/// Generator for channel-based client stubs.
///
/// Holds no per-run state: generating the same request twice yields
/// byte-identical output.
///
/// # Thread Safety
///
/// This type is `Send` and `Sync`, allowing safe use across threads.
#[derive(Debug)]
pub struct ChannelStubGenerator<'a> {
    engine: TemplateEngine<'a>,
    config: GeneratorConfig,
}

impl ChannelStubGenerator<'_> {
    /// Creates a generator.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the configuration is invalid, or an
    /// emission error if the template cannot be registered.
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        let engine = TemplateEngine::new()?;
        Ok(Self { engine, config })
    }

    /// Returns the configuration of this generator.
    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates stubs for every requested unit.
    ///
    /// Units without services produce no file.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered; later units are not processed.
    /// Two units resolving to the same output path fail with
    /// `Error::MalformedDescriptor` for the later one.
    pub fn generate(&self, request: &CodeGenRequest) -> Result<GeneratedCode> {
        let units = request.units_to_generate()?;
        self.generate_units(&units, request.descriptors())
    }

    /// Generates stubs for the given units, resolving types against `set`.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered; later units are not processed.
    pub fn generate_units(
        &self,
        units: &[&ServiceDefinitionUnit],
        set: &DescriptorSet,
    ) -> Result<GeneratedCode> {
        tracing::info!("Generating channel stubs for {} units", units.len());

        let mut context = NameContext::new(&self.config);
        let mut code = GeneratedCode::new();
        let mut outputs: BTreeMap<String, String> = BTreeMap::new();

        for unit in units {
            let Some(file) = assemble_unit(unit, set, &mut context)? else {
                continue;
            };
            if let Some(earlier) = outputs.insert(file.path.clone(), file.source.clone()) {
                return Err(Error::MalformedDescriptor {
                    unit: unit.path.to_string(),
                    reason: format!("output path '{}' is already produced by {earlier}", file.path),
                });
            }
            let generated = self.render(&file)?;
            tracing::debug!(
                "Generated {} from {} ({} bytes)",
                generated.path,
                generated.source,
                generated.content.len()
            );
            code.add_file(generated);
        }

        tracing::info!("Successfully generated {} files", code.file_count());
        Ok(code)
    }

    /// Renders an assembled file.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmissionError` carrying the output path if rendering
    /// fails.
    pub fn render(&self, file: &GoFile) -> Result<GeneratedFile> {
        let content = self
            .engine
            .render(GO_FILE_TEMPLATE, &file.context())
            .map_err(|e| Error::EmissionError {
                path: file.path.clone(),
                message: e.to_string(),
                source: Some(Box::new(e)),
            })?;

        Ok(GeneratedFile {
            path: file.path.clone(),
            source: file.source.clone(),
            content,
        })
    }
}
