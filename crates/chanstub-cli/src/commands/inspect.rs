//! Inspect command implementation.
//!
//! Shows what the generator would do for each requested unit without
//! rendering anything: the Go package, the output path, and per method the
//! call shape and stream index.

use super::common::InputArgs;
use crate::formatters::format_output;
use anyhow::Result;
use chanstub_codegen::naming::{GoPackage, NameContext};
use chanstub_codegen::{MethodPlan, plan_service};
use chanstub_core::cli::{ExitCode, OutputFormat};
use chanstub_descriptor::ServiceDefinitionUnit;
use serde::Serialize;
use tracing::error;

/// Report for a whole request.
#[derive(Debug, Serialize)]
pub struct InspectReport {
    /// Requested units in request order
    pub units: Vec<UnitReport>,
}

/// Report for one unit.
#[derive(Debug, Serialize)]
pub struct UnitReport {
    /// Unit path
    pub path: String,
    /// Resolved Go package
    pub go_package: GoPackage,
    /// Output file path, or `None` when the unit has no services
    pub output: Option<String>,
    /// Services in declaration order
    pub services: Vec<ServiceReport>,
}

/// Report for one service.
#[derive(Debug, Serialize)]
pub struct ServiceReport {
    /// Service name
    pub name: String,
    /// Wire identifier of the service
    pub full_name: String,
    /// Method plans in declaration order
    pub methods: Vec<MethodPlan>,
}

/// Builds the report for `units` under the naming rules of `context`.
///
/// # Errors
///
/// Returns the first Go package or output path error.
pub fn inspect_units(
    units: &[&ServiceDefinitionUnit],
    context: &mut NameContext<'_>,
) -> chanstub_core::Result<InspectReport> {
    let units = units
        .iter()
        .map(|unit| -> chanstub_core::Result<UnitReport> {
            let output = if unit.is_empty() {
                None
            } else {
                Some(context.output_path(unit)?)
            };
            Ok(UnitReport {
                path: unit.path.to_string(),
                go_package: context.package_for(unit)?,
                output,
                services: unit
                    .services
                    .iter()
                    .map(|service| ServiceReport {
                        name: service.name.clone(),
                        full_name: service.full_name.clone(),
                        methods: plan_service(service),
                    })
                    .collect(),
            })
        })
        .collect::<chanstub_core::Result<Vec<_>>>()?;
    Ok(InspectReport { units })
}

/// Runs the inspect command.
///
/// # Errors
///
/// Returns an error if the inputs cannot be read or the report cannot be
/// formatted.
pub fn run(args: &InputArgs, output_format: OutputFormat) -> Result<ExitCode> {
    let config = args.load_config()?;
    let request = args.load_request()?;
    let mut context = NameContext::new(&config);

    let report = request
        .units_to_generate()
        .and_then(|units| inspect_units(&units, &mut context));
    let report = match report {
        Ok(report) => report,
        Err(e) => {
            error!("{e}");
            return Ok(ExitCode::GENERATION_FAILED);
        }
    };

    println!("{}", format_output(&report, output_format)?);
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chanstub_codegen::CallShape;
    use chanstub_core::{GeneratorConfig, UnitPath};
    use chanstub_descriptor::{MethodDescriptor, ServiceDescriptor};

    fn unit() -> ServiceDefinitionUnit {
        ServiceDefinitionUnit::new(UnitPath::new("echo/echo.proto").unwrap(), "echo")
            .with_go_package("example.com/echo;echopb")
            .with_service(
                ServiceDescriptor::new("Echo", "echo")
                    .with_method(MethodDescriptor::unary("Say", ".echo.Req", ".echo.Resp"))
                    .with_method(MethodDescriptor::server_streaming(
                        "Watch",
                        ".echo.Req",
                        ".echo.Resp",
                    ))
                    .with_method(MethodDescriptor::bidi_streaming(
                        "Chat",
                        ".echo.Req",
                        ".echo.Resp",
                    )),
            )
    }

    #[test]
    fn test_inspect_unit() {
        let config = GeneratorConfig::default();
        let mut context = NameContext::new(&config);
        let unit = unit();
        let report = inspect_units(&[&unit], &mut context).unwrap();

        let unit_report = &report.units[0];
        assert_eq!(unit_report.go_package.name, "echopb");
        assert_eq!(
            unit_report.output.as_deref(),
            Some("example.com/echo/echo.pb.grpchan.go")
        );

        let methods = &unit_report.services[0].methods;
        let shapes: Vec<_> = methods.iter().map(|m| (m.shape, m.stream_index)).collect();
        assert_eq!(
            shapes,
            vec![
                (CallShape::Unary, None),
                (CallShape::ServerStreaming, Some(0)),
                (CallShape::ClientOrBidiStreaming, Some(1)),
            ]
        );
        assert_eq!(methods[2].wire_path, "/echo.Echo/Chat");
    }

    #[test]
    fn test_empty_unit_has_no_output() {
        let config = GeneratorConfig::default();
        let mut context = NameContext::new(&config);
        let unit = ServiceDefinitionUnit::new(UnitPath::new("types.proto").unwrap(), "types");
        let report = inspect_units(&[&unit], &mut context).unwrap();
        assert!(report.units[0].output.is_none());
        assert!(report.units[0].services.is_empty());
    }

    #[test]
    fn test_report_serializes_shapes_snake_case() {
        let config = GeneratorConfig::default();
        let mut context = NameContext::new(&config);
        let unit = unit();
        let report = inspect_units(&[&unit], &mut context).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"shape\":\"server_streaming\""));
        assert!(json.contains("\"stream_index\":0"));
    }
}
