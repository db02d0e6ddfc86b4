//! File assembly.
//!
//! Collects the declarations of every service in a unit into one
//! [`GoFile`], with the import block and provenance data the template needs.

use crate::decl::GoFile;
use crate::naming::{FileScope, NameContext};
use crate::synth::{declare_service_names, reserve_companion_names, synthesize_service};
use chanstub_core::Result;
use chanstub_descriptor::{DescriptorSet, ServiceDefinitionUnit};

/// Assembles the output file of one unit.
///
/// Returns `None` for a unit without services.
///
/// # Errors
///
/// Returns the first naming, resolution, or synthesis error of the unit.
pub fn assemble_unit(
    unit: &ServiceDefinitionUnit,
    set: &DescriptorSet,
    context: &mut NameContext<'_>,
) -> Result<Option<GoFile>> {
    if unit.is_empty() {
        tracing::debug!("skipping {}: no services", unit.path);
        return Ok(None);
    }

    let package = context.package_for(unit)?;
    let path = context.output_path(unit)?;
    let mut scope = FileScope::new(&unit.path, package.clone());

    for service in &unit.services {
        reserve_companion_names(&mut scope, service)?;
    }
    let names = unit
        .services
        .iter()
        .map(|service| declare_service_names(&mut scope, service))
        .collect::<Result<Vec<_>>>()?;

    let mut decls = Vec::new();
    for (service, names) in unit.services.iter().zip(&names) {
        decls.extend(synthesize_service(&mut scope, context, set, service, names)?);
    }

    Ok(Some(GoFile {
        path,
        source: unit.path.to_string(),
        generator: context.config().generator_name.clone(),
        package: package.name,
        imports: scope.imports(),
        decls,
    }))
}
