//! Conversion from protobuf descriptors into the model.

use crate::model::{MethodDescriptor, ServiceDefinitionUnit, ServiceDescriptor};
use chanstub_core::{Result, UnitPath};
use prost_types::{DescriptorProto, FileDescriptorProto};

/// Converts one `FileDescriptorProto` into a unit.
///
/// Only structure is copied here. Names are validated later, when code is
/// generated for the unit, so that dependencies with odd names never fail a
/// run that does not generate them.
///
/// # Errors
///
/// Returns `Error::MalformedDescriptor` if the file has no name.
///
/// # Examples
///
/// ```
/// use chanstub_descriptor::convert::unit_from_file;
/// use prost_types::{
///     DescriptorProto, FileDescriptorProto, MethodDescriptorProto, ServiceDescriptorProto,
/// };
///
/// let file = FileDescriptorProto {
///     name: Some("echo.proto".to_string()),
///     message_type: vec![DescriptorProto {
///         name: Some("Ping".to_string()),
///         ..Default::default()
///     }],
///     service: vec![ServiceDescriptorProto {
///         name: Some("Echo".to_string()),
///         method: vec![MethodDescriptorProto {
///             name: Some("Say".to_string()),
///             input_type: Some(".Ping".to_string()),
///             output_type: Some(".Ping".to_string()),
///             ..Default::default()
///         }],
///         ..Default::default()
///     }],
///     ..Default::default()
/// };
///
/// let unit = unit_from_file(&file).unwrap();
/// assert_eq!(unit.services[0].methods[0].name, "Say");
/// assert_eq!(unit.messages[0].full_name, "Ping");
/// ```
pub fn unit_from_file(file: &FileDescriptorProto) -> Result<ServiceDefinitionUnit> {
    let path = UnitPath::new(file.name())?;
    let package = file.package();

    let mut unit = ServiceDefinitionUnit::new(path, package);
    unit.go_package = file
        .options
        .as_ref()
        .and_then(|options| options.go_package.clone())
        .filter(|go_package| !go_package.is_empty());

    let mut dotted = Vec::new();
    for message in &file.message_type {
        collect_messages(message, "", &mut dotted);
    }
    for name in &dotted {
        unit = unit.with_message(name);
    }

    for service in &file.service {
        let mut descriptor = ServiceDescriptor::new(service.name(), package);
        for method in &service.method {
            descriptor.methods.push(MethodDescriptor::new(
                method.name(),
                method.input_type(),
                method.output_type(),
                method.client_streaming(),
                method.server_streaming(),
            ));
        }
        unit.services.push(descriptor);
    }

    Ok(unit)
}

fn collect_messages(message: &DescriptorProto, prefix: &str, out: &mut Vec<String>) {
    let dotted = if prefix.is_empty() {
        message.name().to_string()
    } else {
        format!("{prefix}.{}", message.name())
    };
    for nested in &message.nested_type {
        collect_messages(nested, &dotted, out);
    }
    out.push(dotted);
}
