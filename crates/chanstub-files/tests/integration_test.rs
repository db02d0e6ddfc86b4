//! Generation followed by export to a real directory.

use chanstub_codegen::ChannelStubGenerator;
use chanstub_core::{GeneratorConfig, UnitPath};
use chanstub_descriptor::{
    CodeGenRequest, MethodDescriptor, ServiceDefinitionUnit, ServiceDescriptor,
};
use chanstub_files::{ExportOptions, FilesBuilder};
use std::fs;
use tempfile::TempDir;

fn unit(path: &str, package: &str, service: &str) -> ServiceDefinitionUnit {
    ServiceDefinitionUnit::new(UnitPath::new(path).unwrap(), package)
        .with_go_package(format!("example.com/{package}"))
        .with_message("Req")
        .with_message("Resp")
        .with_service(ServiceDescriptor::new(service, package).with_method(
            MethodDescriptor::unary("Call", format!(".{package}.Req"), format!(".{package}.Resp")),
        ))
}

fn generate(parameter: &str) -> chanstub_codegen::GeneratedCode {
    let units = vec![
        unit("echo/echo.proto", "echo", "Echo"),
        unit("admin/admin.proto", "admin", "Admin"),
    ];
    let files = units.iter().map(|u| u.path.to_string()).collect();
    let request = CodeGenRequest::from_units(units, files).unwrap();
    let config = GeneratorConfig::from_parameter(Some(parameter)).unwrap();
    ChannelStubGenerator::new(config)
        .unwrap()
        .generate(&request)
        .unwrap()
}

#[test]
fn test_source_relative_layout_on_disk() {
    let temp = TempDir::new().unwrap();
    let code = generate("paths=source_relative");
    let expected = code.files[0].content.clone();

    let tree = FilesBuilder::from_generated_code(code, "/")
        .build_and_export(temp.path(), &ExportOptions::default())
        .unwrap();

    assert_eq!(tree.file_count(), 2);
    let written = fs::read_to_string(temp.path().join("echo/echo.pb.grpchan.go")).unwrap();
    assert_eq!(written, expected);
    assert!(temp.path().join("admin/admin.pb.grpchan.go").exists());
}

#[test]
fn test_import_layout_on_disk() {
    let temp = TempDir::new().unwrap();
    FilesBuilder::from_generated_code(generate(""), "/")
        .build_and_export(temp.path(), &ExportOptions::default())
        .unwrap();

    assert!(temp
        .path()
        .join("example.com/echo/echo.pb.grpchan.go")
        .exists());
    assert!(temp
        .path()
        .join("example.com/admin/admin.pb.grpchan.go")
        .exists());
}

#[test]
fn test_reexport_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let tree = FilesBuilder::from_generated_code(generate("module=example.com"), "/")
        .build()
        .unwrap();

    tree.export_to_filesystem(temp.path()).unwrap();
    let first = fs::read_to_string(temp.path().join("echo/echo.pb.grpchan.go")).unwrap();
    tree.export_to_filesystem(temp.path()).unwrap();
    let second = fs::read_to_string(temp.path().join("echo/echo.pb.grpchan.go")).unwrap();

    assert_eq!(first, second);
    assert_eq!(tree.file_count(), 2);
}
