//! End-to-end generation tests.
//!
//! Requests are built the way protoc sends them, decoded, generated, and the
//! output is compared against checked-in Go source.

use chanstub_codegen::{ChannelStubGenerator, GeneratedCode};
use chanstub_core::GeneratorConfig;
use chanstub_descriptor::decode_request;
use prost::Message;
use prost_types::compiler::CodeGeneratorRequest;
use prost_types::{
    DescriptorProto, FileDescriptorProto, FileOptions, MethodDescriptorProto,
    ServiceDescriptorProto,
};

const ECHO_GOLDEN: &str = include_str!("golden/echo.pb.grpchan.go");

fn message(name: &str) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_string()),
        ..Default::default()
    }
}

fn method(name: &str, input: &str, output: &str, client: bool, server: bool) -> MethodDescriptorProto {
    MethodDescriptorProto {
        name: Some(name.to_string()),
        input_type: Some(input.to_string()),
        output_type: Some(output.to_string()),
        client_streaming: Some(client),
        server_streaming: Some(server),
        ..Default::default()
    }
}

fn file(name: &str, package: &str, go_package: &str) -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some(name.to_string()),
        package: Some(package.to_string()),
        options: Some(FileOptions {
            go_package: Some(go_package.to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn common_file() -> FileDescriptorProto {
    let mut common = file("common/types.proto", "common", "example.com/common;commonpb");
    common.message_type = vec![message("Empty")];
    common
}

fn echo_file() -> FileDescriptorProto {
    let mut echo = file("echo/echo.proto", "echo", "example.com/echo");
    echo.dependency = vec!["common/types.proto".to_string()];
    echo.message_type = vec![message("EchoRequest"), message("EchoResponse")];
    echo.service = vec![ServiceDescriptorProto {
        name: Some("Echo".to_string()),
        method: vec![
            method("Say", ".echo.EchoRequest", ".echo.EchoResponse", false, false),
            method("Watch", ".echo.EchoRequest", ".echo.EchoResponse", false, true),
            method("Upload", ".echo.EchoRequest", ".common.Empty", true, false),
            method("Chat", ".echo.EchoRequest", ".echo.EchoResponse", true, true),
            method("Ping", ".common.Empty", ".common.Empty", false, false),
        ],
        ..Default::default()
    }];
    echo
}

fn generate(files: Vec<FileDescriptorProto>, to_generate: &[&str], parameter: &str) -> GeneratedCode {
    let bytes = CodeGeneratorRequest {
        file_to_generate: to_generate.iter().map(ToString::to_string).collect(),
        parameter: Some(parameter.to_string()),
        proto_file: files,
        ..Default::default()
    }
    .encode_to_vec();

    let request = decode_request(&bytes).unwrap();
    let config = GeneratorConfig::from_parameter(request.parameter.as_deref()).unwrap();
    ChannelStubGenerator::new(config)
        .unwrap()
        .generate(&request)
        .unwrap()
}

#[test]
fn test_echo_matches_golden() {
    let code = generate(
        vec![common_file(), echo_file()],
        &["echo/echo.proto"],
        "paths=source_relative",
    );

    assert_eq!(code.file_count(), 1);
    assert_eq!(code.files[0].path, "echo/echo.pb.grpchan.go");
    assert_eq!(code.files[0].content, ECHO_GOLDEN);
}

#[test]
fn test_import_paths_with_module_prefix() {
    let code = generate(
        vec![common_file(), echo_file()],
        &["echo/echo.proto"],
        "module=example.com",
    );
    assert_eq!(code.files[0].path, "echo/echo.pb.grpchan.go");
}

#[test]
fn test_dependency_only_units_produce_nothing() {
    let code = generate(
        vec![common_file(), echo_file()],
        &["common/types.proto"],
        "",
    );
    assert_eq!(code.file_count(), 0);
}

#[test]
fn test_mapping_changes_package_and_path() {
    let code = generate(
        vec![common_file(), echo_file()],
        &["echo/echo.proto"],
        "Mecho/echo.proto=example.com/mapped/echo;echov1,Mcommon/types.proto=example.com/shared",
    );

    let file = &code.files[0];
    assert_eq!(file.path, "example.com/mapped/echo/echo.pb.grpchan.go");
    assert!(file.content.contains("\npackage echov1\n"));
    assert!(file.content.contains("\t\"example.com/shared\"\n"));
    assert!(file.content.contains("in *shared.Empty"));
}

#[test]
fn test_minimal_unary_service() {
    let mut unit = FileDescriptorProto {
        name: Some("echo.proto".to_string()),
        message_type: vec![message("EchoRequest"), message("EchoResponse")],
        ..Default::default()
    };
    unit.service = vec![ServiceDescriptorProto {
        name: Some("Echo".to_string()),
        method: vec![method("Say", ".EchoRequest", ".EchoResponse", false, false)],
        ..Default::default()
    }];

    let code = generate(vec![unit], &["echo.proto"], "");
    let content = &code.files[0].content;

    assert_eq!(content.matches("func RegisterHandlerEcho(").count(), 1);
    assert_eq!(content.matches("func NewEchoChannelClient(").count(), 1);
    assert_eq!(content.matches("type echoChannelClient struct").count(), 1);
    assert_eq!(content.matches("func (c *echoChannelClient)").count(), 1);
    assert!(content.contains("c.ch.Invoke(ctx, \"/Echo/Say\", in, out, opts...)"));
    assert!(content.contains("\treturn out, nil\n"));
    assert!(content.contains("\t\treturn nil, err\n"));
}

#[test]
fn test_local_package_alias_avoids_locals() {
    let mut stream_types = file("stream/types.proto", "stream", "example.com/stream");
    stream_types.message_type = vec![message("Frame")];

    let mut svc = file("svc/svc.proto", "svc", "example.com/svc");
    svc.service = vec![ServiceDescriptorProto {
        name: Some("Relay".to_string()),
        method: vec![method("Send", ".stream.Frame", ".stream.Frame", false, false)],
        ..Default::default()
    }];

    let code = generate(vec![stream_types, svc], &["svc/svc.proto"], "");
    let content = &code.files[0].content;
    assert!(content.contains("\tstream1 \"example.com/stream\"\n"));
    assert!(content.contains("in *stream1.Frame"));
}
