//! Declaration synthesis.
//!
//! Builds the Go declarations for one service: a registration function, a
//! client-holder struct wrapping a `grpchan.Channel`, a constructor, and one
//! method per RPC whose body depends on the method's [`CallShape`].
//!
//! Names are claimed in two passes over a unit's services. The first pass
//! reserves every package-level name the companion protoc-gen-go-grpc output
//! declares in the same package; the second declares the names generated
//! here. Exported names are part of the public surface and fail on
//! collision; the unexported holder type is renamed instead.

use crate::decl::{Decl, FuncDecl, Param, Stmt, StructDecl};
use crate::naming::{FileScope, GoSymbol, NameContext, exported_name, unexport};
use crate::shape::{CallShape, StreamIndexer, classify};
use chanstub_core::{Error, Result, WirePath};
use chanstub_descriptor::{DescriptorSet, MethodDescriptor, ServiceDescriptor};
use std::collections::BTreeMap;

/// Generated and companion names of one service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceNames {
    /// Go name of the service
    pub service: String,
    /// `RegisterHandler<S>`
    pub registration: String,
    /// `New<S>ChannelClient`
    pub constructor: String,
    /// Client-holder struct, `<s>ChannelClient` unless renamed
    pub holder: String,
    /// `<S>Server`, declared by the companion output
    pub server: String,
    /// `<S>Client`, declared by the companion output
    pub client: String,
    /// `_<S>_serviceDesc`, declared by the companion output
    pub service_desc: String,
}

/// Reserves the package-level names protoc-gen-go-grpc declares for
/// `service`.
///
/// # Errors
///
/// Returns `Error::MalformedDescriptor` for unusable service or method names
/// and `Error::NameCollision` if two services or methods map to the same Go
/// name.
pub fn reserve_companion_names(scope: &mut FileScope, service: &ServiceDescriptor) -> Result<()> {
    let unit = scope.unit().clone();
    let name = exported_name(&unit, "service", &service.name)?;
    let lower = unexport(&name);
    let owner = |what: &str| format!("{what} of service '{}'", service.name);

    scope.declare(&format!("{name}Server"), owner("server interface"))?;
    scope.declare(&format!("{name}Client"), owner("client interface"))?;
    scope.declare(&format!("New{name}Client"), owner("client constructor"))?;
    scope.declare(&format!("Register{name}Server"), owner("server registration"))?;
    scope.declare(&format!("_{name}_serviceDesc"), owner("service descriptor"))?;
    scope.declare(&format!("{lower}Client"), owner("client implementation"))?;

    let mut methods: BTreeMap<String, &str> = BTreeMap::new();
    for method in &service.methods {
        let method_name = exported_name(&unit, "method", &method.name)?;
        if let Some(existing) = methods.insert(method_name.clone(), &method.name) {
            return Err(Error::NameCollision {
                unit: unit.to_string(),
                symbol: format!("{name}.{method_name}"),
                existing: format!("method '{}.{existing}'", service.name),
            });
        }
        if !classify(method).is_streaming() {
            continue;
        }
        let owner = format!("stream of method '{}.{}'", service.name, method.name);
        scope.declare(&format!("{name}_{method_name}Client"), owner.clone())?;
        scope.declare(&format!("{name}_{method_name}Server"), owner.clone())?;
        scope.declare(&format!("{lower}{method_name}Client"), owner.clone())?;
        scope.declare(&format!("{lower}{method_name}Server"), owner)?;
    }

    Ok(())
}

/// Declares the names generated for `service`.
///
/// # Errors
///
/// Returns `Error::NameCollision` if the registration function or the
/// constructor name is already taken.
pub fn declare_service_names(
    scope: &mut FileScope,
    service: &ServiceDescriptor,
) -> Result<ServiceNames> {
    let name = exported_name(scope.unit(), "service", &service.name)?;
    let owner = |what: &str| format!("{what} of service '{}'", service.name);

    let registration = format!("RegisterHandler{name}");
    scope.declare(&registration, owner("channel registration"))?;
    let constructor = format!("New{name}ChannelClient");
    scope.declare(&constructor, owner("channel client constructor"))?;
    let holder = scope.declare_unique(
        &format!("{}ChannelClient", unexport(&name)),
        owner("channel client"),
    );

    Ok(ServiceNames {
        registration,
        constructor,
        holder,
        server: format!("{name}Server"),
        client: format!("{name}Client"),
        service_desc: format!("_{name}_serviceDesc"),
        service: name,
    })
}

/// `func RegisterHandler<S>(reg grpchan.ServiceRegistry, srv <S>Server)`
pub fn registration(scope: &mut FileScope, names: &ServiceNames) -> FuncDecl {
    FuncDecl::new(&names.registration)
        .param("reg", scope.symbol(&GoSymbol::SERVICE_REGISTRY))
        .param("srv", &names.server)
        .stmt(Stmt::line(format!(
            "reg.RegisterService(&{}, srv)",
            names.service_desc
        )))
}

/// `type <s>ChannelClient struct { ch grpchan.Channel }`
pub fn client_holder(scope: &mut FileScope, names: &ServiceNames) -> StructDecl {
    StructDecl {
        name: names.holder.clone(),
        fields: vec![Param::new("ch", scope.symbol(&GoSymbol::CHANNEL))],
    }
}

/// `func New<S>ChannelClient(ch grpchan.Channel) <S>Client`
pub fn constructor(scope: &mut FileScope, names: &ServiceNames) -> FuncDecl {
    FuncDecl::new(&names.constructor)
        .param("ch", scope.symbol(&GoSymbol::CHANNEL))
        .result(&names.client)
        .stmt(Stmt::Return(vec![format!("&{}{{ch: ch}}", names.holder)]))
}

/// Everything a method body needs, resolved for the current file.
#[derive(Debug, Clone)]
pub struct MethodCall {
    /// Go method name
    pub go_name: String,
    /// Wire path on the channel
    pub wire_path: WirePath,
    /// Qualified request type, for shapes that take a request
    pub input: String,
    /// Qualified response type, for the unary shape
    pub output: String,
    /// Stream client interface, `<S>_<M>Client`
    pub stream_client: String,
    /// Stream client implementation, `<s><M>Client`
    pub stream_impl: String,
}

fn method_head(scope: &mut FileScope, names: &ServiceNames, call: &MethodCall) -> FuncDecl {
    FuncDecl::new(&call.go_name)
        .receiver("c", format!("*{}", names.holder))
        .param("ctx", scope.symbol(&GoSymbol::CONTEXT))
}

fn open_stream(method: FuncDecl, names: &ServiceNames, call: &MethodCall, index: usize) -> FuncDecl {
    method
        .stmt(Stmt::line(format!(
            "stream, err := c.ch.NewStream(ctx, &{}.Streams[{index}], \"{}\", opts...)",
            names.service_desc, call.wire_path
        )))
        .stmt(Stmt::ReturnOnError { init: None })
        .stmt(Stmt::line(format!("x := &{}{{stream}}", call.stream_impl)))
}

/// A unary method: `Invoke` into a fresh response value.
pub fn unary_method(scope: &mut FileScope, names: &ServiceNames, call: &MethodCall) -> FuncDecl {
    method_head(scope, names, call)
        .param("in", format!("*{}", call.input))
        .variadic_param("opts", scope.symbol(&GoSymbol::CALL_OPTION))
        .result(format!("*{}", call.output))
        .result("error")
        .stmt(Stmt::line(format!("out := new({})", call.output)))
        .stmt(Stmt::line(format!(
            "err := c.ch.Invoke(ctx, \"{}\", in, out, opts...)",
            call.wire_path
        )))
        .stmt(Stmt::ReturnOnError { init: None })
        .stmt(Stmt::Return(vec!["out".to_string(), "nil".to_string()]))
}

/// A server-streaming method: open the stream, send the single request,
/// close the sending side, hand the stream to the caller.
pub fn server_streaming_method(
    scope: &mut FileScope,
    names: &ServiceNames,
    call: &MethodCall,
    index: usize,
) -> FuncDecl {
    let head = method_head(scope, names, call)
        .param("in", format!("*{}", call.input))
        .variadic_param("opts", scope.symbol(&GoSymbol::CALL_OPTION))
        .result(&call.stream_client)
        .result("error");

    open_stream(head, names, call, index)
        .stmt(Stmt::ReturnOnError {
            init: Some("err := x.ClientStream.SendMsg(in)".to_string()),
        })
        .stmt(Stmt::ReturnOnError {
            init: Some("err := x.ClientStream.CloseSend()".to_string()),
        })
        .stmt(Stmt::Return(vec!["x".to_string(), "nil".to_string()]))
}

/// A client- or bidi-streaming method: open the stream and hand it to the
/// caller.
pub fn client_or_bidi_streaming_method(
    scope: &mut FileScope,
    names: &ServiceNames,
    call: &MethodCall,
    index: usize,
) -> FuncDecl {
    let head = method_head(scope, names, call)
        .variadic_param("opts", scope.symbol(&GoSymbol::CALL_OPTION))
        .result(&call.stream_client)
        .result("error");

    open_stream(head, names, call, index)
        .stmt(Stmt::Return(vec!["x".to_string(), "nil".to_string()]))
}

fn method_call(
    scope: &mut FileScope,
    context: &mut NameContext<'_>,
    set: &DescriptorSet,
    service: &ServiceDescriptor,
    names: &ServiceNames,
    method: &MethodDescriptor,
    shape: CallShape,
) -> Result<MethodCall> {
    for type_name in [&method.input_type, &method.output_type] {
        if set.resolve(type_name).is_none() {
            return Err(Error::UnresolvedType {
                unit: scope.unit().to_string(),
                type_name: type_name.clone(),
            });
        }
    }

    let go_name = exported_name(scope.unit(), "method", &method.name)?;

    // Only types that appear in the generated code are imported.
    let input = if shape == CallShape::ClientOrBidiStreaming {
        String::new()
    } else {
        scope.message_type(context, set, &method.input_type)?
    };
    let output = if shape == CallShape::Unary {
        scope.message_type(context, set, &method.output_type)?
    } else {
        String::new()
    };

    Ok(MethodCall {
        stream_client: format!("{}_{go_name}Client", names.service),
        stream_impl: format!("{}{go_name}Client", unexport(&names.service)),
        wire_path: service.wire_path(method),
        go_name,
        input,
        output,
    })
}

/// Synthesizes all declarations of one service in output order.
///
/// # Errors
///
/// Returns `Error::UnresolvedType` if a method refers to a message that is
/// not in the request, and `Error::MalformedDescriptor` for unusable names.
pub fn synthesize_service(
    scope: &mut FileScope,
    context: &mut NameContext<'_>,
    set: &DescriptorSet,
    service: &ServiceDescriptor,
    names: &ServiceNames,
) -> Result<Vec<Decl>> {
    let mut decls = Vec::with_capacity(service.methods.len() + 3);
    decls.push(registration(scope, names).into());
    decls.push(client_holder(scope, names).into());
    decls.push(constructor(scope, names).into());

    let mut indexer = StreamIndexer::new();
    for method in &service.methods {
        let shape = classify(method);
        let call = method_call(scope, context, set, service, names, method, shape)?;

        let (decl, stream_index) = match shape {
            CallShape::Unary => (unary_method(scope, names, &call), None),
            CallShape::ServerStreaming => {
                let index = indexer.claim();
                (server_streaming_method(scope, names, &call, index), Some(index))
            }
            CallShape::ClientOrBidiStreaming => {
                let index = indexer.claim();
                (
                    client_or_bidi_streaming_method(scope, names, &call, index),
                    Some(index),
                )
            }
        };

        tracing::debug!(
            "synthesized {}.{} as {} (stream index {:?})",
            names.service,
            call.go_name,
            shape,
            stream_index
        );
        decls.push(decl.into());
    }

    Ok(decls)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::GoPackage;
    use chanstub_core::{GeneratorConfig, UnitPath};
    use chanstub_descriptor::ServiceDefinitionUnit;

    fn echo_set() -> DescriptorSet {
        let unit = ServiceDefinitionUnit::new(UnitPath::new("echo.proto").unwrap(), "echo")
            .with_go_package("example.com/echo")
            .with_message("Req")
            .with_message("Resp");
        let common = ServiceDefinitionUnit::new(UnitPath::new("common.proto").unwrap(), "common")
            .with_go_package("example.com/common;commonpb")
            .with_message("Empty");
        let mut set = DescriptorSet::new();
        set.add_unit(unit).unwrap();
        set.add_unit(common).unwrap();
        set
    }

    fn scope() -> FileScope {
        FileScope::new(
            &UnitPath::new("echo.proto").unwrap(),
            GoPackage::parse("example.com/echo"),
        )
    }

    fn synthesize(service: &ServiceDescriptor) -> Result<Vec<Decl>> {
        let config = GeneratorConfig::default();
        let mut context = NameContext::new(&config);
        let set = echo_set();
        let mut scope = scope();
        reserve_companion_names(&mut scope, service)?;
        let names = declare_service_names(&mut scope, service)?;
        synthesize_service(&mut scope, &mut context, &set, service, &names)
    }

    fn body(decl: &Decl) -> Vec<Stmt> {
        match decl {
            Decl::Func(func) => func.body.clone(),
            Decl::Struct(_) => Vec::new(),
        }
    }

    #[test]
    fn test_service_declarations_in_order() {
        let service = ServiceDescriptor::new("Echo", "echo")
            .with_method(MethodDescriptor::unary("Say", ".echo.Req", ".echo.Resp"));
        let decls = synthesize(&service).unwrap();

        let names: Vec<_> = decls.iter().map(Decl::name).collect();
        assert_eq!(
            names,
            vec!["RegisterHandlerEcho", "echoChannelClient", "NewEchoChannelClient", "Say"]
        );
    }

    #[test]
    fn test_unary_body() {
        let service = ServiceDescriptor::new("Echo", "echo")
            .with_method(MethodDescriptor::unary("Say", ".echo.Req", ".echo.Resp"));
        let decls = synthesize(&service).unwrap();

        let Decl::Func(say) = &decls[3] else {
            panic!("expected a method");
        };
        assert_eq!(
            say.signature(),
            "func (c *echoChannelClient) Say(ctx context.Context, in *Req, opts ...grpc.CallOption) (*Resp, error)"
        );
        assert_eq!(
            say.body,
            vec![
                Stmt::line("out := new(Resp)"),
                Stmt::line("err := c.ch.Invoke(ctx, \"/echo.Echo/Say\", in, out, opts...)"),
                Stmt::ReturnOnError { init: None },
                Stmt::Return(vec!["out".to_string(), "nil".to_string()]),
            ]
        );
    }

    #[test]
    fn test_server_streaming_body() {
        let service = ServiceDescriptor::new("Echo", "echo")
            .with_method(MethodDescriptor::unary("Say", ".echo.Req", ".echo.Resp"))
            .with_method(MethodDescriptor::server_streaming("Watch", ".echo.Req", ".echo.Resp"));
        let decls = synthesize(&service).unwrap();

        let Decl::Func(watch) = &decls[4] else {
            panic!("expected a method");
        };
        assert_eq!(
            watch.signature(),
            "func (c *echoChannelClient) Watch(ctx context.Context, in *Req, opts ...grpc.CallOption) (Echo_WatchClient, error)"
        );
        let lines: Vec<_> = watch.body.iter().flat_map(Stmt::lines).collect();
        assert_eq!(
            lines,
            vec![
                "stream, err := c.ch.NewStream(ctx, &_Echo_serviceDesc.Streams[0], \"/echo.Echo/Watch\", opts...)",
                "if err != nil {",
                "\treturn nil, err",
                "}",
                "x := &echoWatchClient{stream}",
                "if err := x.ClientStream.SendMsg(in); err != nil {",
                "\treturn nil, err",
                "}",
                "if err := x.ClientStream.CloseSend(); err != nil {",
                "\treturn nil, err",
                "}",
                "return x, nil",
            ]
        );
    }

    #[test]
    fn test_bidi_has_no_request_parameter() {
        let service = ServiceDescriptor::new("Echo", "echo")
            .with_method(MethodDescriptor::server_streaming("Watch", ".echo.Req", ".echo.Resp"))
            .with_method(MethodDescriptor::bidi_streaming("Chat", ".echo.Req", ".echo.Resp"));
        let decls = synthesize(&service).unwrap();

        let Decl::Func(chat) = &decls[4] else {
            panic!("expected a method");
        };
        assert_eq!(
            chat.signature(),
            "func (c *echoChannelClient) Chat(ctx context.Context, opts ...grpc.CallOption) (Echo_ChatClient, error)"
        );
        assert_eq!(
            body(&decls[4])[0],
            Stmt::line(
                "stream, err := c.ch.NewStream(ctx, &_Echo_serviceDesc.Streams[1], \"/echo.Echo/Chat\", opts...)"
            )
        );
        assert_eq!(
            body(&decls[4]).last(),
            Some(&Stmt::Return(vec!["x".to_string(), "nil".to_string()]))
        );
    }

    #[test]
    fn test_streaming_types_not_imported() {
        let config = GeneratorConfig::default();
        let mut context = NameContext::new(&config);
        let set = echo_set();
        let mut scope = scope();
        let service = ServiceDescriptor::new("Echo", "echo").with_method(
            MethodDescriptor::client_streaming("Upload", ".common.Empty", ".common.Empty"),
        );
        reserve_companion_names(&mut scope, &service).unwrap();
        let names = declare_service_names(&mut scope, &service).unwrap();
        synthesize_service(&mut scope, &mut context, &set, &service, &names).unwrap();

        assert!(scope.imports().iter().all(|i| i.path != "example.com/common"));
    }

    #[test]
    fn test_cross_package_types_qualified() {
        let service = ServiceDescriptor::new("Echo", "echo")
            .with_method(MethodDescriptor::unary("Ping", ".common.Empty", ".common.Empty"));
        let decls = synthesize(&service).unwrap();
        let Decl::Func(ping) = &decls[3] else {
            panic!("expected a method");
        };
        assert!(ping.signature().contains("in *commonpb.Empty"));
        assert_eq!(ping.body[0], Stmt::line("out := new(commonpb.Empty)"));
    }

    #[test]
    fn test_unresolved_type() {
        let service = ServiceDescriptor::new("Echo", "echo")
            .with_method(MethodDescriptor::bidi_streaming("Chat", ".echo.Nope", ".echo.Resp"));
        let err = synthesize(&service).unwrap_err();
        assert!(matches!(err, Error::UnresolvedType { ref type_name, .. } if type_name == ".echo.Nope"));
    }

    #[test]
    fn test_holder_renamed_on_stream_impl_collision() {
        let service = ServiceDescriptor::new("Echo", "echo").with_method(
            MethodDescriptor::server_streaming("Channel", ".echo.Req", ".echo.Resp"),
        );
        let decls = synthesize(&service).unwrap();
        assert_eq!(decls[1].name(), "echoChannelClient_");
        let Decl::Func(constructor) = &decls[2] else {
            panic!("expected a function");
        };
        assert_eq!(
            constructor.body,
            vec![Stmt::Return(vec!["&echoChannelClient_{ch: ch}".to_string()])]
        );
    }

    #[test]
    fn test_exported_collision_is_error() {
        let mut scope = scope();
        let foo = ServiceDescriptor::new("Foo", "echo");
        let foo_channel = ServiceDescriptor::new("FooChannel", "echo");
        reserve_companion_names(&mut scope, &foo).unwrap();
        reserve_companion_names(&mut scope, &foo_channel).unwrap();

        let err = declare_service_names(&mut scope, &foo).unwrap_err();
        assert!(err.is_name_collision());
        assert!(err.to_string().contains("NewFooChannelClient"));
    }

    #[test]
    fn test_services_with_same_go_name_collide() {
        let mut scope = scope();
        reserve_companion_names(&mut scope, &ServiceDescriptor::new("foo_bar", "echo")).unwrap();
        let err = reserve_companion_names(&mut scope, &ServiceDescriptor::new("FooBar", "echo"))
            .unwrap_err();
        assert!(err.is_name_collision());
    }

    #[test]
    fn test_unary_methods_with_same_go_name_collide() {
        let service = ServiceDescriptor::new("Echo", "echo")
            .with_method(MethodDescriptor::unary("get_x", ".echo.Req", ".echo.Resp"))
            .with_method(MethodDescriptor::unary("GetX", ".echo.Req", ".echo.Resp"));
        let err = synthesize(&service).unwrap_err();
        assert!(err.is_name_collision());
        let message = err.to_string();
        assert!(message.contains("Echo.GetX"));
        assert!(message.contains("Echo.get_x"));
    }

    #[test]
    fn test_unary_and_streaming_with_same_go_name_collide() {
        let service = ServiceDescriptor::new("Echo", "echo")
            .with_method(MethodDescriptor::unary("say", ".echo.Req", ".echo.Resp"))
            .with_method(MethodDescriptor::server_streaming("Say", ".echo.Req", ".echo.Resp"));
        let err = synthesize(&service).unwrap_err();
        assert!(err.is_name_collision());
    }

    #[test]
    fn test_same_method_name_in_two_services_is_fine() {
        let mut scope = scope();
        let first = ServiceDescriptor::new("Echo", "echo")
            .with_method(MethodDescriptor::unary("Say", ".echo.Req", ".echo.Resp"));
        let second = ServiceDescriptor::new("Shout", "echo")
            .with_method(MethodDescriptor::unary("Say", ".echo.Req", ".echo.Resp"));
        reserve_companion_names(&mut scope, &first).unwrap();
        reserve_companion_names(&mut scope, &second).unwrap();
    }

    #[test]
    fn test_stream_indices_follow_declaration_order() {
        let service = ServiceDescriptor::new("Echo", "echo")
            .with_method(MethodDescriptor::unary("Say", ".echo.Req", ".echo.Resp"))
            .with_method(MethodDescriptor::client_streaming("Upload", ".echo.Req", ".echo.Resp"))
            .with_method(MethodDescriptor::unary("Ping", ".echo.Req", ".echo.Resp"))
            .with_method(MethodDescriptor::server_streaming("Watch", ".echo.Req", ".echo.Resp"));
        let decls = synthesize(&service).unwrap();

        assert_eq!(body(&decls[3])[0], Stmt::line("out := new(Resp)"));
        assert!(body(&decls[4])[0].lines()[0].contains("Streams[0], \"/echo.Echo/Upload\""));
        assert_eq!(body(&decls[5])[0], Stmt::line("out := new(Resp)"));
        assert!(body(&decls[6])[0].lines()[0].contains("Streams[1], \"/echo.Echo/Watch\""));
    }

    #[test]
    fn test_unusable_method_name() {
        let service = ServiceDescriptor::new("Echo", "echo")
            .with_method(MethodDescriptor::unary("", ".echo.Req", ".echo.Resp"));
        let mut scope = scope();
        let err = reserve_companion_names(&mut scope, &service).unwrap_err();
        assert!(err.is_malformed_descriptor());
        assert!(err.to_string().contains("method has no name"));
    }
}
