//! Descriptor model types.
//!
//! One [`ServiceDefinitionUnit`] per `.proto` file. Units are built once per
//! request and never mutated while code is generated for them; the builder
//! methods exist for constructing units by hand (tests, the CLI) and consume
//! `self`.

use chanstub_core::{UnitPath, WirePath};
use serde::Serialize;

/// One input compilation unit: a `.proto` file and the services it declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDefinitionUnit {
    /// Identifying path of the unit, as reported by protoc
    pub path: UnitPath,
    /// Proto package (may be empty)
    pub package: String,
    /// Value of the `go_package` file option, if set
    pub go_package: Option<String>,
    /// Services in declaration order
    pub services: Vec<ServiceDescriptor>,
    /// Messages declared in this unit, nested messages included
    pub messages: Vec<MessageRef>,
}

impl ServiceDefinitionUnit {
    /// Creates an empty unit.
    #[must_use]
    pub fn new(path: UnitPath, package: impl Into<String>) -> Self {
        Self {
            path,
            package: package.into(),
            go_package: None,
            services: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// Sets the `go_package` option.
    #[must_use]
    pub fn with_go_package(mut self, go_package: impl Into<String>) -> Self {
        self.go_package = Some(go_package.into());
        self
    }

    /// Appends a service.
    #[must_use]
    pub fn with_service(mut self, service: ServiceDescriptor) -> Self {
        self.services.push(service);
        self
    }

    /// Declares a message by its dotted path inside the unit
    /// (`"Outer.Inner"` for a nested message).
    ///
    /// # Examples
    ///
    /// ```
    /// use chanstub_core::UnitPath;
    /// use chanstub_descriptor::ServiceDefinitionUnit;
    ///
    /// let unit = ServiceDefinitionUnit::new(UnitPath::new("a.proto").unwrap(), "pkg")
    ///     .with_message("Outer.Inner");
    ///
    /// assert_eq!(unit.messages[0].full_name, "pkg.Outer.Inner");
    /// assert_eq!(unit.messages[0].nesting, vec!["Outer", "Inner"]);
    /// ```
    #[must_use]
    pub fn with_message(mut self, dotted: &str) -> Self {
        let nesting = dotted.split('.').map(str::to_string).collect();
        self.messages.push(MessageRef {
            full_name: qualify(&self.package, dotted),
            unit: self.path.clone(),
            nesting,
        });
        self
    }

    /// Returns `true` if the unit declares no services.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

/// An RPC service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDescriptor {
    /// Service name as declared
    pub name: String,
    /// Fully-qualified wire identifier (`package.Name`, or `Name` without a package)
    pub full_name: String,
    /// Methods in declaration order
    pub methods: Vec<MethodDescriptor>,
}

impl ServiceDescriptor {
    /// Creates a service with no methods in the given proto package.
    ///
    /// # Examples
    ///
    /// ```
    /// use chanstub_descriptor::ServiceDescriptor;
    ///
    /// assert_eq!(ServiceDescriptor::new("Echo", "").full_name, "Echo");
    /// assert_eq!(ServiceDescriptor::new("Echo", "echo.v1").full_name, "echo.v1.Echo");
    /// ```
    #[must_use]
    pub fn new(name: impl Into<String>, package: &str) -> Self {
        let name = name.into();
        Self {
            full_name: qualify(package, &name),
            name,
            methods: Vec::new(),
        }
    }

    /// Appends a method.
    #[must_use]
    pub fn with_method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    /// Returns the wire path of one of this service's methods.
    #[must_use]
    pub fn wire_path(&self, method: &MethodDescriptor) -> WirePath {
        WirePath::new(&self.full_name, &method.name)
    }
}

/// An RPC method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodDescriptor {
    /// Method name as declared
    pub name: String,
    /// Fully-qualified input message name (`.pkg.Msg`)
    pub input_type: String,
    /// Fully-qualified output message name (`.pkg.Msg`)
    pub output_type: String,
    /// Client sends a stream of messages
    pub client_streaming: bool,
    /// Server sends a stream of messages
    pub server_streaming: bool,
}

impl MethodDescriptor {
    /// Creates a method with explicit streaming flags.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        input_type: impl Into<String>,
        output_type: impl Into<String>,
        client_streaming: bool,
        server_streaming: bool,
    ) -> Self {
        Self {
            name: name.into(),
            input_type: input_type.into(),
            output_type: output_type.into(),
            client_streaming,
            server_streaming,
        }
    }

    /// A method with a single request and a single response.
    #[must_use]
    pub fn unary(
        name: impl Into<String>,
        input_type: impl Into<String>,
        output_type: impl Into<String>,
    ) -> Self {
        Self::new(name, input_type, output_type, false, false)
    }

    /// A method with a single request and a stream of responses.
    #[must_use]
    pub fn server_streaming(
        name: impl Into<String>,
        input_type: impl Into<String>,
        output_type: impl Into<String>,
    ) -> Self {
        Self::new(name, input_type, output_type, false, true)
    }

    /// A method with a stream of requests and a single response.
    #[must_use]
    pub fn client_streaming(
        name: impl Into<String>,
        input_type: impl Into<String>,
        output_type: impl Into<String>,
    ) -> Self {
        Self::new(name, input_type, output_type, true, false)
    }

    /// A method with streams in both directions.
    #[must_use]
    pub fn bidi_streaming(
        name: impl Into<String>,
        input_type: impl Into<String>,
        output_type: impl Into<String>,
    ) -> Self {
        Self::new(name, input_type, output_type, true, true)
    }
}

/// A message type resolved to the unit that declares it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct MessageRef {
    /// Fully-qualified proto name without the leading dot
    pub full_name: String,
    /// Unit declaring the message
    pub unit: UnitPath,
    /// Message names from the outermost enclosing message down to this one
    pub nesting: Vec<String>,
}

fn qualify(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{package}.{name}")
    }
}
