//! Go naming policy.
//!
//! Turns proto names into Go identifiers, resolves the Go package of every
//! unit, and tracks per-file imports and package-level symbols so that one
//! output file never declares the same name twice.
//!
//! # Examples
//!
//! ```
//! use chanstub_codegen::naming::{camel_case, unexport};
//!
//! assert_eq!(camel_case("echo_service"), "EchoService");
//! assert_eq!(camel_case("_internal"), "XInternal");
//! assert_eq!(unexport("EchoService"), "echoService");
//! ```

use chanstub_core::{Error, GeneratorConfig, PathsMode, Result, UnitPath};
use chanstub_descriptor::{DescriptorSet, MessageRef, ServiceDefinitionUnit};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

const GO_KEYWORDS: [&str; 25] = [
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

/// Parameter and local variable names used inside generated bodies.
///
/// Import aliases must never shadow these.
pub const RESERVED_LOCALS: [&str; 11] = [
    "c", "ch", "ctx", "err", "in", "opts", "out", "reg", "srv", "stream", "x",
];

/// Converts a proto name to Go CamelCase.
///
/// Follows protoc-gen-go: a leading underscore becomes `X`, an underscore
/// followed by a lowercase letter is dropped and the letter upper-cased,
/// digits are copied, and every lowercase run is copied after its first
/// letter is upper-cased.
///
/// # Examples
///
/// ```
/// use chanstub_codegen::naming::camel_case;
///
/// assert_eq!(camel_case("say_hello"), "SayHello");
/// assert_eq!(camel_case("v2_api"), "V2Api");
/// assert_eq!(camel_case("Outer_Inner"), "Outer_Inner");
/// assert_eq!(camel_case("getHTTP"), "GetHTTP");
/// ```
#[must_use]
pub fn camel_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 1);
    let mut i = 0;

    if chars.first() == Some(&'_') {
        out.push('X');
        i = 1;
    }

    while i < chars.len() {
        let c = chars[i];
        i += 1;
        if c == '_' && chars.get(i).is_some_and(char::is_ascii_lowercase) {
            continue;
        }
        if c.is_ascii_digit() {
            out.push(c);
            continue;
        }
        out.push(c.to_ascii_uppercase());
        while i < chars.len() && chars[i].is_ascii_lowercase() {
            out.push(chars[i]);
            i += 1;
        }
    }

    out
}

/// Lower-cases the first character of an identifier.
#[must_use]
pub fn unexport(ident: &str) -> String {
    let mut chars = ident.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_lowercase().chain(chars).collect()
    })
}

/// Returns `true` if `ident` is a usable Go identifier.
#[must_use]
pub fn is_go_identifier(ident: &str) -> bool {
    let mut chars = ident.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || c == '_')
        && !GO_KEYWORDS.contains(&ident)
}

/// Returns `true` if `ident` is exported from its Go package.
#[must_use]
pub fn is_exported(ident: &str) -> bool {
    ident.chars().next().is_some_and(char::is_uppercase)
}

/// Turns an arbitrary string into a valid Go package name.
///
/// # Examples
///
/// ```
/// use chanstub_codegen::naming::sanitize_package_name;
///
/// assert_eq!(sanitize_package_name("echo-v1"), "echo_v1");
/// assert_eq!(sanitize_package_name("2fa"), "_2fa");
/// assert_eq!(sanitize_package_name("type"), "_type");
/// ```
#[must_use]
pub fn sanitize_package_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        return "_".to_string();
    }
    if cleaned.starts_with(|c: char| c.is_ascii_digit()) || GO_KEYWORDS.contains(&cleaned.as_str())
    {
        return format!("_{cleaned}");
    }
    cleaned
}

/// Converts a proto service or method name to an exported Go identifier.
///
/// # Errors
///
/// Returns `Error::MalformedDescriptor` if the name is empty or does not
/// produce an exported Go identifier.
pub fn exported_name(unit: &UnitPath, what: &str, name: &str) -> Result<String> {
    if name.is_empty() {
        return Err(Error::MalformedDescriptor {
            unit: unit.to_string(),
            reason: format!("{what} has no name"),
        });
    }
    let ident = camel_case(name);
    if !is_go_identifier(&ident) || !is_exported(&ident) {
        return Err(Error::MalformedDescriptor {
            unit: unit.to_string(),
            reason: format!("{what} name '{name}' does not yield an exported Go identifier"),
        });
    }
    Ok(ident)
}

/// Go type name of a message, without package qualification.
///
/// Nested messages are joined with `_` before conversion, as protoc-gen-go
/// does.
///
/// # Examples
///
/// ```
/// use chanstub_codegen::naming::message_type_name;
///
/// assert_eq!(message_type_name(&["Outer".into(), "Inner".into()]), "Outer_Inner");
/// assert_eq!(message_type_name(&["outer".into(), "inner".into()]), "OuterInner");
/// ```
#[must_use]
pub fn message_type_name(nesting: &[String]) -> String {
    camel_case(&nesting.join("_"))
}

/// A resolved Go package.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct GoPackage {
    /// Import path (`example.com/echo`), or `.` for a unit at the include root
    pub import_path: String,
    /// Package name used in the package clause
    pub name: String,
}

impl GoPackage {
    /// Parses a `go_package` value or `M` mapping.
    ///
    /// Accepts `path;name`, a bare import path, or a bare package name. The
    /// import path is empty for the last form.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if let Some((path, name)) = value.split_once(';') {
            return Self {
                import_path: path.to_string(),
                name: name.to_string(),
            };
        }
        if value.contains('/') || value.contains('.') {
            let last = value.rsplit('/').next().unwrap_or(value);
            return Self {
                import_path: value.to_string(),
                name: sanitize_package_name(last),
            };
        }
        Self {
            import_path: String::new(),
            name: sanitize_package_name(value),
        }
    }
}

/// A symbol of the Go runtime libraries that generated code refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoSymbol {
    /// Import path of the declaring package
    pub import_path: &'static str,
    /// Package name
    pub package: &'static str,
    /// Identifier inside the package
    pub name: &'static str,
}

impl GoSymbol {
    /// `grpchan.Channel`
    pub const CHANNEL: Self = Self {
        import_path: "github.com/fullstorydev/grpchan",
        package: "grpchan",
        name: "Channel",
    };

    /// `grpchan.ServiceRegistry`
    pub const SERVICE_REGISTRY: Self = Self {
        import_path: "github.com/fullstorydev/grpchan",
        package: "grpchan",
        name: "ServiceRegistry",
    };

    /// `context.Context`
    pub const CONTEXT: Self = Self {
        import_path: "golang.org/x/net/context",
        package: "context",
        name: "Context",
    };

    /// `grpc.CallOption`
    pub const CALL_OPTION: Self = Self {
        import_path: "google.golang.org/grpc",
        package: "grpc",
        name: "CallOption",
    };
}

/// Run-scoped naming state shared by every unit of one request.
///
/// Caches the Go package of each unit so that message references across
/// units resolve identically no matter which file is being generated.
#[derive(Debug)]
pub struct NameContext<'a> {
    config: &'a GeneratorConfig,
    packages: HashMap<UnitPath, GoPackage>,
}

impl<'a> NameContext<'a> {
    /// Creates an empty context for one run.
    #[must_use]
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Self {
            config,
            packages: HashMap::new(),
        }
    }

    /// Returns the configuration of the run.
    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        self.config
    }

    /// Resolves the Go package of a unit.
    ///
    /// An `M` mapping wins over `go_package`; without either the import path
    /// is the unit's directory and the name comes from the proto package or
    /// the file name.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedDescriptor` if the resulting package name is
    /// not a valid Go identifier.
    ///
    /// # Examples
    ///
    /// ```
    /// use chanstub_codegen::naming::NameContext;
    /// use chanstub_core::{GeneratorConfig, UnitPath};
    /// use chanstub_descriptor::ServiceDefinitionUnit;
    ///
    /// let config = GeneratorConfig::default();
    /// let mut names = NameContext::new(&config);
    ///
    /// let unit = ServiceDefinitionUnit::new(UnitPath::new("api/echo.proto").unwrap(), "echo.v1");
    /// let package = names.package_for(&unit).unwrap();
    /// assert_eq!(package.import_path, "api");
    /// assert_eq!(package.name, "echo_v1");
    /// ```
    pub fn package_for(&mut self, unit: &ServiceDefinitionUnit) -> Result<GoPackage> {
        if let Some(package) = self.packages.get(&unit.path) {
            return Ok(package.clone());
        }

        let declared = self
            .config
            .import_mapping(unit.path.as_str())
            .or(unit.go_package.as_deref());

        let mut package = declared.map_or_else(
            || GoPackage {
                import_path: String::new(),
                name: fallback_package_name(unit),
            },
            GoPackage::parse,
        );
        if package.import_path.is_empty() {
            package.import_path = unit.path.dir().to_string();
        }

        if !is_go_identifier(&package.name) {
            return Err(Error::MalformedDescriptor {
                unit: unit.path.to_string(),
                reason: format!("Go package name '{}' is not a valid identifier", package.name),
            });
        }

        tracing::debug!(
            "unit {} maps to Go package {} ({})",
            unit.path,
            package.name,
            package.import_path
        );
        self.packages.insert(unit.path.clone(), package.clone());
        Ok(package)
    }

    /// Resolves the Go package declaring a message.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedDescriptor` if the declaring unit is not part
    /// of the request or its package cannot be resolved.
    pub fn package_for_message(
        &mut self,
        set: &DescriptorSet,
        message: &MessageRef,
    ) -> Result<GoPackage> {
        let unit = set
            .unit(message.unit.as_str())
            .ok_or_else(|| Error::MalformedDescriptor {
                unit: message.unit.to_string(),
                reason: format!("declaring unit of '{}' is missing", message.full_name),
            })?;
        self.package_for(unit)
    }

    /// Computes the output file path of a unit.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedDescriptor` if the package cannot be resolved
    /// or the output path falls outside the configured module prefix.
    ///
    /// # Examples
    ///
    /// ```
    /// use chanstub_codegen::naming::NameContext;
    /// use chanstub_core::{GeneratorConfig, UnitPath};
    /// use chanstub_descriptor::ServiceDefinitionUnit;
    ///
    /// let config = GeneratorConfig::from_parameter(Some("module=example.com/api")).unwrap();
    /// let mut names = NameContext::new(&config);
    ///
    /// let unit = ServiceDefinitionUnit::new(UnitPath::new("echo/echo.proto").unwrap(), "echo")
    ///     .with_go_package("example.com/api/echo;echopb");
    /// assert_eq!(names.output_path(&unit).unwrap(), "echo/echo.pb.grpchan.go");
    /// ```
    pub fn output_path(&mut self, unit: &ServiceDefinitionUnit) -> Result<String> {
        let file_name = format!("{}{}", unit.path.base_name(), self.config.file_suffix);

        if self.config.paths == PathsMode::SourceRelative {
            return Ok(join_path(unit.path.dir(), &file_name));
        }

        let package = self.package_for(unit)?;
        let full = join_path(&package.import_path, &file_name);
        let Some(module) = &self.config.module else {
            return Ok(full);
        };

        let prefix = format!("{}/", module.trim_end_matches('/'));
        full.strip_prefix(&prefix)
            .map(str::to_string)
            .ok_or_else(|| Error::MalformedDescriptor {
                unit: unit.path.to_string(),
                reason: format!("output path '{full}' does not start with module prefix '{prefix}'"),
            })
    }
}

fn fallback_package_name(unit: &ServiceDefinitionUnit) -> String {
    if unit.package.is_empty() {
        sanitize_package_name(unit.path.base_name())
    } else {
        sanitize_package_name(&unit.package.replace('.', "_"))
    }
}

fn join_path(dir: &str, file: &str) -> String {
    if dir.is_empty() || dir == "." {
        file.to_string()
    } else {
        format!("{}/{file}", dir.trim_end_matches('/'))
    }
}

/// One entry of the import block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Import {
    /// Explicit alias, present only when it differs from the last element of
    /// the import path
    pub alias: Option<String>,
    /// Import path
    pub path: String,
}

/// Names visible in one output file.
#[derive(Debug)]
pub struct FileScope {
    unit: UnitPath,
    package: GoPackage,
    imports: BTreeMap<String, String>,
    aliases: HashSet<String>,
    symbols: HashMap<String, String>,
}

impl FileScope {
    /// Creates the scope of the file generated for `unit`.
    #[must_use]
    pub fn new(unit: &UnitPath, package: GoPackage) -> Self {
        Self {
            unit: unit.clone(),
            package,
            imports: BTreeMap::new(),
            aliases: HashSet::new(),
            symbols: HashMap::new(),
        }
    }

    /// Returns the unit this file is generated for.
    #[must_use]
    pub const fn unit(&self) -> &UnitPath {
        &self.unit
    }

    /// Returns the Go package of the file.
    #[must_use]
    pub const fn package(&self) -> &GoPackage {
        &self.package
    }

    /// Imports a package and returns the alias to refer to it by.
    ///
    /// The first import of a package name keeps the name; later packages
    /// with the same name, and packages named like a local variable of the
    /// generated bodies, get a numeric suffix.
    ///
    /// # Examples
    ///
    /// ```
    /// use chanstub_codegen::naming::{FileScope, GoPackage};
    /// use chanstub_core::UnitPath;
    ///
    /// let package = GoPackage::parse("example.com/echo");
    /// let mut scope = FileScope::new(&UnitPath::new("echo.proto").unwrap(), package);
    ///
    /// assert_eq!(scope.import("example.com/a/types", "types"), "types");
    /// assert_eq!(scope.import("example.com/b/types", "types"), "types1");
    /// assert_eq!(scope.import("example.com/a/types", "types"), "types");
    /// assert_eq!(scope.import("example.com/stream", "stream"), "stream1");
    /// ```
    pub fn import(&mut self, import_path: &str, package_name: &str) -> String {
        if let Some(alias) = self.imports.get(import_path) {
            return alias.clone();
        }

        let mut alias = package_name.to_string();
        let mut suffix = 1;
        while self.aliases.contains(&alias) || RESERVED_LOCALS.contains(&alias.as_str()) {
            alias = format!("{package_name}{suffix}");
            suffix += 1;
        }

        self.aliases.insert(alias.clone());
        self.imports.insert(import_path.to_string(), alias.clone());
        alias
    }

    /// Qualifies an identifier declared in `package`, importing the package
    /// unless it is the file's own.
    pub fn qualify(&mut self, package: &GoPackage, ident: &str) -> String {
        if package.import_path == self.package.import_path {
            return ident.to_string();
        }
        let alias = self.import(&package.import_path, &package.name);
        format!("{alias}.{ident}")
    }

    /// Qualifies a runtime library symbol.
    pub fn symbol(&mut self, symbol: &GoSymbol) -> String {
        let alias = self.import(symbol.import_path, symbol.package);
        format!("{alias}.{}", symbol.name)
    }

    /// Resolves a method's message type to a qualified Go type name.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnresolvedType` if the type is not in the request.
    pub fn message_type(
        &mut self,
        names: &mut NameContext<'_>,
        set: &DescriptorSet,
        type_name: &str,
    ) -> Result<String> {
        let message = set.resolve(type_name).ok_or_else(|| Error::UnresolvedType {
            unit: self.unit.to_string(),
            type_name: type_name.to_string(),
        })?;
        let package = names.package_for_message(set, message)?;
        Ok(self.qualify(&package, &message_type_name(&message.nesting)))
    }

    /// Declares a package-level identifier.
    ///
    /// # Errors
    ///
    /// Returns `Error::NameCollision` if the identifier is already declared.
    pub fn declare(&mut self, ident: &str, owner: impl Into<String>) -> Result<()> {
        if let Some(existing) = self.symbols.get(ident) {
            return Err(Error::NameCollision {
                unit: self.unit.to_string(),
                symbol: ident.to_string(),
                existing: existing.clone(),
            });
        }
        self.symbols.insert(ident.to_string(), owner.into());
        Ok(())
    }

    /// Declares `base`, appending `_` until the identifier is free.
    pub fn declare_unique(&mut self, base: &str, owner: impl Into<String>) -> String {
        let mut ident = base.to_string();
        while self.symbols.contains_key(&ident) {
            ident.push('_');
        }
        self.symbols.insert(ident.clone(), owner.into());
        ident
    }

    /// Returns `true` if the identifier is declared in this file.
    #[must_use]
    pub fn is_declared(&self, ident: &str) -> bool {
        self.symbols.contains_key(ident)
    }

    /// Returns the import block sorted by path.
    #[must_use]
    pub fn imports(&self) -> Vec<Import> {
        self.imports
            .iter()
            .map(|(path, alias)| {
                let last = path.rsplit('/').next().unwrap_or(path);
                Import {
                    alias: (alias != last).then(|| alias.clone()),
                    path: path.clone(),
                }
            })
            .collect()
    }
}
