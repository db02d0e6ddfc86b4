//! Generated declarations as data.
//!
//! The synthesizer produces these values; the template engine turns them
//! into Go source. Type names stored here are already qualified for the
//! file they belong to.

use crate::naming::Import;
use serde::Serialize;

/// A named, typed parameter, struct field, or receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Identifier
    pub name: String,
    /// Qualified Go type
    pub ty: String,
}

impl Param {
    /// Creates a parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// A statement in a function body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    /// A single-line statement, written as is.
    Line(String),
    /// `if [init; ]err != nil { return nil, err }`
    ReturnOnError {
        /// Optional init statement assigning `err`
        init: Option<String>,
    },
    /// `return a, b, ...`
    Return(Vec<String>),
}

impl Stmt {
    /// Creates a single-line statement.
    #[must_use]
    pub fn line(text: impl Into<String>) -> Self {
        Self::Line(text.into())
    }

    /// Renders the statement as lines, nested blocks indented by one tab.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        match self {
            Self::Line(text) => vec![text.clone()],
            Self::ReturnOnError { init } => {
                let head = init.as_ref().map_or_else(
                    || "if err != nil {".to_string(),
                    |init| format!("if {init}; err != nil {{"),
                );
                vec![head, "\treturn nil, err".to_string(), "}".to_string()]
            }
            Self::Return(values) => vec![format!("return {}", values.join(", "))],
        }
    }
}

/// A function or method declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    /// Receiver, for methods
    pub receiver: Option<Param>,
    /// Function name
    pub name: String,
    /// Parameters in order
    pub params: Vec<Param>,
    /// Whether the last parameter is variadic
    pub variadic: bool,
    /// Result types in order
    pub results: Vec<String>,
    /// Body statements
    pub body: Vec<Stmt>,
}

impl FuncDecl {
    /// Starts a function declaration with no parameters, results, or body.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            receiver: None,
            name: name.into(),
            params: Vec::new(),
            variadic: false,
            results: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Makes this a method on `receiver`.
    #[must_use]
    pub fn receiver(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.receiver = Some(Param::new(name, ty));
        self
    }

    /// Appends a parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.params.push(Param::new(name, ty));
        self
    }

    /// Appends a variadic final parameter. `ty` is the element type.
    #[must_use]
    pub fn variadic_param(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.params.push(Param::new(name, ty));
        self.variadic = true;
        self
    }

    /// Appends a result type.
    #[must_use]
    pub fn result(mut self, ty: impl Into<String>) -> Self {
        self.results.push(ty.into());
        self
    }

    /// Appends a body statement.
    #[must_use]
    pub fn stmt(mut self, stmt: Stmt) -> Self {
        self.body.push(stmt);
        self
    }

    /// Returns the Go signature, up to but excluding the opening brace.
    ///
    /// # Examples
    ///
    /// ```
    /// use chanstub_codegen::decl::FuncDecl;
    ///
    /// let func = FuncDecl::new("Say")
    ///     .receiver("c", "*echoChannelClient")
    ///     .param("ctx", "context.Context")
    ///     .variadic_param("opts", "grpc.CallOption")
    ///     .result("*EchoResponse")
    ///     .result("error");
    ///
    /// assert_eq!(
    ///     func.signature(),
    ///     "func (c *echoChannelClient) Say(ctx context.Context, opts ...grpc.CallOption) (*EchoResponse, error)"
    /// );
    /// ```
    #[must_use]
    pub fn signature(&self) -> String {
        let receiver = self
            .receiver
            .as_ref()
            .map(|r| format!("({} {}) ", r.name, r.ty))
            .unwrap_or_default();

        let last = self.params.len().saturating_sub(1);
        let params = self
            .params
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if self.variadic && i == last {
                    format!("{} ...{}", p.name, p.ty)
                } else {
                    format!("{} {}", p.name, p.ty)
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        let results = match self.results.as_slice() {
            [] => String::new(),
            [single] => format!(" {single}"),
            many => format!(" ({})", many.join(", ")),
        };

        format!("func {receiver}{}({params}){results}", self.name)
    }
}

/// A struct type declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDecl {
    /// Type name
    pub name: String,
    /// Fields in order
    pub fields: Vec<Param>,
}

/// Any package-level declaration of a generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decl {
    /// Function or method
    Func(FuncDecl),
    /// Struct type
    Struct(StructDecl),
}

impl Decl {
    /// Returns the declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Func(func) => &func.name,
            Self::Struct(decl) => &decl.name,
        }
    }

    /// Returns `true` for methods.
    #[must_use]
    pub const fn is_method(&self) -> bool {
        matches!(self, Self::Func(FuncDecl { receiver: Some(_), .. }))
    }

    fn context(&self) -> DeclContext {
        match self {
            Self::Func(func) => DeclContext {
                signature: func.signature(),
                lines: func.body.iter().flat_map(Stmt::lines).collect(),
            },
            Self::Struct(decl) => {
                let width = decl.fields.iter().map(|f| f.name.len()).max().unwrap_or(0);
                DeclContext {
                    signature: format!("type {} struct", decl.name),
                    lines: decl
                        .fields
                        .iter()
                        .map(|f| format!("{:<width$} {}", f.name, f.ty))
                        .collect(),
                }
            }
        }
    }
}

impl From<FuncDecl> for Decl {
    fn from(func: FuncDecl) -> Self {
        Self::Func(func)
    }
}

impl From<StructDecl> for Decl {
    fn from(decl: StructDecl) -> Self {
        Self::Struct(decl)
    }
}

/// One output file, fully synthesized but not yet rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoFile {
    /// Output path relative to the output root
    pub path: String,
    /// Unit the file was generated from
    pub source: String,
    /// Generator name for the provenance header
    pub generator: String,
    /// Package clause
    pub package: String,
    /// Import block, sorted by path
    pub imports: Vec<Import>,
    /// Declarations in output order
    pub decls: Vec<Decl>,
}

impl GoFile {
    /// Builds the template context for rendering.
    #[must_use]
    pub fn context(&self) -> FileContext<'_> {
        FileContext {
            generator: &self.generator,
            source: &self.source,
            package: &self.package,
            imports: self
                .imports
                .iter()
                .map(|import| ImportContext {
                    alias: import.alias.as_deref().unwrap_or_default(),
                    path: &import.path,
                })
                .collect(),
            decls: self.decls.iter().map(Decl::context).collect(),
        }
    }
}

/// Template context of a whole file.
#[derive(Debug, Serialize)]
pub struct FileContext<'a> {
    generator: &'a str,
    source: &'a str,
    package: &'a str,
    imports: Vec<ImportContext<'a>>,
    decls: Vec<DeclContext>,
}

#[derive(Debug, Serialize)]
struct ImportContext<'a> {
    alias: &'a str,
    path: &'a str,
}

#[derive(Debug, Serialize)]
struct DeclContext {
    signature: String,
    lines: Vec<String>,
}
