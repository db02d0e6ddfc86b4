//! Template engine for code generation using Handlebars.
//!
//! Provides a wrapper around Handlebars with the Go file template
//! pre-registered. Output is Go source, so HTML escaping is turned off.
//!
//! # Examples
//!
//! ```
//! use chanstub_codegen::template_engine::TemplateEngine;
//! use serde_json::json;
//!
//! let mut engine = TemplateEngine::new().unwrap();
//! engine.register_template_string("custom", "package {{name}}").unwrap();
//! let result = engine.render("custom", &json!({"name": "echo"})).unwrap();
//! assert_eq!(result, "package echo");
//! ```

use chanstub_core::{Error, Result};
use handlebars::Handlebars;
use serde::Serialize;

/// Name of the template rendering one generated Go file.
pub const GO_FILE_TEMPLATE: &str = "grpchan/file";

/// Template engine for code generation.
///
/// Wraps Handlebars in strict mode, so a missing context field fails the
/// render instead of producing an empty string.
///
/// # Thread Safety
///
/// This type is `Send` and `Sync`, allowing it to be used across
/// thread boundaries safely.
#[derive(Debug)]
pub struct TemplateEngine<'a> {
    handlebars: Handlebars<'a>,
}

impl TemplateEngine<'_> {
    /// Creates a new template engine with registered templates.
    ///
    /// # Errors
    ///
    /// Returns error if template registration fails (should not happen
    /// with valid built-in templates).
    pub fn new() -> Result<Self> {
        let mut handlebars = Handlebars::new();

        // Strict mode: fail on missing variables
        handlebars.set_strict_mode(true);
        handlebars.register_escape_fn(handlebars::no_escape);

        handlebars
            .register_template_string(GO_FILE_TEMPLATE, include_str!("../templates/grpchan.go.hbs"))
            .map_err(|e| Error::EmissionError {
                path: GO_FILE_TEMPLATE.to_string(),
                message: format!("failed to register template: {e}"),
                source: None,
            })?;

        Ok(Self { handlebars })
    }

    /// Renders a template with the given context.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Template name is not registered
    /// - Context cannot be serialized
    /// - Template rendering fails
    pub fn render<T: Serialize>(&self, template_name: &str, context: &T) -> Result<String> {
        self.handlebars
            .render(template_name, context)
            .map_err(|e| Error::EmissionError {
                path: template_name.to_string(),
                message: format!("template rendering failed: {e}"),
                source: None,
            })
    }

    /// Registers a custom template.
    ///
    /// # Errors
    ///
    /// Returns error if template string is invalid.
    pub fn register_template_string(&mut self, name: &str, template: &str) -> Result<()> {
        self.handlebars
            .register_template_string(name, template)
            .map_err(|e| Error::EmissionError {
                path: name.to_string(),
                message: format!("failed to register template: {e}"),
                source: None,
            })
    }
}
