//! Output formatters for CLI commands.
//!
//! Every command report is a `Serialize` value rendered in one of three
//! ways: indented JSON, flat `key = value` lines for scripts, or a
//! colorized outline for terminals.

use anyhow::Result;
use chanstub_core::cli::OutputFormat;
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;

/// Formats `data` in the requested output format.
///
/// # Errors
///
/// Returns an error if `data` cannot be serialized.
///
/// # Examples
///
/// ```
/// use chanstub_cli::formatters::format_output;
/// use chanstub_core::cli::OutputFormat;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Summary {
///     files: usize,
/// }
///
/// let output = format_output(&Summary { files: 2 }, OutputFormat::Text)?;
/// assert_eq!(output, "files = 2");
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn format_output<T: Serialize>(data: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => json::format(data),
        OutputFormat::Text => text::format(data),
        OutputFormat::Pretty => pretty::format(data),
    }
}

/// JSON output formatting.
pub mod json {
    use super::{Result, Serialize};

    /// Formats data as indented JSON.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(data)?)
    }
}

/// Plain text output formatting.
pub mod text {
    use super::{Result, Serialize, Value};

    /// Formats data as one `path = value` line per leaf.
    ///
    /// Object keys join with `.`, array elements with `[i]`. Strings are
    /// written bare.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        let value = serde_json::to_value(data)?;
        let mut lines = Vec::new();
        flatten(&value, String::new(), &mut lines);
        Ok(lines.join("\n"))
    }

    fn flatten(value: &Value, path: String, lines: &mut Vec<String>) {
        match value {
            Value::Object(map) if !map.is_empty() => {
                for (key, child) in map {
                    let child_path = if path.is_empty() {
                        key.clone()
                    } else {
                        format!("{path}.{key}")
                    };
                    flatten(child, child_path, lines);
                }
            }
            Value::Array(items) if !items.is_empty() => {
                for (i, child) in items.iter().enumerate() {
                    flatten(child, format!("{path}[{i}]"), lines);
                }
            }
            leaf => {
                let rendered = match leaf {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                if path.is_empty() {
                    lines.push(rendered);
                } else {
                    lines.push(format!("{path} = {rendered}"));
                }
            }
        }
    }
}

/// Pretty (human-readable) output formatting.
pub mod pretty {
    use super::{Colorize, Result, Serialize, Value};

    /// Formats data as a colorized, indented outline.
    pub fn format<T: Serialize>(data: &T) -> Result<String> {
        let value = serde_json::to_value(data)?;
        let mut out = Vec::new();
        outline(&value, 0, &mut out);
        Ok(out.join("\n"))
    }

    fn scalar(value: &Value) -> String {
        match value {
            Value::Null => "-".dimmed().to_string(),
            Value::Bool(b) => b.to_string().yellow().to_string(),
            Value::Number(n) => n.to_string().cyan().to_string(),
            Value::String(s) => s.green().to_string(),
            Value::Array(_) => "[]".dimmed().to_string(),
            Value::Object(_) => "{}".dimmed().to_string(),
        }
    }

    fn is_nested(value: &Value) -> bool {
        match value {
            Value::Array(items) => !items.is_empty(),
            Value::Object(map) => !map.is_empty(),
            _ => false,
        }
    }

    fn outline(value: &Value, indent: usize, out: &mut Vec<String>) {
        let pad = "  ".repeat(indent);
        match value {
            Value::Object(map) if !map.is_empty() => {
                for (key, child) in map {
                    let key = key.blue().bold();
                    if is_nested(child) {
                        out.push(format!("{pad}{key}:"));
                        outline(child, indent + 1, out);
                    } else {
                        out.push(format!("{pad}{key}: {}", scalar(child)));
                    }
                }
            }
            Value::Array(items) if !items.is_empty() => {
                for item in items {
                    if is_nested(item) {
                        out.push(format!("{pad}-"));
                        outline(item, indent + 1, out);
                    } else {
                        out.push(format!("{pad}- {}", scalar(item)));
                    }
                }
            }
            leaf => out.push(format!("{pad}{}", scalar(leaf))),
        }
    }
}
