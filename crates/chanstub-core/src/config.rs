//! Generator configuration.
//!
//! Configuration reaches the generator in one of two ways: as the protoc
//! parameter string (`--grpchan_out=paths=source_relative,Mfoo.proto=x/y:out`)
//! or as a TOML file handed to the `chanstub` CLI. Both produce a
//! [`GeneratorConfig`].
//!
//! # Examples
//!
//! ```
//! use chanstub_core::{GeneratorConfig, PathsMode};
//!
//! let config = GeneratorConfig::from_parameter(Some(
//!     "paths=source_relative,Mecho.proto=example.com/echo",
//! ))
//! .unwrap();
//!
//! assert_eq!(config.paths, PathsMode::SourceRelative);
//! assert_eq!(config.import_mapping("echo.proto"), Some("example.com/echo"));
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Generator name written into the provenance header.
pub const DEFAULT_GENERATOR_NAME: &str = "protoc-gen-grpchan";

/// Suffix appended to the unit base name to form the output file name.
pub const DEFAULT_FILE_SUFFIX: &str = ".pb.grpchan.go";

/// How output file paths are derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathsMode {
    /// Place output under the Go import path of the unit's package.
    #[default]
    Import,
    /// Place output next to the `.proto` file, relative to its include root.
    SourceRelative,
}

impl PathsMode {
    /// Returns the parameter spelling of the mode.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Import => "import",
            Self::SourceRelative => "source_relative",
        }
    }
}

impl fmt::Display for PathsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PathsMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "import" => Ok(Self::Import),
            "source_relative" => Ok(Self::SourceRelative),
            _ => Err(Error::ConfigError {
                message: format!(
                    "invalid value for paths: '{s}' (expected: import or source_relative)"
                ),
            }),
        }
    }
}

/// Configuration for one generation run.
///
/// # Examples
///
/// ```
/// use chanstub_core::{GeneratorConfig, PathsMode, DEFAULT_FILE_SUFFIX};
///
/// let config = GeneratorConfig::default();
/// assert_eq!(config.paths, PathsMode::Import);
/// assert_eq!(config.file_suffix, DEFAULT_FILE_SUFFIX);
/// assert!(config.module.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Output path mode.
    ///
    /// Default: `import`
    pub paths: PathsMode,

    /// Import-path prefix stripped from output paths.
    ///
    /// Only meaningful with `paths = "import"`. Every generated file must
    /// live under this prefix.
    /// Default: None
    pub module: Option<String>,

    /// Per-file Go import path overrides (`M<file>=<import path>`).
    ///
    /// Takes precedence over the `go_package` option of the file.
    pub import_mappings: BTreeMap<String, String>,

    /// Generator name written into the provenance header.
    ///
    /// Default: `protoc-gen-grpchan`
    pub generator_name: String,

    /// Suffix of generated file names.
    ///
    /// Default: `.pb.grpchan.go`
    pub file_suffix: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            paths: PathsMode::default(),
            module: None,
            import_mappings: BTreeMap::new(),
            generator_name: DEFAULT_GENERATOR_NAME.to_string(),
            file_suffix: DEFAULT_FILE_SUFFIX.to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Builds a configuration from a protoc parameter string.
    ///
    /// `None` and the empty string both yield the defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` for unknown keys, missing values, or an
    /// invalid combination of options.
    pub fn from_parameter(parameter: Option<&str>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(parameter) = parameter {
            config.apply_parameter(parameter)?;
        }
        Ok(config)
    }

    /// Parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the document is not valid TOML, has
    /// unknown keys, or fails validation.
    ///
    /// # Examples
    ///
    /// ```
    /// use chanstub_core::{GeneratorConfig, PathsMode};
    ///
    /// let config = GeneratorConfig::from_toml_str(r#"
    ///     paths = "source_relative"
    ///
    ///     [import_mappings]
    ///     "echo.proto" = "example.com/echo"
    /// "#).unwrap();
    ///
    /// assert_eq!(config.paths, PathsMode::SourceRelative);
    /// ```
    pub fn from_toml_str(document: &str) -> Result<Self> {
        let config: Self = toml::from_str(document).map_err(|e| Error::ConfigError {
            message: format!("invalid configuration file: {e}"),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Applies a comma-separated `key=value` parameter string on top of the
    /// current configuration.
    ///
    /// Recognized keys are `paths`, `module`, and `M<file>`.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` for unknown keys or missing values.
    ///
    /// # Examples
    ///
    /// ```
    /// use chanstub_core::GeneratorConfig;
    ///
    /// let mut config = GeneratorConfig::default();
    /// config.apply_parameter("module=example.com/api").unwrap();
    /// assert_eq!(config.module.as_deref(), Some("example.com/api"));
    ///
    /// assert!(config.apply_parameter("plugins=grpc").is_err());
    /// ```
    pub fn apply_parameter(&mut self, parameter: &str) -> Result<()> {
        for entry in parameter.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (key, value) = entry.split_once('=').unwrap_or((entry, ""));
            match key {
                "paths" => self.paths = value.parse()?,
                "module" => self.module = Some(required_value(key, value)?.to_string()),
                _ if key.len() > 1 && key.starts_with('M') => {
                    let value = required_value(key, value)?;
                    self.import_mappings
                        .insert(key[1..].to_string(), value.to_string());
                }
                _ => {
                    return Err(Error::ConfigError {
                        message: format!("unknown parameter '{key}'"),
                    });
                }
            }
            tracing::debug!("applied parameter {key}");
        }
        self.validate()
    }

    /// Returns the import path mapped to a unit via `M<file>=...`, if any.
    #[must_use]
    pub fn import_mapping(&self, unit: &str) -> Option<&str> {
        self.import_mappings.get(unit).map(String::as_str)
    }

    /// Checks option combinations.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if `module` is combined with
    /// `paths=source_relative` or if names are empty.
    pub fn validate(&self) -> Result<()> {
        if self.module.is_some() && self.paths == PathsMode::SourceRelative {
            return Err(Error::ConfigError {
                message: "cannot use module= with paths=source_relative".to_string(),
            });
        }
        if self.generator_name.trim().is_empty() {
            return Err(Error::ConfigError {
                message: "generator_name cannot be empty".to_string(),
            });
        }
        if self.file_suffix.is_empty() {
            return Err(Error::ConfigError {
                message: "file_suffix cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

fn required_value<'a>(key: &str, value: &'a str) -> Result<&'a str> {
    if value.is_empty() {
        return Err(Error::ConfigError {
            message: format!("parameter '{key}' requires a value"),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GeneratorConfig::default();
        assert_eq!(config.generator_name, "protoc-gen-grpchan");
        assert_eq!(config.file_suffix, ".pb.grpchan.go");
        assert!(config.import_mappings.is_empty());
    }

    #[test]
    fn test_empty_parameter_is_default() {
        let config = GeneratorConfig::from_parameter(Some("")).unwrap();
        assert_eq!(config, GeneratorConfig::default());
        let config = GeneratorConfig::from_parameter(None).unwrap();
        assert_eq!(config, GeneratorConfig::default());
    }

    #[test]
    fn test_parse_multiple_mappings() {
        let config = GeneratorConfig::from_parameter(Some(
            "Ma.proto=example.com/a, Mdir/b.proto=example.com/b;bpb",
        ))
        .unwrap();
        assert_eq!(config.import_mapping("a.proto"), Some("example.com/a"));
        assert_eq!(
            config.import_mapping("dir/b.proto"),
            Some("example.com/b;bpb")
        );
        assert_eq!(config.import_mapping("c.proto"), None);
    }

    #[test]
    fn test_unknown_parameter_rejected() {
        let err = GeneratorConfig::from_parameter(Some("plugins=grpc")).unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("plugins"));
    }

    #[test]
    fn test_invalid_paths_value() {
        let err = GeneratorConfig::from_parameter(Some("paths=relative")).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_mapping_requires_value() {
        assert!(GeneratorConfig::from_parameter(Some("Mfoo.proto")).is_err());
        assert!(GeneratorConfig::from_parameter(Some("module=")).is_err());
    }

    #[test]
    fn test_module_with_source_relative_rejected() {
        let err =
            GeneratorConfig::from_parameter(Some("paths=source_relative,module=example.com"))
                .unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_toml_unknown_field_rejected() {
        let err = GeneratorConfig::from_toml_str("color = true").unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_toml_overrides_header_name() {
        let config = GeneratorConfig::from_toml_str(
            "generator_name = \"chanstub\"\nfile_suffix = \".chan.go\"",
        )
        .unwrap();
        assert_eq!(config.generator_name, "chanstub");
        assert_eq!(config.file_suffix, ".chan.go");
        assert_eq!(config.paths, PathsMode::Import);
    }

    #[test]
    fn test_parameter_applied_over_toml() {
        let mut config = GeneratorConfig::from_toml_str("paths = \"import\"").unwrap();
        config.apply_parameter("paths=source_relative").unwrap();
        assert_eq!(config.paths, PathsMode::SourceRelative);
    }
}
