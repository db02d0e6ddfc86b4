//! Strong domain types for chanstub.
//!
//! Unit paths and wire paths travel through every layer of the generator;
//! wrapping them keeps them from being confused with the many other strings
//! (Go identifiers, import paths, proto names) in flight.
//!
//! # Examples
//!
//! ```
//! use chanstub_core::{UnitPath, WirePath};
//!
//! let unit = UnitPath::new("echo/v1/echo.proto").unwrap();
//! assert_eq!(unit.base_name(), "echo");
//! assert_eq!(unit.dir(), "echo/v1");
//!
//! let wire = WirePath::new("echo.v1.Echo", "Say");
//! assert_eq!(wire.as_str(), "/echo.v1.Echo/Say");
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

const PROTO_EXTENSIONS: [&str; 2] = [".proto", ".protodevel"];

/// Identifying path of a service-definition unit (a `.proto` file name as
/// protoc reports it, relative to its include root).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UnitPath(String);

impl UnitPath {
    /// Creates a unit path.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedDescriptor` if the path is empty or names a
    /// directory rather than a file.
    ///
    /// # Examples
    ///
    /// ```
    /// use chanstub_core::UnitPath;
    ///
    /// assert!(UnitPath::new("echo.proto").is_ok());
    /// assert!(UnitPath::new("").is_err());
    /// assert!(UnitPath::new("echo/").is_err());
    /// ```
    pub fn new(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        if path.is_empty() {
            return Err(Error::MalformedDescriptor {
                unit: "<unnamed>".to_string(),
                reason: "unit has no name".to_string(),
            });
        }
        if path.ends_with('/') {
            return Err(Error::MalformedDescriptor {
                unit: path,
                reason: "unit path names a directory".to_string(),
            });
        }
        Ok(Self(path))
    }

    /// Returns the path as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the file name without directory and without a `.proto`
    /// extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use chanstub_core::UnitPath;
    ///
    /// let unit = UnitPath::new("a/b/service.proto").unwrap();
    /// assert_eq!(unit.base_name(), "service");
    /// ```
    #[must_use]
    pub fn base_name(&self) -> &str {
        let file = self.0.rsplit('/').next().unwrap_or(&self.0);
        PROTO_EXTENSIONS
            .iter()
            .find_map(|ext| file.strip_suffix(ext))
            .unwrap_or(file)
    }

    /// Returns the directory portion of the path, or `"."` when the unit sits
    /// at the include root.
    ///
    /// # Examples
    ///
    /// ```
    /// use chanstub_core::UnitPath;
    ///
    /// assert_eq!(UnitPath::new("echo.proto").unwrap().dir(), ".");
    /// assert_eq!(UnitPath::new("x/y/echo.proto").unwrap().dir(), "x/y");
    /// ```
    #[must_use]
    pub fn dir(&self) -> &str {
        match self.0.rfind('/') {
            Some(0) => "/",
            Some(pos) => &self.0[..pos],
            None => ".",
        }
    }
}

impl fmt::Display for UnitPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UnitPath {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<UnitPath> for String {
    fn from(path: UnitPath) -> Self {
        path.0
    }
}

/// Fully-qualified wire path of an RPC method: `/<service>/<method>`.
///
/// The service part is the proto-qualified service name and the method part
/// is the method name exactly as declared, not its Go spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WirePath(String);

impl WirePath {
    /// Creates the wire path for `method` of `service`.
    #[must_use]
    pub fn new(service_full_name: &str, method: &str) -> Self {
        Self(format!("/{service_full_name}/{method}"))
    }

    /// Returns the path as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WirePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
