//! Error types for chanstub.
//!
//! Every failure the generator can report is a variant of [`Error`]. Errors
//! that belong to one service-definition unit carry the unit path so the host
//! can point at the offending `.proto` file.
//!
//! # Examples
//!
//! ```
//! use chanstub_core::{Error, Result};
//!
//! fn check_service_name(unit: &str, name: &str) -> Result<()> {
//!     if name.is_empty() {
//!         return Err(Error::MalformedDescriptor {
//!             unit: unit.to_string(),
//!             reason: "service has no name".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//!
//! let err = check_service_name("echo.proto", "").unwrap_err();
//! assert!(err.is_malformed_descriptor());
//! assert_eq!(err.to_string(), "echo.proto: service has no name");
//! ```

use thiserror::Error;

/// Main error type for chanstub.
///
/// All errors in the workspace use this type, except the file emission layer
/// which has its own error type and is wrapped by the binaries.
#[derive(Error, Debug)]
pub enum Error {
    /// A service-definition unit cannot produce usable output.
    ///
    /// Raised for empty unit paths, services or methods whose names do not
    /// yield a Go identifier, and requested files missing from the request.
    #[error("{unit}: {reason}")]
    MalformedDescriptor {
        /// Path of the unit being generated
        unit: String,
        /// What is wrong with the descriptor
        reason: String,
    },

    /// A method references a message type that is not in the request.
    #[error("{unit}: unresolved message type '{type_name}'")]
    UnresolvedType {
        /// Path of the unit being generated
        unit: String,
        /// Fully-qualified proto type name as written in the descriptor
        type_name: String,
    },

    /// Two generated package-level symbols would share a name.
    #[error("{unit}: generated name '{symbol}' collides with {existing}")]
    NameCollision {
        /// Path of the unit being generated
        unit: String,
        /// The identifier that could not be declared
        symbol: String,
        /// Description of the declaration already holding the name
        existing: String,
    },

    /// Configuration error.
    ///
    /// Raised for unknown or malformed plugin parameters and invalid TOML
    /// configuration files.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// The host request or response could not be decoded or encoded.
    #[error("Protocol error: {message}")]
    ProtocolError {
        /// Description of the protocol failure
        message: String,
        /// Underlying decode/encode error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Rendering or writing a generated file failed.
    #[error("Emission failed for '{path}': {message}")]
    EmissionError {
        /// Output path of the file being emitted
        path: String,
        /// Description of the failure
        message: String,
        /// Underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid argument error.
    ///
    /// Raised when CLI arguments or function parameters are invalid.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Returns `true` if the error describes a unit that cannot be generated.
    ///
    /// Unresolved types and name collisions are malformed descriptors too.
    ///
    /// # Examples
    ///
    /// ```
    /// use chanstub_core::Error;
    ///
    /// let err = Error::UnresolvedType {
    ///     unit: "echo.proto".to_string(),
    ///     type_name: ".echo.Missing".to_string(),
    /// };
    /// assert!(err.is_malformed_descriptor());
    /// ```
    #[must_use]
    pub const fn is_malformed_descriptor(&self) -> bool {
        matches!(
            self,
            Self::MalformedDescriptor { .. }
                | Self::UnresolvedType { .. }
                | Self::NameCollision { .. }
        )
    }

    /// Returns `true` if this is a name collision error.
    #[must_use]
    pub const fn is_name_collision(&self) -> bool {
        matches!(self, Self::NameCollision { .. })
    }

    /// Returns `true` if this is a configuration error.
    ///
    /// # Examples
    ///
    /// ```
    /// use chanstub_core::Error;
    ///
    /// let err = Error::ConfigError {
    ///     message: "unknown parameter 'foo'".to_string(),
    /// };
    /// assert!(err.is_config_error());
    /// ```
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigError { .. })
    }

    /// Returns `true` if this is a protocol error.
    #[must_use]
    pub const fn is_protocol_error(&self) -> bool {
        matches!(self, Self::ProtocolError { .. })
    }

    /// Returns `true` if this is an emission error.
    #[must_use]
    pub const fn is_emission_error(&self) -> bool {
        matches!(self, Self::EmissionError { .. })
    }

    /// Returns the unit path for unit-scoped errors.
    ///
    /// # Examples
    ///
    /// ```
    /// use chanstub_core::Error;
    ///
    /// let err = Error::NameCollision {
    ///     unit: "a.proto".to_string(),
    ///     symbol: "RegisterHandlerFoo".to_string(),
    ///     existing: "service 'foo'".to_string(),
    /// };
    /// assert_eq!(err.unit(), Some("a.proto"));
    /// ```
    #[must_use]
    pub fn unit(&self) -> Option<&str> {
        match self {
            Self::MalformedDescriptor { unit, .. }
            | Self::UnresolvedType { unit, .. }
            | Self::NameCollision { unit, .. } => Some(unit),
            _ => None,
        }
    }
}

/// Result type alias for chanstub operations.
pub type Result<T> = std::result::Result<T, Error>;
