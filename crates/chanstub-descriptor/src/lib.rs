//! Service descriptor model for chanstub.
//!
//! Turns the protobuf descriptors protoc hands to a plugin into a small,
//! immutable model of service-definition units, services, and methods, plus
//! an index for resolving the message types methods refer to.
//!
//! # Examples
//!
//! ```
//! use chanstub_descriptor::{
//!     DescriptorSet, MethodDescriptor, ServiceDefinitionUnit, ServiceDescriptor,
//! };
//! use chanstub_core::UnitPath;
//!
//! let unit = ServiceDefinitionUnit::new(UnitPath::new("echo.proto").unwrap(), "")
//!     .with_message("EchoRequest")
//!     .with_message("EchoResponse")
//!     .with_service(
//!         ServiceDescriptor::new("Echo", "")
//!             .with_method(MethodDescriptor::unary("Say", ".EchoRequest", ".EchoResponse")),
//!     );
//!
//! let mut set = DescriptorSet::new();
//! set.add_unit(unit).unwrap();
//!
//! assert!(set.resolve(".EchoRequest").is_some());
//! assert_eq!(set.unit("echo.proto").unwrap().services.len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod convert;
pub mod model;
pub mod request;
pub mod set;

pub use model::{MessageRef, MethodDescriptor, ServiceDefinitionUnit, ServiceDescriptor};
pub use request::{CodeGenRequest, decode_descriptor_set, decode_request};
pub use set::DescriptorSet;
