//! Channel-based client stub generation.
//!
//! Generates Go client stubs that send RPCs through a `grpchan.Channel`
//! instead of a concrete `*grpc.ClientConn`, plus a registration helper for
//! `grpchan.ServiceRegistry`.
//!
//! # Architecture
//!
//! - [`naming`]: Go identifiers, packages, imports, and per-file symbols
//! - [`shape`]: call shape selection and stream indices
//! - [`synth`]: per-service declaration synthesis
//! - [`decl`]: declarations as data
//! - [`assembler`]: one output file per unit
//! - [`template_engine`]: Handlebars rendering of assembled files
//! - [`generator`]: request-level driver
//!
//! # Examples
//!
//! ```
//! use chanstub_codegen::shape::{CallShape, classify};
//! use chanstub_descriptor::MethodDescriptor;
//!
//! let method = MethodDescriptor::server_streaming("Watch", ".Req", ".Event");
//! assert_eq!(classify(&method), CallShape::ServerStreaming);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod assembler;
pub mod decl;
pub mod generator;
pub mod naming;
pub mod shape;
pub mod synth;
pub mod template_engine;
pub mod types;

pub use generator::ChannelStubGenerator;
pub use shape::{CallShape, MethodPlan, StreamIndexer, classify, plan_service};
pub use types::{GeneratedCode, GeneratedFile};
