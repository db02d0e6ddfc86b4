//! Core types, configuration, and errors for chanstub.
//!
//! This crate provides the foundational types shared by every other crate in
//! the workspace.
//!
//! # Architecture
//!
//! The core consists of:
//! - Strong domain types (`UnitPath`, `WirePath`)
//! - Error hierarchy with contextual information
//! - Generator configuration parsed from protoc parameters or TOML
//! - CLI helper types (`ExitCode`, `OutputFormat`)

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod config;
mod error;
mod types;

pub mod cli;

pub use config::{DEFAULT_FILE_SUFFIX, DEFAULT_GENERATOR_NAME, GeneratorConfig, PathsMode};
pub use error::{Error, Result};
pub use types::{UnitPath, WirePath};
