//! chanstub command-line library.
//!
//! Shared by the `protoc-gen-grpchan` plugin binary and the `chanstub`
//! tool: the plugin protocol, subcommand implementations, output
//! formatters, and logging setup.

#![allow(clippy::missing_errors_doc)]

pub mod commands;
pub mod formatters;
pub mod logging;
pub mod plugin;
