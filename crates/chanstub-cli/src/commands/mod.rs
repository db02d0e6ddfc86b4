//! Subcommand implementations for the `chanstub` tool.
//!
//! Each command loads its inputs, runs, and prints a report in the
//! requested output format, returning the process exit code.

pub mod common;
pub mod completions;
pub mod generate;
pub mod inspect;
