//! protoc plugin entry point.
//!
//! ```bash
//! protoc --grpchan_out=paths=source_relative:gen -I proto proto/echo/echo.proto
//! ```

use anyhow::Result;
use chanstub_cli::logging::init_logging;
use chanstub_cli::plugin::run_plugin;
use clap::Parser;
use std::io;

/// protoc plugin emitting grpchan client stubs (`*.pb.grpchan.go`).
///
/// Reads a `CodeGeneratorRequest` on stdin and writes a
/// `CodeGeneratorResponse` on stdout.
#[derive(Parser, Debug)]
#[command(name = "protoc-gen-grpchan", version, about)]
struct Args {
    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;
    run_plugin(io::stdin().lock(), io::stdout().lock())
}
