//! chanstub command-line tool.
//!
//! Runs the channel stub generator outside of protoc.
//!
//! # Examples
//!
//! ```bash
//! # Produce a descriptor set, then generate stubs next to the protos
//! protoc --include_imports --descriptor_set_out=api.pb -I proto proto/echo/echo.proto
//! chanstub generate api.pb --file echo/echo.proto -p paths=source_relative --out gen
//!
//! # Show shapes and stream indices
//! chanstub inspect api.pb --format json
//! ```

use anyhow::Result;
use chanstub_cli::commands::{self, common::InputArgs, generate::GenerateArgs};
use chanstub_cli::logging::init_logging;
use chanstub_core::cli::{ExitCode, OutputFormat};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

/// Channel-based Go client stubs for gRPC services.
#[derive(Parser, Debug)]
#[command(name = "chanstub")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (json, text, pretty)
    #[arg(long = "format", global = true, default_value = "pretty")]
    format: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate stub files from a descriptor set into a directory.
    Generate(GenerateArgs),

    /// Show the Go package, output path, and call shapes per unit.
    Inspect(InputArgs),

    /// Generate shell completions.
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let output_format = cli
        .format
        .parse::<OutputFormat>()
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let exit_code = execute_command(cli.command, output_format)?;
    std::process::exit(exit_code.as_i32());
}

fn execute_command(command: Commands, output_format: OutputFormat) -> Result<ExitCode> {
    match command {
        Commands::Generate(args) => commands::generate::run(&args, output_format),
        Commands::Inspect(args) => commands::inspect::run(&args, output_format),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            commands::completions::run(shell, &mut cmd)
        }
    }
}
