//! CLI module for the arf compiler
//!
//! This module provides the command-line interface for the compiler.
//!
//! ## Commands
//!
//! - `check <file>` - Load, resolve and validate a program; print a per-package summary
//! - `tokens <file>` - Print the token stream of one file (debug)
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;

use std::fmt;
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use crate::frontend::{CompileOptions, CycleDetection};

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Clap CLI definition
// ============================================================================

/// The arf IDL compiler
#[derive(Parser, Debug)]
#[command(name = "arfc")]
#[command(version = VERSION)]
#[command(about = "Validate arf IDL programs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load, resolve and validate a program
    Check {
        /// Entry file; every file it imports is loaded too
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Only report self references and two-struct cycles
        #[arg(long)]
        shallow_cycles: bool,
        /// Extension appended to import paths that have none
        #[arg(long, value_name = "EXT", default_value = arf_core::lang::conventions::FILE_EXTENSION)]
        extension: String,
    },

    /// Print the token stream of one file (debug)
    Tokens {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

impl Command {
    /// Compile options selected by the `check` flags.
    fn compile_options(shallow_cycles: bool, extension: &str) -> CompileOptions {
        let cycle_detection = if shallow_cycles {
            CycleDetection::Shallow
        } else {
            CycleDetection::Full
        };
        CompileOptions::default()
            .with_extension(extension.trim_start_matches('.'))
            .with_cycle_detection(cycle_detection)
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    let cli = Cli::parse();

    match execute(cli) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Command::Check {
            file,
            shallow_cycles,
            extension,
        } => commands::check_file(&file, &Command::compile_options(shallow_cycles, &extension)),
        Command::Tokens { file } => commands::print_tokens(&file),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_check() {
        let cli = Cli::try_parse_from(["arfc", "check", "api.arf"]).unwrap();
        if let Command::Check {
            file,
            shallow_cycles,
            extension,
        } = cli.command
        {
            assert_eq!(file, PathBuf::from("api.arf"));
            assert!(!shallow_cycles);
            assert_eq!(extension, "arf");
        } else {
            panic!("Expected Check command");
        }
    }

    #[test]
    fn test_cli_parse_check_flags() {
        let cli = Cli::try_parse_from(["arfc", "check", "api.idl", "--shallow-cycles", "--extension", "idl"]).unwrap();
        let Command::Check {
            shallow_cycles,
            extension,
            ..
        } = cli.command
        else {
            panic!("Expected Check command");
        };
        let options = Command::compile_options(shallow_cycles, &extension);
        assert_eq!(options.cycle_detection, CycleDetection::Shallow);
        assert_eq!(options.extension, "idl");
    }

    #[test]
    fn test_extension_dot_is_optional() {
        assert_eq!(Command::compile_options(false, ".idl").extension, "idl");
    }

    #[test]
    fn test_cli_parse_tokens() {
        let cli = Cli::try_parse_from(["arfc", "tokens", "api.arf"]).unwrap();
        assert!(matches!(cli.command, Command::Tokens { .. }));
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["arfc"]).is_err());
        assert!(Cli::try_parse_from(["arfc", "check"]).is_err());
    }
}
