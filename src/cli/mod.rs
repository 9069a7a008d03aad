//! CLI module for the Tenet policy test runner
//!
//! ## Commands
//!
//! - `test [PATH]...` - Discover and run policy tests
//! - `--lex FILE` / `--parse FILE` - Debug the frontend on a single file
//!
//! ## Modules
//!
//! - `commands` - Command implementations
//! - `loader` - Policy and data file loading
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
pub mod loader;

use std::fmt;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use commands::TestOptions;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    pub const FAILURE: ExitCode = ExitCode(1);
    /// At least one test failed or errored.
    pub const TESTS_FAILED: ExitCode = ExitCode(2);
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

/// Unit tests for Tenet policies
#[derive(Parser, Debug)]
#[command(name = "tenet")]
#[command(version = VERSION)]
#[command(about = "Run unit tests for Tenet policies", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    // Debug/development flags
    /// Tokenize only (debug)
    #[arg(long = "lex", value_name = "FILE")]
    pub lex_file: Option<PathBuf>,

    /// Parse only (debug)
    #[arg(long = "parse", value_name = "FILE")]
    pub parse_file: Option<PathBuf>,
}

/// Report format for `tenet test`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run policy tests (rules named `test_*`)
    Test {
        /// Policy (.tnt) and data (.json) files or directories
        #[arg(value_name = "PATH", default_value = ".")]
        paths: Vec<PathBuf>,
        /// Show every result and its duration
        #[arg(short, long)]
        verbose: bool,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
        /// Per-test timeout, e.g. `500ms`, `5s`, `1m`
        #[arg(short = 't', long, value_name = "DURATION", default_value = "5s", value_parser = parse_duration)]
        timeout: Duration,
        /// Report the expression that made each failing test fail
        #[arg(long = "explain-fails")]
        explain_fails: bool,
        /// Only run tests whose name contains this text
        #[arg(short = 'k', value_name = "FILTER")]
        filter: Option<String>,
        /// JSON file used as the `input` document
        #[arg(short = 'i', long, value_name = "FILE")]
        input: Option<PathBuf>,
    },
}

/// Parse a duration such as `250ms`, `1.5s` or `2m`.
///
/// A bare number is taken as seconds.
pub fn parse_duration(text: &str) -> Result<Duration, String> {
    let text = text.trim();
    let split = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(text.len());
    let (number, unit) = text.split_at(split);
    let value: f64 = number
        .parse()
        .map_err(|_| format!("invalid duration '{}'", text))?;
    let nanos_per_unit = match unit {
        "" | "s" => 1e9,
        "ns" => 1.0,
        "us" | "µs" => 1e3,
        "ms" => 1e6,
        "m" => 60e9,
        "h" => 3600e9,
        other => return Err(format!("unknown duration unit '{}' (use ns, us, ms, s, m or h)", other)),
    };
    let nanos = (value * nanos_per_unit).round();
    if !nanos.is_finite() || nanos > u64::MAX as f64 {
        return Err(format!("duration '{}' is out of range", text));
    }
    Ok(Duration::from_nanos(nanos as u64))
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
    if let Some(file) = cli.lex_file {
        return commands::lex_file(&file);
    }
    if let Some(file) = cli.parse_file {
        return commands::parse_file(&file);
    }

    match cli.command {
        Some(Command::Test {
            paths,
            verbose,
            format,
            timeout,
            explain_fails,
            filter,
            input,
        }) => commands::run_tests(TestOptions {
            paths,
            verbose,
            format,
            timeout,
            explain_fails,
            filter,
            input,
        }),
        None => Err(CliError::failure("no command given, try `tenet test` or `tenet --help`")),
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
    fn test_cli_parse_test_defaults() {
        let cli = Cli::try_parse_from(["tenet", "test"]).unwrap();
        let Some(Command::Test {
            paths,
            verbose,
            format,
            timeout,
            explain_fails,
            filter,
            input,
        }) = cli.command
        else {
            panic!("Expected Test command");
        };
        assert_eq!(paths, vec![PathBuf::from(".")]);
        assert!(!verbose);
        assert_eq!(format, OutputFormat::Pretty);
        assert_eq!(timeout, Duration::from_secs(5));
        assert!(!explain_fails);
        assert!(filter.is_none());
        assert!(input.is_none());
    }

    #[test]
    fn test_cli_parse_test_flags() {
        let cli = Cli::try_parse_from([
            "tenet",
            "test",
            "policies",
            "data.json",
            "-v",
            "--format",
            "json",
            "--timeout",
            "250ms",
            "--explain-fails",
            "-k",
            "admin",
        ])
        .unwrap();
        if let Some(Command::Test {
            paths,
            verbose,
            format,
            timeout,
            explain_fails,
            filter,
            ..
        }) = cli.command
        {
            assert_eq!(paths.len(), 2);
            assert!(verbose);
            assert_eq!(format, OutputFormat::Json);
            assert_eq!(timeout, Duration::from_millis(250));
            assert!(explain_fails);
            assert_eq!(filter.as_deref(), Some("admin"));
        } else {
            panic!("Expected Test command");
        }
    }

    #[test]
    fn test_cli_rejects_bad_timeout() {
        assert!(Cli::try_parse_from(["tenet", "test", "--timeout", "fast"]).is_err());
    }

    #[test]
    fn test_cli_parse_debug_flags() {
        let cli = Cli::try_parse_from(["tenet", "--lex", "a.tnt"]).unwrap();
        assert_eq!(cli.lex_file, Some(PathBuf::from("a.tnt")));
        let cli = Cli::try_parse_from(["tenet", "--parse", "a.tnt"]).unwrap();
        assert_eq!(cli.parse_file, Some(PathBuf::from("a.tnt")));
    }

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("10").unwrap(), Duration::from_secs(10));
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration("15ms").unwrap(), Duration::from_millis(15));
        assert_eq!(parse_duration("20us").unwrap(), Duration::from_micros(20));
        assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
        assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
    }

    #[test]
    fn test_parse_duration_errors() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("5 parsecs").is_err());
        assert!(parse_duration("ms").is_err());
    }
}
