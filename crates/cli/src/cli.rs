//! Command-line definition, error types and exit codes.

use clap::{Parser, Subcommand, ValueEnum};
use miette::{Diagnostic, Report};
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application
pub const EXIT_OK: i32 = 0;
/// CLI or configuration error exit code
pub const EXIT_CLI: i32 = 2;
/// Toolchain, subprocess or I/O error exit code
pub const EXIT_TOOLCHAIN: i32 = 3;

/// CLI-specific error types with proper exit code mapping
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum CliError {
    /// CLI or configuration error (exit code 2)
    #[error("CLI/configuration error: {message}")]
    #[diagnostic(code(denokit::cli::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// deno toolchain error (exit code 3)
    #[error("Toolchain error: {message}")]
    #[diagnostic(code(denokit::cli::toolchain))]
    Toolchain {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Other unexpected error (exit code 3)
    #[error("Unexpected error: {message}")]
    #[diagnostic(code(denokit::cli::other))]
    Other {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
}

impl CliError {
    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new toolchain error with help text
    #[must_use]
    pub fn toolchain_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Toolchain {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a new other error
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
            help: None,
        }
    }
}

/// Convert `denokit_core::Error` to the matching `CliError` variant.
///
/// - Configuration and URL errors -> Config (exit code 2)
/// - Toolchain and subprocess errors -> Toolchain (exit code 3)
/// - I/O errors -> Other (exit code 3)
impl From<denokit_core::Error> for CliError {
    fn from(err: denokit_core::Error) -> Self {
        use denokit_core::Error;

        let help = miette::Diagnostic::help(&err).map(|h| h.to_string());
        match err {
            Error::Configuration { message } => Self::config(message),
            Error::InvalidUrl { .. } => Self::config(err.to_string()),
            Error::ToolchainUnavailable { .. }
            | Error::VersionTooOld { .. }
            | Error::Spawn { .. } => Self::Toolchain {
                message: err.to_string(),
                help,
            },
            Error::Subprocess { stderr, .. } => Self::toolchain_with_help(
                stderr.trim().to_string(),
                "deno rejected the input; see the message above",
            ),
            Error::Io { .. } => Self::Other {
                message: format!("{err}: {}", source_message(&err)),
                help,
            },
        }
    }
}

fn source_message(err: &denokit_core::Error) -> String {
    std::error::Error::source(err).map_or_else(String::new, |s| s.to_string())
}

/// Map CLI error to appropriate exit code
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Config { .. } => EXIT_CLI,
        CliError::Toolchain { .. } | CliError::Other { .. } => EXIT_TOOLCHAIN,
    }
}

/// Render an error to stderr with miette
#[allow(clippy::print_stderr)]
pub fn render_error(err: &CliError) {
    let report = Report::new(err.clone());
    eprintln!("{report:?}");
    let _ = io::stderr().flush();
}

/// Logging verbosity
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    #[default]
    Warn,
    /// Informational messages
    Info,
    /// Probe and sync decisions
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Directive string understood by `EnvFilter`
    #[must_use]
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Top-level command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "denokit")]
#[command(about = "Locate the deno cache, sync deno declarations and format through deno")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Logging verbosity level (overridden by RUST_LOG).
    #[arg(short = 'L', long, global = true, default_value = "warn", value_enum)]
    pub level: LogLevel,

    /// Settings file (TOML).
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Cache root to use instead of DENO_DIR or the platform default.
    #[arg(long, global = true, value_name = "DIR")]
    pub deno_dir: Option<PathBuf>,

    /// Use deno's unstable API surface.
    #[arg(long, global = true)]
    pub unstable: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show the deno executable, versions and cache locations
    Info {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Format a file (or stdin) with deno fmt
    Fmt {
        /// File to format; reads stdin when omitted
        file: Option<PathBuf>,
        /// Trim surrounding whitespace, for formatting a fragment
        #[arg(long)]
        range: bool,
    },
    /// Synchronize the cached declaration file for the current mode
    Types,
    /// Check the toolchain and refresh both declaration files
    Init {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print where deno caches a remote module
    CachePath {
        /// Module URL, e.g. https://deno.land/std/path/mod.ts
        url: String,
        /// Also report whether the module is cached
        #[arg(long)]
        check: bool,
    },
}

/// Parse command-line arguments
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
