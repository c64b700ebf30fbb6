//! Error types for denokit operations

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::path::Path;
use thiserror::Error;

/// Main error type for denokit operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Invalid settings or command-line configuration
    #[error("Configuration error: {message}")]
    #[diagnostic(code(denokit::config))]
    Configuration {
        /// Error message describing the configuration issue
        message: String,
    },

    /// I/O error during cache or declaration file operations
    #[error("I/O {operation} failed{}", path.as_ref().map_or(String::new(), |p| format!(": {}", p.display())))]
    #[diagnostic(
        code(denokit::io),
        help("Check file permissions on the deno cache directory")
    )]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Path that caused the error, if available
        path: Option<Box<Path>>,
        /// Operation that failed (e.g., "read", "write", "chmod")
        operation: String,
    },

    /// A module specifier that is not a valid URL
    #[error("Invalid module URL '{url}': {message}")]
    #[diagnostic(code(denokit::url))]
    InvalidUrl {
        /// The rejected input
        url: String,
        /// Parser message
        message: String,
    },

    /// The deno executable is missing or did not answer a query
    #[error("Deno toolchain unavailable: {message}")]
    #[diagnostic(
        code(denokit::toolchain::unavailable),
        help("Install deno and make sure it is on PATH: https://deno.land")
    )]
    ToolchainUnavailable {
        /// What went wrong
        message: String,
    },

    /// The installed deno is older than the supported minimum
    #[error("Deno {found} is below the minimum supported version {minimum}")]
    #[diagnostic(code(denokit::toolchain::version), help("Upgrade deno with `deno upgrade`"))]
    VersionTooOld {
        /// Installed version
        found: String,
        /// Minimum supported version
        minimum: String,
    },

    /// The deno process could not be started or waited on
    #[error("Failed to run {command}: {source}")]
    #[diagnostic(code(denokit::process::spawn))]
    Spawn {
        /// Command line that failed
        command: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The deno process exited unsuccessfully
    #[error("{command} exited with {}: {stderr}", code.map_or_else(|| "a signal".to_string(), |c| format!("code {c}")))]
    #[diagnostic(code(denokit::process::failed))]
    Subprocess {
        /// Command line that failed
        command: String,
        /// Exit code, `None` when terminated by a signal
        code: Option<i32>,
        /// Captured standard error
        stderr: String,
    },
}

impl Error {
    /// Create a configuration error
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration {
            message: msg.into(),
        }
    }

    /// Create an I/O error with path context
    #[must_use]
    pub fn io(
        source: std::io::Error,
        path: impl AsRef<Path>,
        operation: impl Into<String>,
    ) -> Self {
        Self::Io {
            source,
            path: Some(path.as_ref().into()),
            operation: operation.into(),
        }
    }

    /// Create an invalid URL error
    #[must_use]
    pub fn invalid_url(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a toolchain unavailable error
    #[must_use]
    pub fn toolchain_unavailable(message: impl Into<String>) -> Self {
        Self::ToolchainUnavailable {
            message: message.into(),
        }
    }

    /// Create a version too old error
    #[must_use]
    pub fn version_too_old(found: impl Into<String>, minimum: impl Into<String>) -> Self {
        Self::VersionTooOld {
            found: found.into(),
            minimum: minimum.into(),
        }
    }

    /// Create a spawn error
    #[must_use]
    pub fn spawn(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            command: command.into(),
            source,
        }
    }

    /// Create a subprocess failure error
    #[must_use]
    pub fn subprocess(command: impl Into<String>, code: Option<i32>, stderr: impl Into<String>) -> Self {
        Self::Subprocess {
            command: command.into(),
            code,
            stderr: stderr.into(),
        }
    }
}

/// Result type alias for denokit operations
pub type Result<T> = std::result::Result<T, Error>;
