//! denokit command-line front end.
//!
//! [`cli`] holds the argument definitions, error type and exit codes;
//! [`commands`] runs each subcommand against a [`denokit_toolchain::Deno`].

pub mod cli;
pub mod commands;

use tracing_subscriber::EnvFilter;

/// Install the stderr tracing subscriber.
///
/// `RUST_LOG` wins over `level` when set. Repeated calls are ignored.
pub fn init_tracing(level: cli::LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
