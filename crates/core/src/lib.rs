//! Core types for denokit.
//!
//! This crate knows where the deno runtime keeps its cache and how deno
//! names cached remote modules. It never creates directories and never
//! runs deno; see `denokit-toolchain` for that.
//!
//! - [`paths`]: cache root defaults and path normalization
//! - [`url_cache`]: content-addressed module cache paths
//! - [`Session`]: cache root override and unstable mode for one session
//! - [`Settings`]: optional TOML settings file

pub mod config;
mod error;
pub mod paths;
pub mod session;
pub mod url_cache;

pub use config::Settings;
pub use error::{Error, Result};
pub use paths::{DENO_DIR_ENV, normalize_path};
pub use session::Session;
pub use url_cache::{ModuleCacheKey, hash_url, parse_module_url};
