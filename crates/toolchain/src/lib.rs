//! Bridge to the installed deno toolchain.
//!
//! This crate runs the deno executable for everything denokit cannot answer
//! from the filesystem alone:
//! - probing the executable and its versions ([`ToolchainProbe`])
//! - keeping the cached declaration files in sync ([`declarations`])
//! - formatting source text through `deno fmt -` ([`fmt`])
//!
//! [`Deno`] ties these to a [`denokit_core::Session`] and is the entry point
//! for editor integrations.
//!
//! # Example
//!
//! ```ignore
//! use denokit_toolchain::Deno;
//!
//! let deno = Deno::new();
//! let status = deno.initialize()?;
//! let formatted = deno.format("const a =    1").await?;
//! ```

pub mod declarations;
mod deno;
pub mod fmt;
pub mod probe;

pub use declarations::SyncOutcome;
pub use deno::{Deno, InitStatus, MINIMUM_DENO_VERSION};
pub use probe::{ToolchainProbe, VersionInfo};
