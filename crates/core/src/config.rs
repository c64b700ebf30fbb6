//! Settings file support.
//!
//! A settings file is optional TOML:
//!
//! ```toml
//! deno_dir = "/opt/deno-cache"
//! unstable = true
//! executable = "deno"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Default name of the deno executable looked up on `PATH`.
pub const DEFAULT_EXECUTABLE: &str = "deno";

/// User settings for a denokit session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Explicit cache root, overriding `DENO_DIR` and platform defaults
    #[serde(default)]
    pub deno_dir: Option<PathBuf>,
    /// Use the unstable API surface
    #[serde(default)]
    pub unstable: bool,
    /// Executable name or path to look up instead of `deno`
    #[serde(default)]
    pub executable: Option<String>,
}

impl Settings {
    /// Parse settings from TOML text.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the text is not valid settings TOML.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::configuration(format!("Invalid settings: {e}")))
    }

    /// Load settings from a file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or a configuration
    /// error if it does not parse.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(e, path, "read"))?;
        let settings = Self::from_toml(&text)?;
        tracing::debug!(path = %path.display(), ?settings, "Loaded settings");
        Ok(settings)
    }

    /// Executable name to search for.
    #[must_use]
    pub fn executable(&self) -> &str {
        self.executable.as_deref().unwrap_or(DEFAULT_EXECUTABLE)
    }
}
