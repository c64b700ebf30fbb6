//! The [`Deno`] facade used by editor integrations.

use denokit_core::{Error, Result, Session, Settings, parse_module_url};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use url::Url;

use crate::declarations::{self, SyncOutcome};
use crate::fmt::format_source;
use crate::probe::{ToolchainProbe, VersionInfo};

/// Oldest deno release denokit supports.
pub const MINIMUM_DENO_VERSION: &str = "0.35.0";

/// Toolchain state reported after a successful [`Deno::initialize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InitStatus {
    /// Versions of the installed deno
    pub version: VersionInfo,
    /// Where the deno executable was found
    pub executable_path: PathBuf,
    /// Cache root in effect
    pub deno_dir: PathBuf,
}

/// Session state plus access to the installed deno.
#[derive(Debug, Clone, Default)]
pub struct Deno {
    session: Session,
    probe: ToolchainProbe,
}

impl Deno {
    /// Facade over `deno` on `PATH` with a fresh session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Facade with explicit session state and probe.
    #[must_use]
    pub fn with_parts(session: Session, probe: ToolchainProbe) -> Self {
        Self { session, probe }
    }

    /// Facade configured from a settings file.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        let probe = ToolchainProbe::new().with_executable(settings.executable());
        Self::with_parts(Session::from_settings(settings), probe)
    }

    /// Session state.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Executable probe.
    #[must_use]
    pub fn probe(&self) -> &ToolchainProbe {
        &self.probe
    }

    /// Path of the deno executable, if installed.
    #[must_use]
    pub fn executable_path(&self) -> Option<PathBuf> {
        self.probe.executable_path()
    }

    /// Versions of the installed deno, queried now.
    #[must_use]
    pub fn current_version(&self) -> Option<VersionInfo> {
        self.probe.version()
    }

    /// Type declarations for the session's current mode.
    #[must_use]
    pub fn type_declarations(&self) -> Option<Vec<u8>> {
        self.probe.type_declarations(self.session.unstable())
    }

    /// Cache root in effect.
    #[must_use]
    pub fn cache_root(&self) -> PathBuf {
        self.session.deno_dir()
    }

    /// Override the cache root for the rest of the session.
    pub fn set_cache_root(&mut self, dir: impl AsRef<Path>) {
        self.session.set_deno_dir(dir);
    }

    /// Whether unstable mode is enabled.
    #[must_use]
    pub fn unstable_mode(&self) -> bool {
        self.session.unstable()
    }

    /// Switch unstable mode.
    pub fn set_unstable_mode(&mut self, unstable: bool) {
        self.session.set_unstable(unstable);
    }

    /// Declaration file for the session's current mode.
    #[must_use]
    pub fn declaration_file(&self) -> PathBuf {
        self.session.current_declaration_file()
    }

    /// Synchronize the declaration file for `unstable` mode.
    ///
    /// # Errors
    ///
    /// See [`declarations::synchronize`].
    pub fn ensure_declarations_synchronized(&self, unstable: bool) -> Result<SyncOutcome> {
        declarations::synchronize(&self.probe, &self.session, unstable)
    }

    /// Where deno caches the module at `url`.
    #[must_use]
    pub fn resolve_cache_path_for_url(&self, url: &Url) -> PathBuf {
        self.session.cache_path_for_url(url)
    }

    /// Parse `specifier` and resolve its cache path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if `specifier` is not an absolute URL.
    pub fn resolve_cache_path(&self, specifier: &str) -> Result<PathBuf> {
        Ok(self.resolve_cache_path_for_url(&parse_module_url(specifier)?))
    }

    /// Whether `path` is inside the cache root.
    #[must_use]
    pub fn is_path_inside_cache(&self, path: &Path) -> bool {
        self.session.is_cached_module(path)
    }

    /// Format a whole document.
    ///
    /// Returns `Ok(None)` when deno is not installed.
    ///
    /// # Errors
    ///
    /// Returns an error if deno cannot be run or rejects the source.
    pub async fn format(&self, text: &str) -> Result<Option<String>> {
        let Some(executable) = self.probe.executable_path() else {
            return Ok(None);
        };
        format_source(&executable, text).await.map(Some)
    }

    /// Format a fragment of a document, without surrounding whitespace.
    ///
    /// # Errors
    ///
    /// See [`Deno::format`].
    pub async fn format_range(&self, text: &str) -> Result<Option<String>> {
        Ok(self
            .format(text)
            .await?
            .map(|formatted| formatted.trim().to_string()))
    }

    /// Check the toolchain and refresh both declaration files.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ToolchainUnavailable`] if deno is missing,
    /// [`Error::VersionTooOld`] if it is older than
    /// [`MINIMUM_DENO_VERSION`], or any declaration sync error.
    #[instrument(skip(self))]
    pub fn initialize(&self) -> Result<InitStatus> {
        let executable_path = self
            .probe
            .executable_path()
            .ok_or_else(|| Error::toolchain_unavailable("deno is not installed"))?;
        let version = self
            .probe
            .version()
            .ok_or_else(|| Error::toolchain_unavailable("could not determine the deno version"))?;

        if !version.at_least(MINIMUM_DENO_VERSION) {
            return Err(Error::version_too_old(&version.deno, MINIMUM_DENO_VERSION));
        }

        self.ensure_declarations_synchronized(false)?;
        self.ensure_declarations_synchronized(true)?;

        let status = InitStatus {
            version,
            executable_path,
            deno_dir: self.cache_root(),
        };
        info!(deno = %status.version.deno, deno_dir = %status.deno_dir.display(), "Deno toolchain ready");
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn without_deno(temp: &TempDir) -> Deno {
        let mut session = Session::new();
        session.set_deno_dir(temp.path());
        Deno::with_parts(session, ToolchainProbe::new().with_search_path(temp.path()))
    }

    #[test]
    fn test_missing_toolchain_is_absent() {
        let temp = TempDir::new().unwrap();
        let deno = without_deno(&temp);
        assert!(deno.executable_path().is_none());
        assert!(deno.current_version().is_none());
        assert!(deno.type_declarations().is_none());
        assert!(deno.ensure_declarations_synchronized(false).is_err());
    }

    #[tokio::test]
    async fn test_format_without_toolchain_is_none() {
        let temp = TempDir::new().unwrap();
        let deno = without_deno(&temp);
        assert_eq!(deno.format("const a=1").await.unwrap(), None);
        assert_eq!(deno.format_range("const a=1").await.unwrap(), None);
    }

    #[test]
    fn test_initialize_without_toolchain() {
        let temp = TempDir::new().unwrap();
        let err = without_deno(&temp).initialize().unwrap_err();
        assert!(matches!(err, Error::ToolchainUnavailable { .. }));
    }

    #[test]
    fn test_cache_root_and_mode() {
        let mut deno = Deno::new();
        deno.set_cache_root("/cache/deno");
        assert_eq!(deno.cache_root(), PathBuf::from("/cache/deno"));

        assert!(!deno.unstable_mode());
        deno.set_unstable_mode(true);
        assert_eq!(
            deno.declaration_file(),
            PathBuf::from("/cache/deno/lib.deno.unstable.d.ts")
        );
        deno.set_unstable_mode(false);
        assert_eq!(
            deno.declaration_file(),
            PathBuf::from("/cache/deno/lib.deno.d.ts")
        );
    }

    #[test]
    fn test_resolve_cache_path() {
        let mut deno = Deno::new();
        deno.set_cache_root("/cache/deno");
        let path = deno
            .resolve_cache_path("https://example.com/esm/mod.ts")
            .unwrap();
        assert_eq!(
            path,
            PathBuf::from("/cache/deno/deps/https/example.com")
                .join("8afd52da760dab7f2deda4b7453197f50421f310372c5da3f3847ffd062fa1cf")
        );
        assert!(deno.is_path_inside_cache(&path));
        assert!(deno.resolve_cache_path("not a url").is_err());
    }

    #[test]
    fn test_from_settings() {
        let settings = Settings {
            deno_dir: Some(PathBuf::from("/opt/deno")),
            unstable: true,
            executable: Some("deno-canary".to_string()),
        };
        let deno = Deno::from_settings(&settings);
        assert_eq!(deno.cache_root(), PathBuf::from("/opt/deno"));
        assert!(deno.unstable_mode());
        assert_eq!(deno.probe().executable(), "deno-canary");
    }
}
