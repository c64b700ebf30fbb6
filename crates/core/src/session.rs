//! Per-session cache location state.
//!
//! A [`Session`] owns the two pieces of mutable configuration the rest of
//! denokit depends on: an optional cache-root override and the unstable
//! mode flag. Every accessor recomputes its answer, so when no override is
//! set the cache root follows the live environment.

use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

use crate::config::Settings;
use crate::paths::{DEPS_DIR_NAME, declaration_file_name, deno_dir_from_env, normalize_path};
use crate::url_cache::{ModuleCacheKey, is_within};

/// Cache location state for one editor or tool session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    deno_dir: Option<PathBuf>,
    unstable: bool,
}

impl Session {
    /// Create a session with no override in stable mode.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session from loaded settings.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        let mut session = Self::new();
        if let Some(dir) = &settings.deno_dir {
            session.set_deno_dir(dir);
        }
        session.set_unstable(settings.unstable);
        session
    }

    /// The cache root: the override if set, else `DENO_DIR` or the
    /// platform default as of this call.
    #[must_use]
    pub fn deno_dir(&self) -> PathBuf {
        self.deno_dir.clone().unwrap_or_else(deno_dir_from_env)
    }

    /// Override the cache root for the rest of the session.
    pub fn set_deno_dir(&mut self, dir: impl AsRef<Path>) {
        let dir = normalize_path(dir.as_ref());
        debug!(deno_dir = %dir.display(), "Overriding deno cache root");
        self.deno_dir = Some(dir);
    }

    /// Whether the cache root has been overridden.
    #[must_use]
    pub fn has_deno_dir_override(&self) -> bool {
        self.deno_dir.is_some()
    }

    /// Remote module cache directory, `<deno_dir>/deps`.
    #[must_use]
    pub fn deps_dir(&self) -> PathBuf {
        self.deno_dir().join(DEPS_DIR_NAME)
    }

    /// Declaration file for the given mode.
    #[must_use]
    pub fn declaration_file(&self, unstable: bool) -> PathBuf {
        self.deno_dir().join(declaration_file_name(unstable))
    }

    /// Declaration file for the session's current mode.
    #[must_use]
    pub fn current_declaration_file(&self) -> PathBuf {
        self.declaration_file(self.unstable)
    }

    /// Whether unstable mode is enabled.
    #[must_use]
    pub fn unstable(&self) -> bool {
        self.unstable
    }

    /// Switch unstable mode. Takes effect for the next query.
    pub fn set_unstable(&mut self, unstable: bool) {
        self.unstable = unstable;
    }

    /// Where deno caches the module at `url`.
    #[must_use]
    pub fn cache_path_for_url(&self, url: &Url) -> PathBuf {
        ModuleCacheKey::from_url(url).path_in(&self.deps_dir())
    }

    /// Whether `path` lies inside the cache root.
    #[must_use]
    pub fn is_cached_module(&self, path: &Path) -> bool {
        is_within(path, &self.deno_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::DENO_DIR_ENV;

    #[test]
    fn test_override_wins_over_environment() {
        temp_env::with_var(DENO_DIR_ENV, Some("/from/env"), || {
            let mut session = Session::new();
            assert_eq!(session.deno_dir(), PathBuf::from("/from/env"));

            session.set_deno_dir("/explicit/./cache/");
            assert_eq!(session.deno_dir(), PathBuf::from("/explicit/cache"));
            assert!(session.has_deno_dir_override());
        });
    }

    #[test]
    fn test_no_override_tracks_environment() {
        let session = Session::new();
        temp_env::with_var(DENO_DIR_ENV, Some("/one"), || {
            assert_eq!(session.deno_dir(), PathBuf::from("/one"));
        });
        temp_env::with_var(DENO_DIR_ENV, Some("/two"), || {
            assert_eq!(session.deno_dir(), PathBuf::from("/two"));
        });
    }

    #[test]
    fn test_deps_dir_is_under_root() {
        let mut session = Session::new();
        session.set_deno_dir("/cache/deno");
        assert_eq!(session.deps_dir(), PathBuf::from("/cache/deno/deps"));
        assert!(session.deps_dir().starts_with(session.deno_dir()));
    }

    #[test]
    fn test_unstable_toggle_switches_declaration_file() {
        let mut session = Session::new();
        session.set_deno_dir("/cache/deno");

        let stable = session.current_declaration_file();
        assert_eq!(stable, PathBuf::from("/cache/deno/lib.deno.d.ts"));

        session.set_unstable(true);
        assert!(session.unstable());
        assert_eq!(
            session.current_declaration_file(),
            PathBuf::from("/cache/deno/lib.deno.unstable.d.ts")
        );

        session.set_unstable(false);
        assert_eq!(session.current_declaration_file(), stable);
    }

    #[test]
    fn test_cache_path_for_url() {
        let mut session = Session::new();
        session.set_deno_dir("/cache/deno");
        let url = Url::parse("https://example.com/esm/mod.ts").unwrap();
        let path = session.cache_path_for_url(&url);
        assert_eq!(
            path,
            session
                .deps_dir()
                .join("https")
                .join("example.com")
                .join("8afd52da760dab7f2deda4b7453197f50421f310372c5da3f3847ffd062fa1cf")
        );
        assert_eq!(path, session.cache_path_for_url(&url));
        assert!(session.is_cached_module(&path));
    }

    #[test]
    fn test_local_file_is_not_cached_module() {
        let mut session = Session::new();
        session.set_deno_dir("/cache/deno");
        assert!(!session.is_cached_module(Path::new("/work/project/mod.ts")));
    }

    #[test]
    fn test_relative_root_does_not_contain_everything() {
        let mut session = Session::new();
        session.set_deno_dir(".");
        assert_eq!(session.deno_dir(), PathBuf::from("."));
        assert!(!session.is_cached_module(Path::new("/etc/passwd")));
        assert!(!session.is_cached_module(Path::new("../elsewhere/x")));

        session.set_deno_dir("cache/./deno/sub/..");
        assert_eq!(session.deno_dir(), PathBuf::from("cache/deno"));
        assert!(session.is_cached_module(Path::new("cache/deno/deps/https/x")));
        assert!(!session.is_cached_module(Path::new("cache/other")));
    }

    #[test]
    fn test_from_settings() {
        let settings = Settings {
            deno_dir: Some(PathBuf::from("/opt/deno")),
            unstable: true,
            executable: None,
        };
        let session = Session::from_settings(&settings);
        assert_eq!(session.deno_dir(), PathBuf::from("/opt/deno"));
        assert!(session.unstable());
    }
}
