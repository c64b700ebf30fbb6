//! Deno cache directory resolution and path normalization.
//!
//! The default cache root follows the conventions of the deno runtime itself:
//!
//! | Platform | Default `DENO_DIR` |
//! |----------|--------------------|
//! | **Windows** | `%LOCALAPPDATA%\deno` |
//! | **macOS** | `$HOME/Library/Caches/deno` |
//! | **Linux** | `$XDG_CACHE_HOME/deno`, else `$HOME/.cache/deno` |
//! | **other** | `$HOME/.deno` |
//!
//! The `DENO_DIR` environment variable overrides the platform default.
//! Nothing here is memoized: every call reads the current environment,
//! and nothing here creates directories.

use std::path::{Component, Path, PathBuf};

/// Environment variable that overrides the deno cache root.
pub const DENO_DIR_ENV: &str = "DENO_DIR";

/// Subdirectory of the cache root holding remote module sources.
pub const DEPS_DIR_NAME: &str = "deps";

/// Declaration file written for the stable API surface.
pub const DECLARATION_FILE: &str = "lib.deno.d.ts";

/// Declaration file written for the unstable API surface.
pub const UNSTABLE_DECLARATION_FILE: &str = "lib.deno.unstable.d.ts";

/// Normalize a path lexically for comparison.
///
/// Removes `.` components and resolves `..` against preceding components
/// without touching the filesystem. Root and prefix components are kept,
/// and `..` never climbs above the root. A relative path whose components
/// all cancel out normalizes to `.`, never to an empty path.
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else if !out.has_root() {
                    out.push(comp);
                }
            }
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => out.push(comp),
        }
    }
    if out.as_os_str().is_empty() {
        out.push(Component::CurDir);
    }
    out
}

/// Resolve the deno cache root from the environment.
///
/// Resolution order:
/// 1. `DENO_DIR` environment variable (ignored when empty)
/// 2. Platform default (see module docs)
#[must_use]
pub fn deno_dir_from_env() -> PathBuf {
    if let Some(dir) = non_empty_var(DENO_DIR_ENV) {
        return PathBuf::from(dir);
    }
    default_deno_dir()
}

/// Compute the platform default cache root, ignoring `DENO_DIR`.
#[must_use]
pub fn default_deno_dir() -> PathBuf {
    if cfg!(windows) {
        non_empty_var("LOCALAPPDATA")
            .map(PathBuf::from)
            .or_else(dirs::cache_dir)
            .unwrap_or_default()
            .join("deno")
    } else if cfg!(target_os = "macos") {
        home_dir().join("Library").join("Caches").join("deno")
    } else if cfg!(target_os = "linux") {
        non_empty_var("XDG_CACHE_HOME")
            .map_or_else(|| home_dir().join(".cache"), PathBuf::from)
            .join("deno")
    } else {
        home_dir().join(".deno")
    }
}

/// `$HOME`, then the platform home directory, then an empty path.
fn home_dir() -> PathBuf {
    non_empty_var("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_default()
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Name of the declaration file for the given mode.
#[must_use]
pub const fn declaration_file_name(unstable: bool) -> &'static str {
    if unstable {
        UNSTABLE_DECLARATION_FILE
    } else {
        DECLARATION_FILE
    }
}
