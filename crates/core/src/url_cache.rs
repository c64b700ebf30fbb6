//! Content-addressed locations of remote modules in the deno cache.
//!
//! Deno stores a downloaded module at
//! `$DENO_DIR/deps/<scheme>/<host>/<sha256>` where the digest is computed
//! over the URL path and query. The derivation here must stay identical to
//! deno's own, otherwise lookups miss the cache.
//!
//! ```text
//! https://example.com/esm/mod.ts
//!   -> deps/https/example.com/8afd52da760dab7f2deda4b7453197f50421f310372c5da3f3847ffd062fa1cf
//! ```

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use url::Url;

use crate::paths::normalize_path;
use crate::{Error, Result};

/// Cache key of a remote module: `(scheme, host, content hash)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleCacheKey {
    /// URL scheme without the trailing colon
    pub scheme: String,
    /// Hostname without port
    pub host: String,
    /// Lowercase hex SHA-256 of the path and query
    pub hash: String,
}

impl ModuleCacheKey {
    /// Derive the cache key for a URL.
    #[must_use]
    pub fn from_url(url: &Url) -> Self {
        Self {
            scheme: url.scheme().to_string(),
            host: url.host_str().unwrap_or_default().to_string(),
            hash: hash_url(url),
        }
    }

    /// Path of this entry below a deps directory.
    #[must_use]
    pub fn path_in(&self, deps_dir: &Path) -> PathBuf {
        deps_dir.join(&self.scheme).join(&self.host).join(&self.hash)
    }
}

/// Parse a module specifier as an absolute URL.
///
/// # Errors
///
/// Returns [`Error::InvalidUrl`] if the specifier is not a valid URL.
pub fn parse_module_url(specifier: &str) -> Result<Url> {
    Url::parse(specifier).map_err(|e| Error::invalid_url(specifier, e.to_string()))
}

/// SHA-256 of the URL path plus `?query`, fragment excluded.
#[must_use]
pub fn hash_url(url: &Url) -> String {
    let mut rest = url.path().to_string();
    if let Some(query) = url.query() {
        rest.push('?');
        rest.push_str(query);
    }
    hex::encode(Sha256::digest(rest.as_bytes()))
}

/// Whether `path` lies inside `cache_root` after lexical normalization.
#[must_use]
pub fn is_within(path: &Path, cache_root: &Path) -> bool {
    normalize_path(path).starts_with(normalize_path(cache_root))
}
