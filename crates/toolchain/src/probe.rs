//! Locating the deno executable and querying it.
//!
//! Every query runs deno synchronously and blocks until it exits. Queries are
//! never cached: each call searches `PATH` again and re-runs deno, so answers
//! always describe the toolchain installed right now.
//!
//! Queries report failure as `None`. A missing executable, a spawn error, a
//! non-zero exit and unparsable output all look the same to the caller; the
//! specific reason is logged at debug level.

use denokit_core::config::DEFAULT_EXECUTABLE;
use denokit_core::normalize_path;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tracing::{debug, instrument, warn};

/// Script evaluated by deno to report its component versions.
pub const VERSION_SCRIPT: &str = "console.log(JSON.stringify(Deno.version))";

/// First deno release whose `deno types` accepts `--unstable`.
pub const UNSTABLE_TYPES_MIN_VERSION: &str = "0.43.0";

/// Versions reported by the installed deno.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    /// deno CLI version
    pub deno: String,
    /// V8 engine version
    pub v8: String,
    /// Bundled TypeScript version
    pub typescript: String,
    /// Human-readable three-line summary
    pub raw: String,
}

#[derive(Deserialize)]
struct ReportedVersion {
    deno: String,
    v8: String,
    typescript: String,
}

impl VersionInfo {
    /// Build from the three component versions.
    #[must_use]
    pub fn new(deno: impl Into<String>, v8: impl Into<String>, typescript: impl Into<String>) -> Self {
        let (deno, v8, typescript) = (deno.into(), v8.into(), typescript.into());
        let raw = format!("deno: {deno}\nv8: {v8}\ntypescript: {typescript}");
        Self {
            deno,
            v8,
            typescript,
            raw,
        }
    }

    /// Parse the JSON printed by [`VERSION_SCRIPT`].
    #[must_use]
    pub fn parse(stdout: &str) -> Option<Self> {
        match serde_json::from_str::<ReportedVersion>(stdout.trim()) {
            Ok(v) => Some(Self::new(v.deno, v.v8, v.typescript)),
            Err(e) => {
                debug!(error = %e, "Unparsable deno version output");
                None
            }
        }
    }

    /// Whether the deno version is at least `minimum`.
    ///
    /// A version that is not valid semver never satisfies the gate.
    #[must_use]
    pub fn at_least(&self, minimum: &str) -> bool {
        match (
            semver::Version::parse(&self.deno),
            semver::Version::parse(minimum),
        ) {
            (Ok(found), Ok(minimum)) => found >= minimum,
            _ => {
                warn!(deno = %self.deno, %minimum, "Cannot compare deno versions");
                false
            }
        }
    }
}

/// Arguments for `deno types` in the given mode.
///
/// `--unstable` is only passed when requested and supported by `version`.
#[must_use]
pub fn types_args(version: &VersionInfo, unstable: bool) -> Vec<&'static str> {
    let mut args = vec!["types"];
    if unstable && version.at_least(UNSTABLE_TYPES_MIN_VERSION) {
        args.push("--unstable");
    } else if unstable {
        debug!(deno = %version.deno, "deno types does not support --unstable, using stable surface");
    }
    args
}

/// Extract the cache root from the first line of `deno info`.
///
/// Accepts both `DENO_DIR location: "/path"` and the unquoted
/// `DENO_DIR location: /path` form.
#[must_use]
pub fn parse_info_cache_root(stdout: &str) -> Option<PathBuf> {
    let first = stdout.lines().next()?;
    let raw = if let Some((_, rest)) = first.split_once('"') {
        rest.split_once('"').map(|(path, _)| path)?
    } else {
        first.split_once(": ").map(|(_, path)| path.trim())?
    };
    (!raw.is_empty()).then(|| normalize_path(Path::new(raw)))
}

/// Finds and queries a deno executable.
#[derive(Debug, Clone)]
pub struct ToolchainProbe {
    executable: String,
    search_path: Option<OsString>,
}

impl Default for ToolchainProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolchainProbe {
    /// Probe for `deno` on the process `PATH`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            executable: DEFAULT_EXECUTABLE.to_string(),
            search_path: None,
        }
    }

    /// Look for a different executable name or path.
    #[must_use]
    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = executable.into();
        self
    }

    /// Search these directories (in `PATH` syntax) instead of `PATH`.
    #[must_use]
    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }

    /// Executable name being searched for.
    #[must_use]
    pub fn executable(&self) -> &str {
        &self.executable
    }

    /// Locate the executable. Searches on every call.
    #[must_use]
    pub fn executable_path(&self) -> Option<PathBuf> {
        let found = match &self.search_path {
            Some(paths) => {
                let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
                which::which_in(&self.executable, Some(paths), cwd)
            }
            None => which::which(&self.executable),
        };
        match found {
            Ok(path) => Some(path),
            Err(e) => {
                debug!(executable = %self.executable, error = %e, "deno executable not found");
                None
            }
        }
    }

    /// Query the installed deno's versions via `deno eval`.
    #[instrument(name = "deno_version", skip(self))]
    #[must_use]
    pub fn version(&self) -> Option<VersionInfo> {
        let executable = self.executable_path()?;
        version_of(&executable)
    }

    /// Dump deno's built-in type declarations via `deno types`.
    #[instrument(name = "deno_types", skip(self))]
    #[must_use]
    pub fn type_declarations(&self, unstable: bool) -> Option<Vec<u8>> {
        let executable = self.executable_path()?;
        let version = version_of(&executable)?;
        let output = run(&executable, &types_args(&version, unstable))?;
        Some(output.stdout)
    }

    /// Ask `deno info` where its cache root is.
    #[instrument(name = "deno_info", skip(self))]
    #[must_use]
    pub fn info_cache_root(&self) -> Option<PathBuf> {
        let executable = self.executable_path()?;
        let output = run(&executable, &["info"])?;
        parse_info_cache_root(&String::from_utf8_lossy(&output.stdout))
    }
}

fn version_of(executable: &Path) -> Option<VersionInfo> {
    let output = run(executable, &["eval", VERSION_SCRIPT])?;
    if !output.stderr.is_empty() {
        debug!(
            stderr = %String::from_utf8_lossy(&output.stderr),
            "deno eval wrote to stderr"
        );
        return None;
    }
    VersionInfo::parse(&String::from_utf8_lossy(&output.stdout))
}

/// Run deno to completion, `None` unless it exits successfully.
fn run(executable: &Path, args: &[&str]) -> Option<Output> {
    let output = Command::new(executable)
        .args(args)
        .env("NO_COLOR", "1")
        .stdin(Stdio::null())
        .output();

    match output {
        Ok(output) if output.status.success() => Some(output),
        Ok(output) => {
            debug!(
                ?args,
                code = ?output.status.code(),
                stderr = %String::from_utf8_lossy(&output.stderr),
                "deno exited unsuccessfully"
            );
            None
        }
        Err(e) => {
            debug!(?args, error = %e, "Failed to run deno");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_version_parse() {
        let v = VersionInfo::parse(r#"{"deno":"1.2.0","v8":"8.5.216","typescript":"3.9.2"}"#)
            .unwrap();
        assert_eq!(v.deno, "1.2.0");
        assert_eq!(v.v8, "8.5.216");
        assert_eq!(v.typescript, "3.9.2");
        assert_eq!(v.raw, "deno: 1.2.0\nv8: 8.5.216\ntypescript: 3.9.2");
    }

    #[test]
    fn test_version_parse_trailing_newline() {
        assert!(
            VersionInfo::parse("{\"deno\":\"1.0.0\",\"v8\":\"8.4\",\"typescript\":\"3.9\"}\n")
                .is_some()
        );
    }

    #[test]
    fn test_version_parse_rejects_garbage() {
        assert!(VersionInfo::parse("deno 1.2.0").is_none());
        assert!(VersionInfo::parse(r#"{"deno":"1.2.0"}"#).is_none());
        assert!(VersionInfo::parse("").is_none());
    }

    #[test]
    fn test_at_least() {
        let v = VersionInfo::new("0.43.0", "8.0", "3.8");
        assert!(v.at_least("0.43.0"));
        assert!(v.at_least("0.35.0"));
        assert!(!v.at_least("1.0.0"));
        assert!(!VersionInfo::new("nightly", "8.0", "3.8").at_least("0.1.0"));
    }

    #[test]
    fn test_types_args_gate() {
        let old = VersionInfo::new("0.42.0", "8.0", "3.8");
        let new = VersionInfo::new("1.2.0", "8.5", "3.9");
        assert_eq!(types_args(&new, false), vec!["types"]);
        assert_eq!(types_args(&new, true), vec!["types", "--unstable"]);
        assert_eq!(types_args(&old, true), vec!["types"]);
    }

    #[test]
    fn test_parse_info_quoted() {
        let out = "DENO_DIR location: \"/home/user/.cache/deno\"\nRemote modules cache: \"/x\"\n";
        assert_eq!(
            parse_info_cache_root(out),
            Some(PathBuf::from("/home/user/.cache/deno"))
        );
    }

    #[test]
    fn test_parse_info_unquoted() {
        let out = "DENO_DIR location: /home/user/.cache/deno\n";
        assert_eq!(
            parse_info_cache_root(out),
            Some(PathBuf::from("/home/user/.cache/deno"))
        );
    }

    #[test]
    fn test_parse_info_empty() {
        assert_eq!(parse_info_cache_root(""), None);
        assert_eq!(parse_info_cache_root("no location here"), None);
    }

    #[test]
    fn test_missing_executable_is_absent() {
        let temp = TempDir::new().unwrap();
        let probe = ToolchainProbe::new().with_search_path(temp.path());
        assert!(probe.executable_path().is_none());
        assert!(probe.version().is_none());
        assert!(probe.type_declarations(false).is_none());
        assert!(probe.info_cache_root().is_none());
    }

    #[test]
    fn test_builder() {
        let probe = ToolchainProbe::new().with_executable("deno-canary");
        assert_eq!(probe.executable(), "deno-canary");
        assert_eq!(ToolchainProbe::default().executable(), "deno");
    }
}
