//! Command implementations.
//!
//! Each command returns the text to print on stdout; `main` does the printing.

use crate::cli::{Cli, CliError, Commands};
use denokit_core::Settings;
use denokit_toolchain::Deno;
use serde::Serialize;
use std::fmt::Write;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Build the facade from the settings file and command-line overrides.
///
/// Flags win over the settings file, which wins over the environment.
///
/// # Errors
///
/// Returns a configuration error if the settings file cannot be loaded.
pub fn build_deno(cli: &Cli) -> Result<Deno, CliError> {
    let settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let mut deno = Deno::from_settings(&settings);
    if let Some(dir) = &cli.deno_dir {
        deno.set_cache_root(dir);
    }
    if cli.unstable {
        deno.set_unstable_mode(true);
    }
    debug!(deno_dir = %deno.cache_root().display(), unstable = deno.unstable_mode(), "Session configured");
    Ok(deno)
}

/// Run the selected command.
///
/// # Errors
///
/// Returns the command's error mapped to a [`CliError`].
pub fn execute(cli: &Cli) -> Result<String, CliError> {
    let deno = build_deno(cli)?;
    match &cli.command {
        Commands::Info { json } => execute_info(&deno, *json),
        Commands::Fmt { file, range } => {
            let source = read_source(file.as_deref())?;
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| CliError::other(format!("Failed to start async runtime: {e}")))?;
            runtime.block_on(execute_fmt(&deno, &source, *range))
        }
        Commands::Types => execute_types(&deno),
        Commands::Init { json } => execute_init(&deno, *json),
        Commands::CachePath { url, check } => execute_cache_path(&deno, url, *check),
    }
}

#[derive(Debug, Serialize)]
struct InfoOutput {
    executable_path: Option<PathBuf>,
    version: Option<denokit_toolchain::VersionInfo>,
    deno_dir: PathBuf,
    deps_dir: PathBuf,
    declaration_file: PathBuf,
    unstable: bool,
}

/// Report the executable, versions and cache locations.
///
/// A missing toolchain is reported, not treated as an error.
///
/// # Errors
///
/// Returns an error only if JSON serialization fails.
pub fn execute_info(deno: &Deno, json: bool) -> Result<String, CliError> {
    let info = InfoOutput {
        executable_path: deno.executable_path(),
        version: deno.current_version(),
        deno_dir: deno.cache_root(),
        deps_dir: deno.session().deps_dir(),
        declaration_file: deno.declaration_file(),
        unstable: deno.unstable_mode(),
    };

    if json {
        return serde_json::to_string_pretty(&info)
            .map_err(|e| CliError::other(format!("Failed to serialize info: {e}")));
    }

    let mut out = String::new();
    match &info.executable_path {
        Some(path) => {
            let _ = writeln!(out, "executable: {}", path.display());
        }
        None => out.push_str("executable: not found\n"),
    }
    match &info.version {
        Some(version) => {
            let _ = writeln!(out, "{}", version.raw);
        }
        None => out.push_str("version: unavailable\n"),
    }
    let _ = writeln!(out, "DENO_DIR: {}", info.deno_dir.display());
    let _ = writeln!(out, "deps: {}", info.deps_dir.display());
    let _ = write!(out, "declarations: {}", info.declaration_file.display());
    Ok(out)
}

/// Format `source` through deno.
///
/// # Errors
///
/// Fails if deno is not installed or rejects the source.
pub async fn execute_fmt(deno: &Deno, source: &str, range: bool) -> Result<String, CliError> {
    let formatted = if range {
        deno.format_range(source).await?
    } else {
        deno.format(source).await?
    };
    formatted.ok_or_else(|| {
        CliError::toolchain_with_help("deno is not installed", "Install deno: https://deno.land")
    })
}

/// Synchronize the declaration file for the session's mode.
///
/// # Errors
///
/// Fails if deno is unavailable or the file cannot be written.
pub fn execute_types(deno: &Deno) -> Result<String, CliError> {
    let outcome = deno.ensure_declarations_synchronized(deno.unstable_mode())?;
    Ok(format!("{outcome}: {}", deno.declaration_file().display()))
}

/// Run the startup sequence.
///
/// # Errors
///
/// Fails if deno is missing, too old, or declarations cannot be written.
pub fn execute_init(deno: &Deno, json: bool) -> Result<String, CliError> {
    let status = deno.initialize()?;
    if json {
        return serde_json::to_string_pretty(&status)
            .map_err(|e| CliError::other(format!("Failed to serialize status: {e}")));
    }
    Ok(format!(
        "deno {} ready at {}\nDENO_DIR: {}",
        status.version.deno,
        status.executable_path.display(),
        status.deno_dir.display()
    ))
}

/// Print the cache path for a module URL.
///
/// # Errors
///
/// Fails if `url` is not an absolute URL.
pub fn execute_cache_path(deno: &Deno, url: &str, check: bool) -> Result<String, CliError> {
    let path = deno.resolve_cache_path(url)?;
    if check {
        let state = if path.exists() { "cached" } else { "not cached" };
        Ok(format!("{} ({state})", path.display()))
    } else {
        Ok(path.display().to_string())
    }
}

fn read_source(file: Option<&Path>) -> Result<String, CliError> {
    match file {
        Some(path) => std::fs::read_to_string(path).map_err(|e| {
            CliError::config(format!("Failed to read {}: {e}", path.display()))
        }),
        None => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .map_err(|e| CliError::other(format!("Failed to read stdin: {e}")))?;
            Ok(source)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("denokit").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_flags_override_settings_file() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("denokit.toml");
        std::fs::write(&config, "deno_dir = \"/from/settings\"\nunstable = false\n").unwrap();
        let config = config.to_string_lossy().to_string();

        let deno = build_deno(&cli(&["types", "--config", &config])).unwrap();
        assert_eq!(deno.cache_root(), PathBuf::from("/from/settings"));
        assert!(!deno.unstable_mode());

        let deno = build_deno(&cli(&[
            "types",
            "--config",
            &config,
            "--deno-dir",
            "/from/flag",
            "--unstable",
        ]))
        .unwrap();
        assert_eq!(deno.cache_root(), PathBuf::from("/from/flag"));
        assert!(deno.unstable_mode());
    }

    #[test]
    fn test_bad_settings_file_is_config_error() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("denokit.toml");
        std::fs::write(&config, "unstable = \"yes\"\n").unwrap();
        let config = config.to_string_lossy().to_string();

        let err = build_deno(&cli(&["types", "--config", &config])).unwrap_err();
        assert!(matches!(err, CliError::Config { .. }));
    }

    #[test]
    fn test_cache_path_output() {
        let deno = build_deno(&cli(&["types", "--deno-dir", "/cache/deno"])).unwrap();
        let out = execute_cache_path(&deno, "https://example.com/esm/mod.ts", false).unwrap();
        assert_eq!(
            PathBuf::from(out),
            PathBuf::from("/cache/deno/deps/https/example.com")
                .join("8afd52da760dab7f2deda4b7453197f50421f310372c5da3f3847ffd062fa1cf")
        );

        let checked = execute_cache_path(&deno, "https://example.com/esm/mod.ts", true).unwrap();
        assert!(checked.ends_with("(not cached)"));
    }

    #[test]
    fn test_cache_path_invalid_url() {
        let deno = Deno::new();
        let err = execute_cache_path(&deno, "mod.ts", false).unwrap_err();
        assert!(matches!(err, CliError::Config { .. }));
    }

    #[test]
    fn test_info_reports_locations() {
        let deno = build_deno(&cli(&["info", "--deno-dir", "/cache/deno", "--unstable"])).unwrap();
        let json = execute_info(&deno, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["deno_dir"], "/cache/deno");
        assert_eq!(value["deps_dir"], "/cache/deno/deps");
        assert_eq!(value["declaration_file"], "/cache/deno/lib.deno.unstable.d.ts");
        assert_eq!(value["unstable"], true);
    }
}
