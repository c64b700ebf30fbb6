//! Keeping the cached deno declaration files in sync with the toolchain.
//!
//! `lib.deno.d.ts` and `lib.deno.unstable.d.ts` under the cache root hold the
//! output of `deno types`. They are generated artifacts, so they are kept
//! read-only (0o444) and only made writable (0o666) while being rewritten.
//!
//! Synchronization is not atomic and not locked. Concurrent passes for the
//! same file race on compare-then-write; callers must serialize them.
//!
//! The existing file is read while still read-only; it is only made writable
//! when its content differs and must be rewritten. A file whose content
//! already matches is left alone, permissions included, so an up-to-date
//! file stays at 0o444 (or whatever mode it was found in).

use denokit_core::{Error, Result, Session};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info, instrument};

use crate::probe::ToolchainProbe;

/// Permission bits of a protected declaration file.
pub const READ_ONLY_MODE: u32 = 0o444;

/// Permission bits while a declaration file is being rewritten.
pub const WRITABLE_MODE: u32 = 0o666;

/// What a synchronization pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The file did not exist and was written
    Created,
    /// The file differed from the toolchain output and was rewritten
    Updated,
    /// The file already matched; its content was not touched
    Unchanged,
}

impl SyncOutcome {
    /// Whether the pass wrote file content.
    #[must_use]
    pub fn wrote(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

impl std::fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
        };
        f.write_str(s)
    }
}

/// Bring the declaration file for `unstable` mode in line with `deno types`.
///
/// # Errors
///
/// Returns [`Error::ToolchainUnavailable`] if deno produced no declarations,
/// or an I/O error if the file cannot be read, written or re-protected.
#[instrument(skip(probe, session))]
pub fn synchronize(probe: &ToolchainProbe, session: &Session, unstable: bool) -> Result<SyncOutcome> {
    let content = probe.type_declarations(unstable).ok_or_else(|| {
        Error::toolchain_unavailable("`deno types` did not produce declarations")
    })?;
    write_declarations(&session.declaration_file(unstable), &content)
}

/// Write `content` to a protected declaration file if it differs.
///
/// # Errors
///
/// Returns an I/O error if any file operation fails. Nothing is rolled back.
pub fn write_declarations(path: &Path, content: &[u8]) -> Result<SyncOutcome> {
    let existing = match fs::read(path) {
        Ok(existing) => Some(existing),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => return Err(Error::io(e, path, "read")),
    };

    let outcome = match existing {
        None => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::io(e, parent, "create"))?;
            }
            fs::write(path, content).map_err(|e| Error::io(e, path, "write"))?;
            set_mode(path, READ_ONLY_MODE)?;
            SyncOutcome::Created
        }
        Some(existing) if existing == content => SyncOutcome::Unchanged,
        Some(_) => {
            set_mode(path, WRITABLE_MODE)?;
            fs::write(path, content).map_err(|e| Error::io(e, path, "write"))?;
            set_mode(path, READ_ONLY_MODE)?;
            SyncOutcome::Updated
        }
    };

    if outcome.wrote() {
        info!(path = %path.display(), bytes = content.len(), %outcome, "Wrote deno declarations");
    } else {
        debug!(path = %path.display(), "Deno declarations up to date");
    }
    Ok(outcome)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .map_err(|e| Error::io(e, path, "chmod"))
}

#[cfg(not(unix))]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    let mut permissions = fs::metadata(path)
        .map_err(|e| Error::io(e, path, "stat"))?
        .permissions();
    permissions.set_readonly(mode & 0o222 == 0);
    fs::set_permissions(path, permissions).map_err(|e| Error::io(e, path, "chmod"))
}
